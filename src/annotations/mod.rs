//! Annotation layer, redaction sampling, and pointer handlers
//!
//! This module provides:
//! - The ordered annotation layer with its object selection
//! - The redaction sampler
//! - Pointer handlers for the annotate-mode tools

pub mod handlers;
pub mod redaction;

use std::collections::BTreeSet;

use crate::config::ShapeColor;
use crate::domain::{AnnotationKind, AnnotationObject, ObjectId, Point, Rect};

/// Ordered annotations; later entries draw on top
#[derive(Clone, Debug, Default)]
pub struct AnnotationLayer {
    objects: Vec<AnnotationObject>,
    next_id: u64,
}

impl AnnotationLayer {
    fn allocate_id(&mut self) -> ObjectId {
        self.next_id += 1;
        ObjectId(self.next_id)
    }

    /// Append an annotation on top of the layer and return its id
    pub fn add(&mut self, kind: AnnotationKind) -> ObjectId {
        let id = self.allocate_id();
        self.objects.push(AnnotationObject { id, kind });
        id
    }

    pub fn objects(&self) -> &[AnnotationObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: ObjectId) -> Option<&AnnotationObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut AnnotationObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Remove every object whose id is in `ids`; returns how many went
    pub fn remove_all(&mut self, ids: &BTreeSet<ObjectId>) -> usize {
        let before = self.objects.len();
        self.objects.retain(|o| !ids.contains(&o.id));
        before - self.objects.len()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Topmost annotation under `p`
    pub fn hit_test(&self, p: Point, tolerance: f32) -> Option<ObjectId> {
        self.objects
            .iter()
            .rev()
            .find(|o| o.kind.hit_test(p, tolerance))
            .map(|o| o.id)
    }

    /// Every annotation whose bounds touch `area`
    pub fn intersecting(&self, area: &Rect) -> BTreeSet<ObjectId> {
        self.objects
            .iter()
            .filter(|o| o.kind.bounds().intersects(area))
            .map(|o| o.id)
            .collect()
    }

    /// Move the listed annotations
    pub fn translate(&mut self, ids: &BTreeSet<ObjectId>, dx: f32, dy: f32) {
        for o in self.objects.iter_mut().filter(|o| ids.contains(&o.id)) {
            o.kind.translate(dx, dy);
        }
    }

    /// Move every annotation
    pub fn translate_all(&mut self, dx: f32, dy: f32) {
        for o in &mut self.objects {
            o.kind.translate(dx, dy);
        }
    }

    /// Rescale every annotation's geometry
    pub fn scale_all(&mut self, sx: f32, sy: f32) {
        for o in &mut self.objects {
            o.kind.scale(sx, sy);
        }
    }

    /// Apply a color to the listed annotations (redactions are skipped)
    pub fn restyle_color(&mut self, ids: &BTreeSet<ObjectId>, color: ShapeColor) -> usize {
        self.objects
            .iter_mut()
            .filter(|o| ids.contains(&o.id))
            .filter_map(|o| o.kind.set_color(color).then_some(()))
            .count()
    }

    /// Apply a stroke width to the listed annotations (text and redactions are skipped)
    pub fn restyle_stroke_width(&mut self, ids: &BTreeSet<ObjectId>, width: f32) -> usize {
        self.objects
            .iter_mut()
            .filter(|o| ids.contains(&o.id))
            .filter_map(|o| o.kind.set_stroke_width(width).then_some(()))
            .count()
    }
}
