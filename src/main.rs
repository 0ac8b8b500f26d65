use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use scribe_editor::domain::Rect;
use scribe_editor::{
    Editor, EditorConfig, EditorMsg, Key, Mode, ShapeColor, Tool, ToolSetting,
};

/// Crop, annotate and redact an image from the command line
#[derive(Parser, Debug)]
#[command(name = "scribe-editor", version)]
struct Args {
    /// Input image (any format the image crate decodes)
    input: PathBuf,
    /// Output JPEG path
    output: PathBuf,
    /// Config file (default: platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Size the image is "displayed" at, as WxH; coordinates below use this space
    #[arg(long)]
    display: Option<String>,
    /// Crop to x,y,w,h and apply it before annotating
    #[arg(long)]
    crop: Option<String>,
    /// Leave the crop pending instead of applying it (annotations are then dropped on save)
    #[arg(long, requires = "crop")]
    pending: bool,
    /// Arrow x1,y1,x2,y2 (repeatable)
    #[arg(long)]
    arrow: Vec<String>,
    /// Rectangle x,y,w,h (repeatable)
    #[arg(long)]
    rect: Vec<String>,
    /// Ellipse bounds x,y,w,h (repeatable)
    #[arg(long)]
    ellipse: Vec<String>,
    /// Redaction x,y,w,h (repeatable)
    #[arg(long)]
    blur: Vec<String>,
    /// Text label x,y,content (repeatable)
    #[arg(long)]
    text: Vec<String>,
    /// Annotation color as #rrggbb
    #[arg(long)]
    color: Option<String>,
    /// Stroke width in display pixels
    #[arg(long)]
    stroke_width: Option<f32>,
    /// JPEG quality (1-100)
    #[arg(long)]
    quality: Option<u8>,
}

fn parse_numbers<const N: usize>(value: &str, what: &str) -> anyhow::Result<[f32; N]> {
    let parts: Vec<f32> = value
        .split(',')
        .map(|s| s.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .with_context(|| format!("invalid {what} '{value}'"))?;
    match <[f32; N]>::try_from(parts) {
        Ok(numbers) => Ok(numbers),
        Err(parts) => bail!("{what} needs {N} numbers, got {}", parts.len()),
    }
}

fn parse_size(value: &str) -> anyhow::Result<(f32, f32)> {
    let Some((w, h)) = value.split_once(['x', 'X']) else {
        bail!("display size must look like WxH, got '{value}'");
    };
    let w = w.trim().parse().with_context(|| format!("invalid width '{w}'"))?;
    let h = h.trim().parse().with_context(|| format!("invalid height '{h}'"))?;
    Ok((w, h))
}

fn parse_text(value: &str) -> anyhow::Result<(f32, f32, String)> {
    let mut parts = value.splitn(3, ',');
    let (Some(x), Some(y), Some(content)) = (parts.next(), parts.next(), parts.next()) else {
        bail!("text must look like x,y,content, got '{value}'");
    };
    let x = x.trim().parse().with_context(|| format!("invalid x '{x}'"))?;
    let y = y.trim().parse().with_context(|| format!("invalid y '{y}'"))?;
    Ok((x, y, content.to_string()))
}

fn drag(editor: &mut Editor, from: (f32, f32), to: (f32, f32)) -> anyhow::Result<()> {
    editor.update(EditorMsg::pointer_down(from.0, from.1))?;
    editor.update(EditorMsg::pointer_move(to.0, to.1))?;
    editor.update(EditorMsg::pointer_up(to.0, to.1))?;
    Ok(())
}

fn draw_boxes(editor: &mut Editor, tool: Tool, boxes: &[String], what: &str) -> anyhow::Result<()> {
    if boxes.is_empty() {
        return Ok(());
    }
    editor.update(EditorMsg::SetTool(tool))?;
    for value in boxes {
        let [x, y, w, h] = parse_numbers::<4>(value, what)?;
        drag(editor, (x, y), (x + w, y + h))?;
    }
    Ok(())
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => EditorConfig::load_from(path),
        None => EditorConfig::load(),
    };
    if let Some(quality) = args.quality {
        config.jpeg_quality = quality.clamp(1, 100);
    }

    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let mut editor = Editor::new(config);
    editor
        .open_session(&bytes)
        .with_context(|| format!("failed to open {}", args.input.display()))?;

    if let Some(display) = &args.display {
        let (w, h) = parse_size(display)?;
        editor.update(EditorMsg::SetDisplaySize(w, h))?;
    }

    if let Some(crop) = &args.crop {
        let [x, y, w, h] = parse_numbers::<4>(crop, "crop")?;
        editor.update(EditorMsg::SetCropSelection(Rect::new(x, y, w, h)))?;
        if !args.pending {
            editor.update(EditorMsg::ApplyCrop)?;
        }
    }

    editor.update(EditorMsg::SetMode(Mode::Annotate))?;
    if let Some(hex) = &args.color {
        let Some(color) = ShapeColor::from_hex(hex) else {
            bail!("invalid color '{hex}', expected #rrggbb");
        };
        editor.update(EditorMsg::SetToolSetting(ToolSetting::Color(color)))?;
    }
    if let Some(width) = args.stroke_width {
        editor.update(EditorMsg::SetToolSetting(ToolSetting::StrokeWidth(width)))?;
    }

    // Redactions first so shapes drawn over the same area stay visible.
    draw_boxes(&mut editor, Tool::Blur, &args.blur, "blur")?;
    draw_boxes(&mut editor, Tool::Rect, &args.rect, "rect")?;
    draw_boxes(&mut editor, Tool::Circle, &args.ellipse, "ellipse")?;

    if !args.arrow.is_empty() {
        editor.update(EditorMsg::SetTool(Tool::Arrow))?;
        for value in &args.arrow {
            let [x1, y1, x2, y2] = parse_numbers::<4>(value, "arrow")?;
            drag(&mut editor, (x1, y1), (x2, y2))?;
        }
    }

    if !args.text.is_empty() {
        editor.update(EditorMsg::SetTool(Tool::Text))?;
        for value in &args.text {
            let (x, y, content) = parse_text(value)?;
            editor.update(EditorMsg::pointer_down(x, y))?;
            editor.update(EditorMsg::pointer_up(x, y))?;
            for c in content.chars() {
                editor.update(EditorMsg::key(Key::Character(c)))?;
            }
            editor.update(EditorMsg::key(Key::Enter))?;
        }
    }

    if args.pending {
        editor.update(EditorMsg::SetMode(Mode::Crop))?;
    }

    let annotations = editor.state()?.layer.len();
    let output = editor.save().context("failed to save output")?;
    std::fs::write(&args.output, &output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    log::info!(
        "Wrote {} ({} bytes, {} annotation(s))",
        args.output.display(),
        output.len(),
        annotations
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    run(Args::parse())
}
