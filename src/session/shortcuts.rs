//! Keyboard shortcuts
//!
//! Maps key presses that are not text input to editor commands.

use super::messages::{EditorMsg, Key, KeyEvent};
use super::state::{EditorState, Mode, Tool};

/// Map a key press to a command. Text editing is handled before this is consulted.
pub fn handle_key_event(state: &EditorState, event: KeyEvent) -> Option<EditorMsg> {
    let modifiers = event.modifiers;
    let annotating = state.mode == Mode::Annotate;

    match event.key {
        // Deletion and deselection
        Key::Delete | Key::Backspace if annotating => Some(EditorMsg::DeleteSelected),
        Key::Escape if !state.selection.is_empty() => Some(EditorMsg::ClearSelection),
        Key::Escape => None,
        // Enter applies the pending crop
        Key::Enter if state.mode == Mode::Crop && state.crop_selection.is_some() => {
            Some(EditorMsg::ApplyCrop)
        }
        // Mode toggle
        Key::Character(c) if c.eq_ignore_ascii_case(&'m') && modifiers.control => {
            Some(EditorMsg::SetMode(match state.mode {
                Mode::Crop => Mode::Annotate,
                Mode::Annotate => Mode::Crop,
            }))
        }
        // Tool shortcuts (annotate mode only, no modifiers)
        Key::Character(c) if annotating && !modifiers.control && !modifiers.alt => {
            let tool = match c.to_ascii_lowercase() {
                'v' => Tool::Select,
                'a' => Tool::Arrow,
                'r' => Tool::Rect,
                'c' => Tool::Circle,
                't' => Tool::Text,
                'f' => Tool::Freehand,
                'b' => Tool::Blur,
                _ => return None,
            };
            Some(EditorMsg::SetTool(tool))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ObjectId, Size};
    use crate::session::messages::Modifiers;
    use crate::session::state::ToolSettings;

    fn state(mode: Mode) -> EditorState {
        let mut state = EditorState::new(Size::new(100.0, 100.0), ToolSettings::default());
        state.mode = mode;
        state
    }

    #[test]
    fn test_delete_and_backspace_are_equivalent() {
        let s = state(Mode::Annotate);
        assert_eq!(
            handle_key_event(&s, KeyEvent::new(Key::Delete)),
            Some(EditorMsg::DeleteSelected)
        );
        assert_eq!(
            handle_key_event(&s, KeyEvent::new(Key::Backspace)),
            Some(EditorMsg::DeleteSelected)
        );
    }

    #[test]
    fn test_escape_clears_selection_only_when_selected() {
        let mut s = state(Mode::Annotate);
        assert_eq!(handle_key_event(&s, KeyEvent::new(Key::Escape)), None);
        s.selection.insert(ObjectId(1));
        assert_eq!(
            handle_key_event(&s, KeyEvent::new(Key::Escape)),
            Some(EditorMsg::ClearSelection)
        );
    }

    #[test]
    fn test_tool_letters_only_in_annotate() {
        let s = state(Mode::Annotate);
        assert_eq!(
            handle_key_event(&s, KeyEvent::new(Key::Character('B'))),
            Some(EditorMsg::SetTool(Tool::Blur))
        );
        let s = state(Mode::Crop);
        assert_eq!(handle_key_event(&s, KeyEvent::new(Key::Character('b'))), None);
    }

    #[test]
    fn test_enter_applies_crop_and_ctrl_m_toggles_mode() {
        let s = state(Mode::Crop);
        assert_eq!(
            handle_key_event(&s, KeyEvent::new(Key::Enter)),
            Some(EditorMsg::ApplyCrop)
        );
        let event = KeyEvent {
            key: Key::Character('m'),
            modifiers: Modifiers {
                control: true,
                ..Modifiers::NONE
            },
        };
        assert_eq!(
            handle_key_event(&s, event),
            Some(EditorMsg::SetMode(Mode::Annotate))
        );
    }
}
