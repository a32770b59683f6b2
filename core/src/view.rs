//! Which screen is active and which entity is being edited.

use crate::model::{Note, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Board,
    Notes,
    TaskEdit,
    NoteEdit,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub current_view: View,
    pub editing_task_id: Option<String>,
    pub editing_note_id: Option<String>,
}

/// What the presentation layer should render.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Board,
    Notes,
    TaskEditor(Task),
    NoteEditor(Note),
}

impl Selection {
    /// Switches to a list view, leaving any editor.
    pub fn show(&mut self, view: View) {
        match view {
            View::Board | View::TaskEdit => self.close_task_editor(),
            View::Notes | View::NoteEdit => self.close_note_editor(),
        }
    }

    pub fn edit_task(&mut self, id: impl Into<String>) {
        self.editing_task_id = Some(id.into());
        self.current_view = View::TaskEdit;
    }

    pub fn edit_note(&mut self, id: impl Into<String>) {
        self.editing_note_id = Some(id.into());
        self.current_view = View::NoteEdit;
    }

    pub fn close_task_editor(&mut self) {
        self.editing_task_id = None;
        self.current_view = View::Board;
    }

    pub fn close_note_editor(&mut self) {
        self.editing_note_id = None;
        self.current_view = View::Notes;
    }

    /// Resolves the selection against the current collections. An edit view
    /// whose entity no longer exists falls back to its list view, and the
    /// stale selection is cleared.
    pub fn resolve<T, N>(&mut self, find_task: T, find_note: N) -> Screen
    where
        T: FnOnce(&str) -> Option<Task>,
        N: FnOnce(&str) -> Option<Note>,
    {
        match self.current_view {
            View::Board => Screen::Board,
            View::Notes => Screen::Notes,
            View::TaskEdit => match self.editing_task_id.as_deref().and_then(find_task) {
                Some(task) => Screen::TaskEditor(task),
                None => {
                    self.close_task_editor();
                    Screen::Board
                }
            },
            View::NoteEdit => match self.editing_note_id.as_deref().and_then(find_note) {
                Some(note) => Screen::NoteEditor(note),
                None => {
                    self.close_note_editor();
                    Screen::Notes
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task(id: &str) -> Task {
        Task::new(id.into(), "t".into(), String::new(), Utc::now())
    }

    #[test]
    fn test_edit_task_resolves_to_editor() {
        let mut selection = Selection::default();
        selection.edit_task("task-1");

        let screen = selection.resolve(|id| Some(task(id)), |_| None);

        assert!(matches!(screen, Screen::TaskEditor(t) if t.id == "task-1"));
        assert_eq!(selection.current_view, View::TaskEdit);
    }

    #[test]
    fn test_deleted_task_falls_back_to_board() {
        let mut selection = Selection::default();
        selection.edit_task("task-gone");

        let screen = selection.resolve(|_| None, |_| None);

        assert_eq!(screen, Screen::Board);
        assert_eq!(selection, Selection::default());
    }

    #[test]
    fn test_deleted_note_falls_back_to_notes() {
        let mut selection = Selection::default();
        selection.edit_note("note-gone");

        let screen = selection.resolve(|_| None, |_| None);

        assert_eq!(screen, Screen::Notes);
        assert_eq!(selection.current_view, View::Notes);
        assert!(selection.editing_note_id.is_none());
    }

    #[test]
    fn test_edit_view_without_id_does_not_render_editor() {
        let mut selection = Selection {
            current_view: View::NoteEdit,
            ..Selection::default()
        };
        assert_eq!(selection.resolve(|_| None, |_| None), Screen::Notes);
    }

    #[test]
    fn test_show_leaves_editor() {
        let mut selection = Selection::default();
        selection.edit_note("note-1");
        selection.show(View::Board);
        assert_eq!(selection.current_view, View::Board);
        assert_eq!(selection.editing_note_id.as_deref(), Some("note-1"));

        selection.show(View::Notes);
        assert_eq!(selection.current_view, View::Notes);
        assert!(selection.editing_note_id.is_none());
    }
}
