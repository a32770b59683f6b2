//! Form state behind the task and note edit screens.

use crate::model::note::derive_title;
use crate::model::{Note, NotePatch, TagSet, Task, TaskPatch};

/// Whether a key press is the save accelerator (Ctrl+S, or Cmd+S where the
/// terminal reports the command key). Editors route it to the same save path
/// as their explicit save action and must not insert the key as text.
pub fn is_save_shortcut(key: char, control: bool, command: bool) -> bool {
    (control || command) && key.eq_ignore_ascii_case(&'s')
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
}

impl TaskDraft {
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
        }
    }

    /// The update to apply, or `None` while the title is blank.
    pub fn submit(&self) -> Option<TaskPatch> {
        let title = self.title.trim();
        if title.is_empty() {
            return None;
        }
        Some(TaskPatch {
            title: Some(title.to_string()),
            description: Some(self.description.trim().to_string()),
            status: None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub tags: TagSet,
    /// Pending text of the tag field.
    pub tag_input: String,
}

impl NoteDraft {
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            content: note.content.clone(),
            tags: note.tags.clone(),
            tag_input: String::new(),
        }
    }

    /// Commits the tag field. The field is cleared only when the tag was
    /// added; blank or duplicate input is left for the user to fix.
    pub fn add_tag(&mut self) -> bool {
        let added = self.tags.insert(&self.tag_input);
        if added {
            self.tag_input.clear();
        }
        added
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    /// Full update for the note, with the title derived from the content
    /// when left blank.
    pub fn finalize(&self) -> NotePatch {
        NotePatch {
            title: Some(derive_title(&self.title, &self.content)),
            content: Some(self.content.clone()),
            tags: Some(self.tags.clone()),
            is_favorite: None,
        }
    }
}
