use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;
use tasknote_core::{
    expand_home, is_save_shortcut, Note, NoteDraft, Screen, StoreError, TagSet, Task, TaskDraft,
    TaskStatus, View, Workspace,
};

pub enum InputMode {
    Normal,
    Adding,
    Directory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteField {
    Title,
    Tags,
    Content,
}

pub struct TaskEditor {
    pub task: Task,
    pub draft: TaskDraft,
    pub field: TaskField,
}

pub struct NoteEditor {
    pub note: Note,
    pub draft: NoteDraft,
    pub field: NoteField,
}

pub struct App<'a> {
    pub workspace: &'a Workspace,
    pub screen: Screen,
    pub column: usize,
    pub columns: [ListState; 3],
    pub note_state: ListState,
    pub input: String,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    pub task_editor: Option<TaskEditor>,
    pub note_editor: Option<NoteEditor>,
    pub message: Option<String>,
}

impl<'a> App<'a> {
    pub fn new(workspace: &'a Workspace) -> App<'a> {
        let input_mode = if workspace.has_directory() {
            InputMode::Normal
        } else {
            InputMode::Directory
        };
        let mut app = App {
            workspace,
            screen: Screen::Board,
            column: 0,
            columns: [ListState::default(), ListState::default(), ListState::default()],
            note_state: ListState::default(),
            input: String::new(),
            input_mode,
            cursor_position: 0,
            task_editor: None,
            note_editor: None,
            message: None,
        };
        app.sync();
        app
    }

    pub fn column_status(&self) -> TaskStatus {
        TaskStatus::ALL[self.column]
    }

    pub fn column_tasks(&self, status: TaskStatus) -> Vec<Task> {
        self.workspace.tasks().by_status(status)
    }

    pub fn selected_task(&self) -> Option<Task> {
        let i = self.columns[self.column].selected()?;
        self.column_tasks(self.column_status()).into_iter().nth(i)
    }

    pub fn selected_note(&self) -> Option<Note> {
        let i = self.note_state.selected()?;
        self.workspace.notes().notes().into_iter().nth(i)
    }

    /// Re-resolves the screen against the stores and drops editors whose
    /// entity is gone.
    pub fn sync(&mut self) {
        self.screen = self.workspace.screen();
        if !matches!(self.screen, Screen::TaskEditor(_)) {
            self.task_editor = None;
        }
        if !matches!(self.screen, Screen::NoteEditor(_)) {
            self.note_editor = None;
        }

        for (i, status) in TaskStatus::ALL.iter().enumerate() {
            let len = self.column_tasks(*status).len();
            clamp(&mut self.columns[i], len);
        }
        let notes = self.workspace.notes().notes().len();
        clamp(&mut self.note_state, notes);
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> Flow {
        let flow = match self.input_mode {
            InputMode::Adding | InputMode::Directory => {
                self.handle_input_key(key).await;
                Flow::Continue
            }
            InputMode::Normal => match self.screen {
                Screen::Board => self.handle_board_key(key).await,
                Screen::Notes => self.handle_notes_key(key).await,
                Screen::TaskEditor(_) => {
                    self.handle_task_editor_key(key).await;
                    Flow::Continue
                }
                Screen::NoteEditor(_) => {
                    self.handle_note_editor_key(key).await;
                    Flow::Continue
                }
            },
        };
        self.sync();
        flow
    }

    async fn handle_board_key(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Tab => self.workspace.show(View::Notes),
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Left | KeyCode::Char('h') => self.column = self.column.saturating_sub(1),
            KeyCode::Right | KeyCode::Char('l') => self.column = (self.column + 1).min(2),
            KeyCode::Char('H') => self.shift_task(TaskStatus::previous).await,
            KeyCode::Char('L') => self.shift_task(TaskStatus::next).await,
            KeyCode::Char('a') => self.enter_input_mode(InputMode::Adding),
            KeyCode::Char('o') => self.enter_input_mode(InputMode::Directory),
            KeyCode::Enter | KeyCode::Char('e') => self.open_task_editor(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_task().await,
            _ => {}
        }
        Flow::Continue
    }

    async fn handle_notes_key(&mut self, key: KeyEvent) -> Flow {
        match key.code {
            KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Tab => self.workspace.show(View::Board),
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Char('a') => self.add_note().await,
            KeyCode::Char('o') => self.enter_input_mode(InputMode::Directory),
            KeyCode::Enter | KeyCode::Char('e') => self.open_note_editor(),
            KeyCode::Char('f') => self.toggle_favorite().await,
            KeyCode::Char('d') | KeyCode::Delete => self.delete_note().await,
            _ => {}
        }
        Flow::Continue
    }

    async fn handle_task_editor_key(&mut self, key: KeyEvent) {
        if let KeyCode::Char(c) = key.code {
            if is_save_shortcut(c, ctrl(&key), command(&key)) {
                self.save_task().await;
                return;
            }
        }
        let Some(editor) = self.task_editor.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.workspace.close_task_editor(),
            KeyCode::Tab | KeyCode::BackTab => {
                editor.field = match editor.field {
                    TaskField::Title => TaskField::Description,
                    TaskField::Description => TaskField::Title,
                };
            }
            KeyCode::Enter => match editor.field {
                TaskField::Title => editor.field = TaskField::Description,
                TaskField::Description => editor.draft.description.push('\n'),
            },
            KeyCode::Backspace => {
                let text = match editor.field {
                    TaskField::Title => &mut editor.draft.title,
                    TaskField::Description => &mut editor.draft.description,
                };
                text.pop();
            }
            KeyCode::Char(c) if is_text(&key) => match editor.field {
                TaskField::Title => editor.draft.title.push(c),
                TaskField::Description => editor.draft.description.push(c),
            },
            _ => {}
        }
    }

    async fn handle_note_editor_key(&mut self, key: KeyEvent) {
        if let KeyCode::Char(c) = key.code {
            if is_save_shortcut(c, ctrl(&key), command(&key)) {
                self.save_note().await;
                return;
            }
        }
        let Some(editor) = self.note_editor.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.workspace.close_note_editor(),
            KeyCode::Tab => {
                editor.field = match editor.field {
                    NoteField::Title => NoteField::Tags,
                    NoteField::Tags => NoteField::Content,
                    NoteField::Content => NoteField::Title,
                };
            }
            KeyCode::BackTab => {
                editor.field = match editor.field {
                    NoteField::Title => NoteField::Content,
                    NoteField::Tags => NoteField::Title,
                    NoteField::Content => NoteField::Tags,
                };
            }
            KeyCode::Enter => match editor.field {
                NoteField::Title => editor.field = NoteField::Content,
                NoteField::Tags => {
                    if !editor.draft.add_tag() && !editor.draft.tag_input.trim().is_empty() {
                        self.message = Some(format!("Tag '{}' already added", editor.draft.tag_input.trim()));
                    }
                }
                NoteField::Content => editor.draft.content.push('\n'),
            },
            KeyCode::Backspace => match editor.field {
                NoteField::Title => {
                    editor.draft.title.pop();
                }
                NoteField::Tags => {
                    if editor.draft.tag_input.pop().is_none() {
                        let last = editor.draft.tags.iter().last().map(str::to_string);
                        if let Some(tag) = last {
                            editor.draft.remove_tag(&tag);
                        }
                    }
                }
                NoteField::Content => {
                    editor.draft.content.pop();
                }
            },
            KeyCode::Char(c) if is_text(&key) => match editor.field {
                NoteField::Title => editor.draft.title.push(c),
                NoteField::Tags => editor.draft.tag_input.push(c),
                NoteField::Content => editor.draft.content.push(c),
            },
            _ => {}
        }
    }

    async fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_command().await,
            KeyCode::Esc => {
                if matches!(self.input_mode, InputMode::Directory) && !self.workspace.has_directory() {
                    self.message = Some("No directory selected, changes last for this session only".into());
                }
                self.exit_input_mode();
            }
            KeyCode::Char(c) if is_text(&key) => self.input_char(c),
            KeyCode::Backspace => self.delete_char(),
            KeyCode::Left => self.move_cursor_left(),
            KeyCode::Right => self.move_cursor_right(),
            _ => {}
        }
    }

    pub fn next(&mut self) {
        let (state, len) = self.current_list();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let (state, len) = self.current_list();
        if len == 0 {
            return;
        }
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    fn current_list(&mut self) -> (&mut ListState, usize) {
        match self.screen {
            Screen::Notes => {
                let len = self.workspace.notes().notes().len();
                (&mut self.note_state, len)
            }
            _ => {
                let len = self.column_tasks(self.column_status()).len();
                (&mut self.columns[self.column], len)
            }
        }
    }

    async fn shift_task(&mut self, step: fn(TaskStatus) -> Option<TaskStatus>) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let Some(status) = step(task.status) else {
            return;
        };
        let result = self.workspace.tasks().move_task(&task.id, status).await;
        if self.report(result).is_some() {
            self.column = TaskStatus::ALL
                .iter()
                .position(|s| *s == status)
                .unwrap_or(self.column);
            let row = self
                .column_tasks(status)
                .iter()
                .position(|t| t.id == task.id);
            self.columns[self.column].select(row);
        }
    }

    async fn delete_task(&mut self) {
        if let Some(task) = self.selected_task() {
            let result = self.workspace.tasks().delete(&task.id).await;
            if self.report(result).is_some() {
                self.message = Some(format!("Deleted '{}'", task.title));
            }
        }
    }

    fn open_task_editor(&mut self) {
        if let Some(task) = self.selected_task() {
            self.workspace.edit_task(&task.id);
            self.task_editor = Some(TaskEditor {
                draft: TaskDraft::from_task(&task),
                task,
                field: TaskField::Title,
            });
        }
    }

    async fn save_task(&mut self) {
        let Some(editor) = self.task_editor.as_ref() else {
            return;
        };
        let Some(patch) = editor.draft.submit() else {
            self.message = Some("Title is required".into());
            return;
        };
        let id = editor.task.id.clone();
        let result = self.workspace.tasks().update(&id, patch).await;
        if self.report(result).is_some() {
            self.workspace.close_task_editor();
        }
    }

    async fn add_note(&mut self) {
        let result = self.workspace.notes().add("", "", TagSet::new()).await;
        if let Some(note) = self.report(result) {
            self.note_state.select(Some(0));
            self.workspace.edit_note(&note.id);
            self.note_editor = Some(NoteEditor {
                draft: NoteDraft::from_note(&note),
                note,
                field: NoteField::Title,
            });
        }
    }

    fn open_note_editor(&mut self) {
        if let Some(note) = self.selected_note() {
            self.workspace.edit_note(&note.id);
            self.note_editor = Some(NoteEditor {
                draft: NoteDraft::from_note(&note),
                note,
                field: NoteField::Title,
            });
        }
    }

    async fn save_note(&mut self) {
        let Some(editor) = self.note_editor.as_mut() else {
            return;
        };
        editor.draft.add_tag();
        let id = editor.note.id.clone();
        let draft = editor.draft.clone();
        let result = self.workspace.notes().save_draft(&id, &draft).await;
        if let Some(note) = self.report(result) {
            if let Some(editor) = self.note_editor.as_mut() {
                editor.draft.title = note.title.clone();
                editor.note = note;
            }
            self.message = Some("Saved".into());
        }
    }

    async fn toggle_favorite(&mut self) {
        if let Some(note) = self.selected_note() {
            let result = self.workspace.notes().toggle_favorite(&note.id).await;
            self.report(result);
        }
    }

    async fn delete_note(&mut self) {
        if let Some(note) = self.selected_note() {
            let result = self.workspace.notes().delete(&note.id).await;
            if self.report(result).is_some() {
                self.message = Some(format!("Deleted '{}'", note.title));
            }
        }
    }

    /// Turns a store result into a status line message on failure.
    fn report<T>(&mut self, result: Result<T, StoreError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.message = None;
                Some(value)
            }
            Err(e) => {
                self.message = Some(e.to_string());
                None
            }
        }
    }

    pub fn enter_input_mode(&mut self, mode: InputMode) {
        self.input_mode = mode;
        self.input.clear();
        self.cursor_position = 0;
    }

    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn input_char(&mut self, c: char) {
        let byte_index = self.input.chars().take(self.cursor_position).map(|c| c.len_utf8()).sum();
        self.input.insert(byte_index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let byte_index: usize = self.input.chars().take(self.cursor_position - 1).map(|c| c.len_utf8()).sum();
            self.input.remove(byte_index);
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    pub async fn submit_command(&mut self) {
        let input = self.input.trim().to_string();
        if input.is_empty() {
            self.exit_input_mode();
            return;
        }

        match self.input_mode {
            InputMode::Adding => self.submit_add(&input).await,
            InputMode::Directory => self.submit_directory(&input).await,
            InputMode::Normal => {}
        }

        self.input.clear();
        self.cursor_position = 0;
        self.exit_input_mode();
    }

    async fn submit_add(&mut self, title: &str) {
        let result = self.workspace.tasks().add(title, "").await;
        if self.report(result).is_some() {
            self.column = 0;
            let last = self.column_tasks(TaskStatus::Todo).len().checked_sub(1);
            self.columns[0].select(last);
        }
    }

    async fn submit_directory(&mut self, input: &str) {
        let path = expand_home(input);
        match self.workspace.initialize_directory(&path).await {
            Ok(true) => {
                self.message = Some(format!(
                    "Using {}",
                    self.workspace.directory_name().unwrap_or_default()
                ));
            }
            Ok(false) => self.message = Some(format!("{} is not a directory", path.display())),
            Err(e) => self.message = Some(format!("{:#}", e)),
        }
    }
}

fn clamp(state: &mut ListState, len: usize) {
    match state.selected() {
        _ if len == 0 => state.select(None),
        Some(i) if i >= len => state.select(Some(len - 1)),
        None => state.select(Some(0)),
        _ => {}
    }
}

fn ctrl(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
}

fn command(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::SUPER)
}

/// Plain or shifted characters; chords with other modifiers are never text.
fn is_text(key: &KeyEvent) -> bool {
    !key.modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasknote_core::AppConfig;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn chord(c: char, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), modifiers)
    }

    fn code(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn type_text(app: &mut App<'_>, text: &str) {
        for c in text.chars() {
            app.handle_key(key(c)).await;
        }
    }

    fn board(workspace: &Workspace) -> App<'_> {
        let mut app = App::new(workspace);
        app.exit_input_mode();
        app
    }

    #[tokio::test]
    async fn test_ctrl_s_saves_task_and_returns_to_board() {
        let workspace = Workspace::open(AppConfig::default(), None).await;
        let task = workspace.tasks().add("Old", "").await.unwrap();
        let mut app = board(&workspace);

        app.handle_key(key('e')).await;
        assert!(matches!(app.screen, Screen::TaskEditor(_)));
        for _ in 0..3 {
            app.handle_key(code(KeyCode::Backspace)).await;
        }
        type_text(&mut app, "New").await;
        app.handle_key(chord('s', KeyModifiers::CONTROL)).await;

        assert_eq!(workspace.tasks().get(&task.id).unwrap().title, "New");
        assert_eq!(app.screen, Screen::Board);
        assert!(app.task_editor.is_none());
    }

    #[tokio::test]
    async fn test_command_s_saves_task() {
        let workspace = Workspace::open(AppConfig::default(), None).await;
        let task = workspace.tasks().add("Old", "").await.unwrap();
        let mut app = board(&workspace);

        app.handle_key(code(KeyCode::Enter)).await;
        type_text(&mut app, "er").await;
        app.handle_key(chord('s', KeyModifiers::SUPER)).await;

        assert_eq!(workspace.tasks().get(&task.id).unwrap().title, "Older");
        assert_eq!(app.screen, Screen::Board);
    }

    #[tokio::test]
    async fn test_ctrl_s_with_blank_title_stays_in_editor() {
        let workspace = Workspace::open(AppConfig::default(), None).await;
        let task = workspace.tasks().add("A", "").await.unwrap();
        let mut app = board(&workspace);

        app.handle_key(key('e')).await;
        app.handle_key(code(KeyCode::Backspace)).await;
        app.handle_key(chord('s', KeyModifiers::CONTROL)).await;

        assert!(matches!(app.screen, Screen::TaskEditor(_)));
        assert_eq!(app.task_editor.as_ref().unwrap().draft.title, "");
        assert!(app.message.is_some());
        assert_eq!(workspace.tasks().get(&task.id).unwrap().title, "A");
    }

    #[tokio::test]
    async fn test_ctrl_s_saves_note_and_keeps_draft() {
        let workspace = Workspace::open(AppConfig::default(), None).await;
        let note = workspace
            .notes()
            .add("Draft", "body", TagSet::new())
            .await
            .unwrap();
        let mut app = board(&workspace);

        app.handle_key(code(KeyCode::Tab)).await;
        assert_eq!(app.screen, Screen::Notes);
        app.handle_key(code(KeyCode::Enter)).await;
        type_text(&mut app, " two").await;
        app.handle_key(chord('s', KeyModifiers::CONTROL)).await;

        let saved = workspace.notes().get(&note.id).unwrap();
        assert_eq!(saved.title, "Draft two");
        assert_eq!(saved.content, "body");
        let editor = app.note_editor.as_ref().unwrap();
        assert_eq!(editor.draft.title, "Draft two");
        assert_eq!(editor.draft.content, "body");
        assert!(matches!(app.screen, Screen::NoteEditor(_)));
    }

    #[tokio::test]
    async fn test_modified_keys_are_not_typed() {
        let workspace = Workspace::open(AppConfig::default(), None).await;
        workspace.tasks().add("Old", "").await.unwrap();
        let mut app = board(&workspace);

        app.handle_key(key('e')).await;
        app.handle_key(chord('c', KeyModifiers::CONTROL)).await;
        app.handle_key(chord('z', KeyModifiers::ALT)).await;
        app.handle_key(chord('A', KeyModifiers::SHIFT)).await;

        assert_eq!(app.task_editor.as_ref().unwrap().draft.title, "OldA");
    }

    #[tokio::test]
    async fn test_directory_prompt_ignores_chords() {
        let workspace = Workspace::open(AppConfig::default(), None).await;
        let mut app = App::new(&workspace);
        assert!(matches!(app.input_mode, InputMode::Directory));

        app.handle_key(chord('u', KeyModifiers::CONTROL)).await;
        type_text(&mut app, "~/notes").await;

        assert_eq!(app.input, "~/notes");
        assert_eq!(app.cursor_position, 7);
    }
}
