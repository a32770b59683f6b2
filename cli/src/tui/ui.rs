use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};
use tasknote_core::{Screen, TaskStatus};
use unicode_width::UnicodeWidthStr;

use crate::tui::app::{App, InputMode, NoteField, TaskField};

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(3), // Input / status
            Constraint::Length(1), // Help
        ])
        .split(size);

    let directory = app
        .workspace
        .directory_name()
        .unwrap_or_else(|| "no directory".to_string());
    let header = Paragraph::new(format!("TASKNOTE  |  {}", directory))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(rounded(""));
    f.render_widget(header, main_chunks[0]);

    match app.screen {
        Screen::Board => draw_board(f, app, main_chunks[1]),
        Screen::Notes => draw_notes(f, app, main_chunks[1]),
        Screen::TaskEditor(_) => draw_task_editor(f, app, main_chunks[1]),
        Screen::NoteEditor(_) => draw_note_editor(f, app, main_chunks[1]),
    }

    draw_input(f, app, main_chunks[2]);

    let footer = Paragraph::new(help_text(app))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(footer, main_chunks[3]);
}

fn rounded(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
}

fn focused(block: Block<'_>, is_focused: bool) -> Block<'_> {
    if is_focused {
        block.border_style(Style::default().fg(Color::Yellow))
    } else {
        block
    }
}

fn help_text(app: &App) -> &'static str {
    match app.input_mode {
        InputMode::Adding => "Enter: Add task | Esc: Cancel",
        InputMode::Directory => "Enter: Use directory | Esc: Cancel",
        InputMode::Normal => match app.screen {
            Screen::Board => {
                "h/l: Column | j/k: Navigate | H/L: Move task | a: Add | e: Edit | d: Delete | Tab: Notes | o: Directory | q: Quit"
            }
            Screen::Notes => {
                "j/k: Navigate | a: New | e: Edit | f: Favorite | d: Delete | Tab: Board | o: Directory | q: Quit"
            }
            Screen::TaskEditor(_) => "Tab: Field | Ctrl+S: Save | Esc: Back",
            Screen::NoteEditor(_) => "Tab: Field | Enter on tags: Add tag | Ctrl+S: Save | Esc: Back",
        },
    }
}

fn draw_board(f: &mut Frame, app: &mut App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    for (i, status) in TaskStatus::ALL.iter().enumerate() {
        let tasks = app.column_tasks(*status);
        let title = format!(" {} ({}) ", status.label(), tasks.len());
        let items: Vec<ListItem> = tasks
            .iter()
            .map(|task| {
                let mut lines = vec![Line::from(Span::styled(
                    task.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ))];
                if let Some(first) = task.description.lines().find(|l| !l.trim().is_empty()) {
                    lines.push(Line::from(Span::styled(
                        first.trim().to_string(),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
                ListItem::new(lines)
            })
            .collect();

        let is_focused = i == app.column;
        let highlight = if is_focused {
            Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let list = List::new(items)
            .block(focused(rounded(&title), is_focused))
            .highlight_style(highlight)
            .highlight_symbol(if is_focused { ">> " } else { "   " });
        f.render_stateful_widget(list, columns[i], &mut app.columns[i]);
    }
}

fn draw_notes(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let notes = app.workspace.notes().notes();
    let items: Vec<ListItem> = notes
        .iter()
        .map(|note| {
            let star = if note.is_favorite { "★ " } else { "  " };
            let mut spans = vec![
                Span::styled(star, Style::default().fg(Color::Yellow)),
                Span::styled(note.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
            ];
            for tag in note.tags.iter() {
                spans.push(Span::styled(format!(" #{}", tag), Style::default().fg(Color::Blue)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(rounded(" Notes "))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, chunks[0], &mut app.note_state);

    let preview = match app.selected_note() {
        Some(note) => {
            let mut text = vec![
                Line::from(Span::styled(note.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
                Line::from(Span::styled(
                    format!("Updated {}", note.updated_at.format("%Y-%m-%d %H:%M")),
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(""),
            ];
            text.extend(note.content.lines().map(|l| Line::from(l.to_string())));
            Paragraph::new(text)
        }
        None => Paragraph::new("No notes yet. Press 'a' to create one."),
    };
    f.render_widget(preview.block(rounded(" Preview ")).wrap(Wrap { trim: false }), chunks[1]);
}

fn draw_task_editor(f: &mut Frame, app: &App, area: Rect) {
    let Some(editor) = app.task_editor.as_ref() else {
        return;
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let title = Paragraph::new(editor.draft.title.as_str())
        .block(focused(rounded(" Title "), editor.field == TaskField::Title));
    f.render_widget(title, chunks[0]);

    let description = Paragraph::new(editor.draft.description.as_str())
        .wrap(Wrap { trim: false })
        .block(focused(rounded(" Description "), editor.field == TaskField::Description));
    f.render_widget(description, chunks[1]);

    let info = Paragraph::new(format!(
        "Status: {}  |  Created {}  |  Updated {}",
        editor.task.status,
        editor.task.created_at.format("%Y-%m-%d %H:%M"),
        editor.task.updated_at.format("%Y-%m-%d %H:%M"),
    ))
    .style(Style::default().fg(Color::DarkGray));
    f.render_widget(info, chunks[2]);

    if matches!(app.input_mode, InputMode::Normal) {
        let (text, rect) = match editor.field {
            TaskField::Title => (editor.draft.title.as_str(), chunks[0]),
            TaskField::Description => (editor.draft.description.as_str(), chunks[1]),
        };
        place_cursor(f, text, rect);
    }
}

fn draw_note_editor(f: &mut Frame, app: &App, area: Rect) {
    let Some(editor) = app.note_editor.as_ref() else {
        return;
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let title = Paragraph::new(editor.draft.title.as_str())
        .block(focused(rounded(" Title (blank: first line of content) "), editor.field == NoteField::Title));
    f.render_widget(title, chunks[0]);

    let mut spans: Vec<Span> = editor
        .draft
        .tags
        .iter()
        .map(|tag| Span::styled(format!("#{} ", tag), Style::default().fg(Color::Blue)))
        .collect();
    spans.push(Span::raw(editor.draft.tag_input.clone()));
    let tags = Paragraph::new(Line::from(spans))
        .block(focused(rounded(" Tags "), editor.field == NoteField::Tags));
    f.render_widget(tags, chunks[1]);

    let favorite = if editor.note.is_favorite { " ★ Content " } else { " Content " };
    let content = Paragraph::new(editor.draft.content.as_str())
        .wrap(Wrap { trim: false })
        .block(focused(rounded(favorite), editor.field == NoteField::Content));
    f.render_widget(content, chunks[2]);

    if matches!(app.input_mode, InputMode::Normal) {
        match editor.field {
            NoteField::Title => place_cursor(f, &editor.draft.title, chunks[0]),
            NoteField::Tags => {
                let offset: usize = editor.draft.tags.iter().map(|t| t.width() + 2).sum();
                let x = chunks[1].x + 1 + (offset + editor.draft.tag_input.width()) as u16;
                f.set_cursor_position((x.min(chunks[1].right().saturating_sub(2)), chunks[1].y + 1));
            }
            NoteField::Content => place_cursor(f, &editor.draft.content, chunks[2]),
        }
    }
}

/// Puts the cursor after the last character of `text` inside a bordered
/// block. Wrapping is ignored, so long lines clamp to the right edge.
fn place_cursor(f: &mut Frame, text: &str, rect: Rect) {
    let lines: Vec<&str> = text.split('\n').collect();
    let row = lines.len().saturating_sub(1) as u16;
    let col = lines.last().map(|l| l.width()).unwrap_or(0) as u16;
    let x = (rect.x + 1 + col).min(rect.right().saturating_sub(2));
    let y = (rect.y + 1 + row).min(rect.bottom().saturating_sub(2));
    f.set_cursor_position((x, y));
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let (title, style) = match app.input_mode {
        InputMode::Normal => (" Status ", Style::default()),
        InputMode::Adding => (" New task title ", Style::default().fg(Color::Yellow)),
        InputMode::Directory => (" Data directory ", Style::default().fg(Color::Yellow)),
    };

    let text = match app.input_mode {
        InputMode::Normal => {
            if app.workspace.is_loading() {
                "Loading...".to_string()
            } else {
                app.message.clone().unwrap_or_default()
            }
        }
        _ => app.input.clone(),
    };

    let input = Paragraph::new(text)
        .style(style)
        .block(rounded(title));
    f.render_widget(input, area);

    if !matches!(app.input_mode, InputMode::Normal) {
        let prefix: String = app.input.chars().take(app.cursor_position).collect();
        f.set_cursor_position((area.x + prefix.width() as u16 + 1, area.y + 1));
    }
}
