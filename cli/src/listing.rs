use chrono::{DateTime, Local, Utc};
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};
use tasknote_core::{Note, Task, TaskStatus};

const MIN_ID_LEN: usize = 6;

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

#[derive(Tabled)]
struct NoteRow {
    #[tabled(rename = "")]
    favorite: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Tags")]
    tags: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

pub fn show_board(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    for status in TaskStatus::ALL {
        let rows: Vec<TaskRow> = tasks
            .iter()
            .filter(|t| t.status == status)
            .map(|t| TaskRow {
                id: short_id(&t.id, &ids),
                title: t.title.clone(),
                description: first_line(&t.description),
                updated: format_time(t.updated_at),
            })
            .collect();

        println!("\n\x1b[1;36m{}\x1b[0m ({})", status.label(), rows.len());
        if rows.is_empty() {
            continue;
        }
        println!("{}", render(Table::new(rows)));
    }
}

pub fn show_notes(notes: &[Note]) {
    if notes.is_empty() {
        println!("No notes found.");
        return;
    }

    let ids: Vec<&str> = notes.iter().map(|n| n.id.as_str()).collect();
    let rows: Vec<NoteRow> = notes
        .iter()
        .map(|n| NoteRow {
            favorite: if n.is_favorite { "★".into() } else { String::new() },
            id: short_id(&n.id, &ids),
            title: n.title.clone(),
            tags: n.tags.iter().collect::<Vec<_>>().join(", "),
            updated: format_time(n.updated_at),
        })
        .collect();
    println!("{}", render(Table::new(rows)));
}

pub fn show_note(note: &Note) {
    let star = if note.is_favorite { " ★" } else { "" };
    println!("\x1b[1m{}\x1b[0m{}", note.title, star);
    println!("ID: {}", note.id);
    if !note.tags.is_empty() {
        println!("Tags: {}", note.tags.iter().collect::<Vec<_>>().join(", "));
    }
    println!("Created: {}  Updated: {}", format_time(note.created_at), format_time(note.updated_at));
    if !note.content.is_empty() {
        println!("\n{}", note.content);
    }
}

fn render(mut table: Table) -> Table {
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    table
}

fn format_time(time: DateTime<Utc>) -> String {
    DateTime::<Local>::from(time).format("%Y-%m-%d %H:%M").to_string()
}

fn first_line(text: &str) -> String {
    let line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    if text.trim() != line {
        format!("{}…", line)
    } else {
        line.to_string()
    }
}

/// Shortest prefix of `id` (at least `MIN_ID_LEN` chars) that no other id in
/// `all` shares.
pub fn short_id(id: &str, all: &[&str]) -> String {
    let chars: Vec<char> = id.chars().collect();
    let mut len = MIN_ID_LEN.min(chars.len());
    loop {
        let prefix: String = chars[..len].iter().collect();
        let clash = all.iter().any(|other| *other != id && other.starts_with(&prefix));
        if !clash || len == chars.len() {
            return prefix;
        }
        len += 1;
    }
}
