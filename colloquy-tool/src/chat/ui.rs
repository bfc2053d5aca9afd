use chrono::{Local, Utc};
use colloquy_session::{format_relative, EmailStatus, Sender, UploadStatus};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::app::{AppMode, ChatApp};
use super::line::LineInput;

const SIDEBAR_WIDTH: u16 = 32;

pub fn render(frame: &mut Frame, app: &ChatApp) {
    let main_area = if app.sidebar_open {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
            .split(frame.area());
        render_sidebar(frame, app, columns[0]);
        columns[1]
    } else {
        frame.area()
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(1),    // Messages
            Constraint::Length(3), // Input
            Constraint::Length(1), // Status bar
        ])
        .split(main_area);

    render_header(frame, app, chunks[0]);
    render_messages(frame, app, chunks[1]);
    render_input(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render popup if active
    match app.mode {
        AppMode::SelectConversation => render_conversation_popup(frame, app),
        AppMode::Documents => render_documents_popup(frame, app),
        AppMode::UploadPrompt => {
            render_documents_popup(frame, app);
            render_prompt(frame, "Upload file (path)", &app.prompt, app.last_error.as_deref());
        }
        AppMode::Email => render_email_popup(frame, app),
        AppMode::Chat => {}
    }
}

fn render_sidebar(frame: &mut Frame, app: &ChatApp, area: Rect) {
    let now = Utc::now();
    let current = app.state.conversations.current_id();

    let items: Vec<ListItem> = app
        .state
        .conversations
        .list()
        .iter()
        .map(|conv| {
            let style = if Some(conv.id()) == current {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let marker = if app.state.pending.is_sending(conv.id()) { " …" } else { "" };
            ListItem::new(vec![
                Line::from(Span::styled(format!("{}{}", conv.title(), marker), style)),
                Line::from(Span::styled(
                    format!("  {}", format_relative(conv.created_at(), now)),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Conversations"));
    frame.render_widget(list, area);
}

fn render_header(frame: &mut Frame, app: &ChatApp, area: Rect) {
    let title = match app.current_conversation() {
        Some(conv) => format!("colloquy - {}", conv.title()),
        None => "colloquy".to_string(),
    };
    let docs = app.state.documents.list().len();
    let docs_text = if docs > 0 { format!("  [{} docs]", docs) } else { String::new() };

    let header = Paragraph::new(format!("{}{}", title, docs_text))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    frame.render_widget(header, area);
}

fn render_messages(frame: &mut Frame, app: &ChatApp, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    match app.current_conversation() {
        None => {
            lines.push(Line::from(Span::styled(
                "No conversation selected. Press Ctrl+N to start one.",
                Style::default().fg(Color::DarkGray),
            )));
        }
        Some(conv) if conv.is_empty() => {
            lines.push(Line::from(Span::styled(
                "Start a conversation by typing a message below.",
                Style::default().fg(Color::DarkGray),
            )));
        }
        Some(conv) => {
            for msg in conv.messages() {
                let (role, style) = match msg.sender {
                    Sender::User => ("You", Style::default().fg(Color::Green)),
                    Sender::Agent => ("Assistant", Style::default().fg(Color::Blue)),
                };
                let time = msg.timestamp.with_timezone(&Local).format("%H:%M");

                // Role header
                let mut header = vec![
                    Span::styled(format!("{}:", role), style.add_modifier(Modifier::BOLD)),
                    Span::styled(format!(" {}", time), Style::default().fg(Color::DarkGray)),
                ];
                if app.copied_message() == Some(msg.id) {
                    header.push(Span::styled(" ✓ Copied", Style::default().fg(Color::Green)));
                }
                lines.push(Line::from(header));

                for line in msg.content.lines() {
                    lines.push(Line::from(format!("  {}", line)));
                }

                lines.push(Line::from("")); // Empty line between messages
            }
        }
    }

    // Loading indicator
    if app.state.current_is_sending() {
        lines.push(Line::from(Span::styled(
            "Waiting for response...",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        )));
    }

    // Error display
    if app.mode == AppMode::Chat {
        if let Some(ref error) = app.last_error {
            lines.push(Line::from(Span::styled(
                format!("Error: {}", error),
                Style::default().fg(Color::Red),
            )));
        }
    }

    let messages_block = Block::default().borders(Borders::ALL).title("Messages");

    // Calculate scroll offset to show the bottom of the conversation
    let visible_height = area.height.saturating_sub(2) as usize; // Account for borders
    let total_lines = lines.len();
    let scroll = if total_lines > visible_height {
        (total_lines - visible_height).saturating_sub(app.messages_scroll as usize)
    } else {
        0
    };

    let paragraph = Paragraph::new(Text::from(lines))
        .block(messages_block)
        .wrap(Wrap { trim: false })
        .scroll((scroll as u16, 0));

    frame.render_widget(paragraph, area);
}

fn render_input(frame: &mut Frame, app: &ChatApp, area: Rect) {
    let input_block = Block::default().borders(Borders::ALL).title("Input");

    let (display_text, style) = if app.current_conversation().is_none() {
        ("Press Ctrl+N to start a new chat".to_string(), Style::default().fg(Color::DarkGray))
    } else if app.state.current_is_sending() {
        ("Waiting for response...".to_string(), Style::default().fg(Color::DarkGray))
    } else if app.input.is_empty() {
        ("Type your message...".to_string(), Style::default().fg(Color::DarkGray))
    } else {
        (app.input.text.clone(), Style::default())
    };

    let input_paragraph = Paragraph::new(display_text)
        .style(style)
        .block(input_block);

    frame.render_widget(input_paragraph, area);

    if app.input_enabled() {
        let cursor_x = area.x + 1 + app.input.cursor_column() as u16;
        frame.set_cursor_position((cursor_x, area.y + 1));
    }
}

fn render_status_bar(frame: &mut Frame, app: &ChatApp, area: Rect) {
    let status = match app.mode {
        AppMode::Chat if app.state.current_is_sending() => {
            "Waiting for response...  Ctrl+N: New  F2: Conversations  Esc: Quit"
        }
        AppMode::Chat => {
            "Enter: Send  Ctrl+N: New  Ctrl+Y: Copy  F2: Conversations  F3: Documents  F4: Email  Ctrl+B: Sidebar  Esc: Quit"
        }
        AppMode::SelectConversation => "↑/↓: Navigate  Enter: Open  d: Delete  Esc: Close",
        AppMode::Documents => "↑/↓: Navigate  u: Upload  d: Delete  Esc: Close",
        AppMode::UploadPrompt => "Enter: Upload  Esc: Cancel",
        AppMode::Email => "Enter: Send  Esc: Close",
    };

    let status_bar = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));

    frame.render_widget(status_bar, area);
}

fn render_popup(frame: &mut Frame, title: &str, items: Vec<ListItem>, selected: usize) {
    let area = centered_rect(50, 50, frame.area());

    frame.render_widget(Clear, area);

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ratatui::widgets::ListState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_conversation_popup(frame: &mut Frame, app: &ChatApp) {
    let current = app.state.conversations.current_id();
    let items: Vec<ListItem> = app
        .state
        .conversations
        .list()
        .iter()
        .map(|conv| {
            let is_current = Some(conv.id()) == current;
            let style = if is_current {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };
            let marker = if is_current { " ✓" } else { "" };
            ListItem::new(format!("{}{}", conv.title(), marker)).style(style)
        })
        .collect();

    render_popup(frame, "Conversations", items, app.popup_selected);
}

fn render_documents_popup(frame: &mut Frame, app: &ChatApp) {
    let now = Utc::now();
    let mut items: Vec<ListItem> = app
        .state
        .documents
        .list()
        .iter()
        .map(|doc| {
            let (badge, color) = match &doc.status {
                UploadStatus::Uploading => ("uploading".to_string(), Color::Yellow),
                UploadStatus::Success => ("ready".to_string(), Color::Green),
                UploadStatus::Error(detail) => (format!("error: {}", detail), Color::Red),
            };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{}  ", doc.name)),
                Span::styled(format!("[{}]", badge), Style::default().fg(color)),
                Span::styled(
                    format!("  {}", format_relative(doc.uploaded_at, now)),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    if items.is_empty() {
        items.push(ListItem::new(Span::styled(
            "No documents. Press u to upload.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    if app.mode == AppMode::Documents {
        if let Some(ref error) = app.last_error {
            items.push(ListItem::new(Span::styled(
                format!("Error: {}", error),
                Style::default().fg(Color::Red),
            )));
        }
    }

    render_popup(frame, "Knowledge Base", items, app.popup_selected);
}

fn render_prompt(frame: &mut Frame, title: &str, line: &LineInput, error: Option<&str>) {
    let area = centered_rect(60, 20, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![Line::from(line.text.clone())];
    if let Some(error) = error {
        lines.push(Line::from(Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )));
    }

    let prompt = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .wrap(Wrap { trim: false });
    frame.render_widget(prompt, area);

    frame.set_cursor_position((area.x + 1 + line.cursor_column() as u16, area.y + 1));
}

fn render_email_popup(frame: &mut Frame, app: &ChatApp) {
    let area = centered_rect(60, 25, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled("Recipient:", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(app.prompt.text.clone()),
        Line::from(""),
    ];

    let status = match app.email_status() {
        EmailStatus::Idle => None,
        EmailStatus::Sending => Some(Span::styled("Sending...", Style::default().fg(Color::Yellow))),
        EmailStatus::Success { .. } => Some(Span::styled(
            "Email sent successfully!",
            Style::default().fg(Color::Green),
        )),
        EmailStatus::Error(message) => Some(Span::styled(message.clone(), Style::default().fg(Color::Red))),
    };
    if let Some(ref error) = app.last_error {
        lines.push(Line::from(Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )));
    } else if let Some(status) = status {
        lines.push(Line::from(status));
    }

    let dialog = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("Email conversation"))
        .wrap(Wrap { trim: false });
    frame.render_widget(dialog, area);

    if !app.email.is_sending() {
        frame.set_cursor_position((area.x + 1 + app.prompt.cursor_column() as u16, area.y + 2));
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
