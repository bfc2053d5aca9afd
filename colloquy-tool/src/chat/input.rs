use chrono::Utc;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::app::{AppMode, ChatApp};
use super::line::LineInput;
use super::write_clipboard;

pub fn handle_event(app: &mut ChatApp, event: Event) {
    if let Event::Key(key) = event {
        if key.kind == KeyEventKind::Press {
            handle_key(app, key);
        }
    }
}

fn handle_key(app: &mut ChatApp, key: KeyEvent) {
    match app.mode {
        AppMode::Chat => handle_chat_key(app, key),
        AppMode::SelectConversation => handle_conversation_key(app, key),
        AppMode::Documents => handle_documents_key(app, key),
        AppMode::UploadPrompt => handle_upload_key(app, key),
        AppMode::Email => handle_email_key(app, key),
    }
}

/// Line-editing keys shared by the chat input and the prompts.
fn edit_line(line: &mut LineInput, key: KeyEvent) {
    match (key.code, key.modifiers) {
        (KeyCode::Backspace, _) => line.backspace(),
        (KeyCode::Delete, _) => line.delete(),
        (KeyCode::Left, _) => line.left(),
        (KeyCode::Right, _) => line.right(),
        (KeyCode::Home, _) => line.home(),
        (KeyCode::End, _) => line.end(),
        (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => line.insert(c),
        _ => {}
    }
}

fn handle_chat_key(app: &mut ChatApp, key: KeyEvent) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            app.should_quit = true;
        }
        (KeyCode::F(2), _) => {
            app.open_conversation_picker();
        }
        (KeyCode::F(3), _) => {
            app.open_documents();
        }
        (KeyCode::F(4), _) => {
            app.open_email();
        }
        (KeyCode::Char('n'), KeyModifiers::CONTROL) => {
            app.new_conversation();
        }
        (KeyCode::Char('b'), KeyModifiers::CONTROL) => {
            app.toggle_sidebar();
        }
        (KeyCode::Char('y'), KeyModifiers::CONTROL) => {
            app.copy_last_message(Utc::now(), write_clipboard);
        }
        (KeyCode::Enter, KeyModifiers::NONE) => {
            app.send_message();
        }
        (KeyCode::Up, KeyModifiers::CONTROL) => {
            app.scroll_up();
        }
        (KeyCode::Down, KeyModifiers::CONTROL) => {
            app.scroll_down();
        }
        _ if app.input_enabled() => edit_line(&mut app.input, key),
        _ => {}
    }
}

fn handle_conversation_key(app: &mut ChatApp, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_popup(),
        KeyCode::Enter => app.popup_select(),
        KeyCode::Up => app.popup_up(),
        KeyCode::Down => app.popup_down(),
        KeyCode::Char('d') => app.delete_selected_conversation(),
        _ => {}
    }
}

fn handle_documents_key(app: &mut ChatApp, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_popup(),
        KeyCode::Up => app.popup_up(),
        KeyCode::Down => app.popup_down(),
        KeyCode::Char('u') => app.open_upload_prompt(),
        KeyCode::Char('d') => app.delete_selected_document(),
        _ => {}
    }
}

fn handle_upload_key(app: &mut ChatApp, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_popup(),
        KeyCode::Enter => app.start_upload(),
        _ => edit_line(&mut app.prompt, key),
    }
}

fn handle_email_key(app: &mut ChatApp, key: KeyEvent) {
    if app.email.is_sending() {
        return;
    }
    match key.code {
        KeyCode::Esc => app.close_email(),
        KeyCode::Enter => app.send_email(),
        _ => edit_line(&mut app.prompt, key),
    }
}
