//! Keyboard handling for browse and focus modes.
//!
//! Browse mode drives selection and lifecycle; focus mode turns keys into
//! the byte sequences a real terminal would send and forwards them to the
//! focused child's PTY. Ctrl-C is global and always quits.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::App;

pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }
    if app.focus_mode {
        handle_focus_key(app, key);
    } else {
        handle_browse_key(app, key);
    }
}

fn handle_browse_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Enter | KeyCode::Tab => app.enter_focus(),
        KeyCode::Char('r') => {
            let index = app.selected;
            app.manager.restart(index);
        }
        KeyCode::Char('A') => app.manager.restart_all(),
        KeyCode::Char('x') => {
            let index = app.selected;
            app.manager.kill(index);
        }
        KeyCode::Char('g') => app.toggle_pin(),
        KeyCode::Char('t') => app.jump_to_top(),
        KeyCode::Char('G' | 'b') => app.jump_to_bottom(),
        KeyCode::PageUp => app.page_up(),
        KeyCode::PageDown => app.page_down(),
        KeyCode::Char('w') => app.toggle_wrap(),
        KeyCode::Char('?') => app.show_help = !app.show_help,
        _ => {}
    }
}

fn handle_focus_key(app: &mut App, key: KeyEvent) {
    let passthrough = app.selected_process().passthrough;
    // Esc and Shift-Tab leave focus mode, unless the process asked for
    // them with the `!` decorator; then the child gets the real bytes and
    // only a click outside the panel releases focus.
    match key.code {
        KeyCode::Esc | KeyCode::BackTab if !passthrough => {
            app.exit_focus();
            return;
        }
        _ => {}
    }
    let bytes = key_to_bytes(key);
    if !bytes.is_empty() {
        let index = app.selected;
        app.manager.write(index, &bytes);
    }
}

/// The byte sequence a terminal would send for this key.
pub fn key_to_bytes(key: KeyEvent) -> Vec<u8> {
    match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            // Ctrl+A = 0x01 ... Ctrl+Z = 0x1a.
            let byte = c.to_ascii_lowercase() as u8;
            if byte.is_ascii_lowercase() {
                vec![byte - b'a' + 1]
            } else {
                vec![byte]
            }
        }
        KeyCode::Char(c) => {
            let mut buf = [0; 4];
            c.encode_utf8(&mut buf).as_bytes().to_vec()
        }
        KeyCode::Enter => vec![b'\r'],
        KeyCode::Backspace => vec![0x7f],
        KeyCode::Tab => vec![b'\t'],
        KeyCode::BackTab => b"\x1b[Z".to_vec(),
        KeyCode::Esc => vec![0x1b],
        KeyCode::Up => b"\x1b[A".to_vec(),
        KeyCode::Down => b"\x1b[B".to_vec(),
        KeyCode::Right => b"\x1b[C".to_vec(),
        KeyCode::Left => b"\x1b[D".to_vec(),
        KeyCode::Home => b"\x1b[H".to_vec(),
        KeyCode::End => b"\x1b[F".to_vec(),
        KeyCode::PageUp => b"\x1b[5~".to_vec(),
        KeyCode::PageDown => b"\x1b[6~".to_vec(),
        KeyCode::Delete => b"\x1b[3~".to_vec(),
        KeyCode::Insert => b"\x1b[2~".to_vec(),
        KeyCode::F(n) => match n {
            1 => b"\x1bOP".to_vec(),
            2 => b"\x1bOQ".to_vec(),
            3 => b"\x1bOR".to_vec(),
            4 => b"\x1bOS".to_vec(),
            5 => b"\x1b[15~".to_vec(),
            6 => b"\x1b[17~".to_vec(),
            7 => b"\x1b[18~".to_vec(),
            8 => b"\x1b[19~".to_vec(),
            9 => b"\x1b[20~".to_vec(),
            10 => b"\x1b[21~".to_vec(),
            11 => b"\x1b[23~".to_vec(),
            12 => b"\x1b[24~".to_vec(),
            _ => vec![],
        },
        _ => vec![],
    }
}
