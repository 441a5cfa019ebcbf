use crate::app::actions::Action;
use crate::app::events::{Event, InputEvent};
use crate::app::state::AppState;
use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

pub fn spawn_input_task(tx: mpsc::Sender<Event>) {
    tokio::task::spawn_blocking(move || {
        loop {
            if event::poll(std::time::Duration::from_millis(250)).unwrap_or(false) {
                let ev = match event::read() {
                    Ok(CtEvent::Key(k)) if k.kind == KeyEventKind::Press => InputEvent::Key(k),
                    Ok(CtEvent::Resize(_, _)) => InputEvent::Resize,
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::debug!("terminal read: {e}");
                        continue;
                    }
                };
                if tx.blocking_send(Event::Input(ev)).is_err() {
                    break;
                }
            } else if tx.is_closed() {
                break;
            }
        }
    });
}

pub fn map_input_to_action(state: &AppState, ev: InputEvent) -> Option<Action> {
    match ev {
        InputEvent::Resize => Some(Action::Resize),
        InputEvent::Key(k) if state.show_help => handle_help_overlay(k),
        InputEvent::Key(k) => handle_normal_mode(k),
    }
}

fn handle_help_overlay(k: KeyEvent) -> Option<Action> {
    match k.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter => Some(Action::ToggleHelp),
        _ => None,
    }
}

fn handle_normal_mode(k: KeyEvent) -> Option<Action> {
    if k.modifiers.contains(KeyModifiers::CONTROL) {
        return match k.code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }

    match k.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('?') => Some(Action::ToggleHelp),

        KeyCode::Up | KeyCode::Char('k') => Some(Action::ListUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::ListDown),
        KeyCode::Home | KeyCode::Char('g') => Some(Action::GoTop),
        KeyCode::End | KeyCode::Char('G') => Some(Action::GoBottom),

        KeyCode::Enter => Some(Action::PlaySelected),
        KeyCode::Char(' ') => Some(Action::TogglePause),
        KeyCode::Char('n') => Some(Action::PlayNext),
        KeyCode::Char('p') => Some(Action::PlayPrev),
        KeyCode::Char('s') => Some(Action::ShufflePick),
        KeyCode::Char('=') | KeyCode::Char('+') => Some(Action::VolumeUp),
        KeyCode::Char('-') | KeyCode::Char('_') => Some(Action::VolumeDown),
        KeyCode::Char('m') => Some(Action::ToggleMute),
        KeyCode::Char(']') | KeyCode::Right => Some(Action::SeekForward),
        KeyCode::Char('[') | KeyCode::Left => Some(Action::SeekBack),
        KeyCode::Char('r') => Some(Action::Retry),

        KeyCode::Char('d') | KeyCode::Delete => Some(Action::QueueRemoveSelected),
        KeyCode::Char('c') => Some(Action::QueueClear),
        KeyCode::Char('L') => Some(Action::ToggleLoop),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> InputEvent {
        InputEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn transport_keys() {
        let s = AppState::default();
        assert_eq!(map_input_to_action(&s, key(KeyCode::Char(' '))), Some(Action::TogglePause));
        assert_eq!(map_input_to_action(&s, key(KeyCode::Char(']'))), Some(Action::SeekForward));
        assert_eq!(map_input_to_action(&s, key(KeyCode::Char('L'))), Some(Action::ToggleLoop));
        assert_eq!(map_input_to_action(&s, key(KeyCode::Char('l'))), None);
        assert_eq!(map_input_to_action(&s, key(KeyCode::Enter)), Some(Action::PlaySelected));
    }

    #[test]
    fn help_overlay_swallows_keys() {
        let s = AppState {
            show_help: true,
            ..AppState::default()
        };
        assert_eq!(map_input_to_action(&s, key(KeyCode::Char('n'))), None);
        assert_eq!(map_input_to_action(&s, key(KeyCode::Esc)), Some(Action::ToggleHelp));
        assert_eq!(map_input_to_action(&s, key(KeyCode::Char('q'))), Some(Action::Quit));
    }

    #[test]
    fn ctrl_c_quits() {
        let s = AppState::default();
        let ev = InputEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(map_input_to_action(&s, ev), Some(Action::Quit));
    }
}
