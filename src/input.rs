use crate::view::ViewMode;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    Select,
    Back,
    Refresh,
    OpenBrowser,
    SwitchRepo,
    InsertChar(char),
    DeleteChar,
    Confirm,
    Cancel,
    None,
}

/// Captures the UI state needed to interpret a key press.
#[derive(Debug, Clone, Copy)]
pub struct InputContext {
    pub mode: ViewMode,
}

pub fn map_key(key: KeyEvent, ctx: &InputContext) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }

    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    match ctx.mode {
        ViewMode::RepoInput => match key.code {
            KeyCode::Enter => Action::Confirm,
            KeyCode::Esc => Action::Cancel,
            KeyCode::Backspace => Action::DeleteChar,
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                Action::InsertChar(c)
            }
            _ => Action::None,
        },
        ViewMode::Detail => match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Up | KeyCode::Char('k') => Action::MoveUp,
            KeyCode::Down | KeyCode::Char('j') => Action::MoveDown,
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => Action::Back,
            KeyCode::Char('r') => Action::Refresh,
            KeyCode::Char('o') => Action::OpenBrowser,
            _ => Action::None,
        },
        ViewMode::List => match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Up | KeyCode::Char('k') => Action::MoveUp,
            KeyCode::Down | KeyCode::Char('j') => Action::MoveDown,
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => Action::Select,
            KeyCode::Char('r') => Action::Refresh,
            KeyCode::Char('o') => Action::OpenBrowser,
            KeyCode::Char('s') => Action::SwitchRepo,
            _ => Action::None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn press_with(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn release(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        }
    }

    fn list() -> InputContext {
        InputContext { mode: ViewMode::List }
    }

    fn detail() -> InputContext {
        InputContext { mode: ViewMode::Detail }
    }

    fn prompt() -> InputContext {
        InputContext { mode: ViewMode::RepoInput }
    }

    #[test]
    fn quit_on_q() {
        assert_eq!(map_key(press(KeyCode::Char('q')), &list()), Action::Quit);
        assert_eq!(map_key(press(KeyCode::Char('q')), &detail()), Action::Quit);
    }

    #[test]
    fn ctrl_c_quits_everywhere() {
        let key = press_with(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(key, &list()), Action::Quit);
        assert_eq!(map_key(key, &detail()), Action::Quit);
        assert_eq!(map_key(key, &prompt()), Action::Quit);
    }

    #[test]
    fn list_navigation() {
        assert_eq!(map_key(press(KeyCode::Up), &list()), Action::MoveUp);
        assert_eq!(map_key(press(KeyCode::Char('k')), &list()), Action::MoveUp);
        assert_eq!(map_key(press(KeyCode::Down), &list()), Action::MoveDown);
        assert_eq!(map_key(press(KeyCode::Char('j')), &list()), Action::MoveDown);
    }

    #[test]
    fn list_enter_selects() {
        assert_eq!(map_key(press(KeyCode::Enter), &list()), Action::Select);
    }

    #[test]
    fn list_s_switches_repo() {
        assert_eq!(map_key(press(KeyCode::Char('s')), &list()), Action::SwitchRepo);
    }

    #[test]
    fn list_esc_is_unbound() {
        assert_eq!(map_key(press(KeyCode::Esc), &list()), Action::None);
    }

    #[test]
    fn refresh_and_open_in_both_views() {
        for ctx in [list(), detail()] {
            assert_eq!(map_key(press(KeyCode::Char('r')), &ctx), Action::Refresh);
            assert_eq!(map_key(press(KeyCode::Char('o')), &ctx), Action::OpenBrowser);
        }
    }

    #[test]
    fn detail_back_keys() {
        for code in [KeyCode::Esc, KeyCode::Backspace, KeyCode::Left, KeyCode::Char('h')] {
            assert_eq!(map_key(press(code), &detail()), Action::Back);
        }
    }

    #[test]
    fn detail_scroll_keys() {
        assert_eq!(map_key(press(KeyCode::Char('j')), &detail()), Action::MoveDown);
        assert_eq!(map_key(press(KeyCode::Char('k')), &detail()), Action::MoveUp);
    }

    #[test]
    fn detail_enter_is_unbound() {
        assert_eq!(map_key(press(KeyCode::Enter), &detail()), Action::None);
    }

    #[test]
    fn prompt_captures_letters_including_q() {
        assert_eq!(map_key(press(KeyCode::Char('q')), &prompt()), Action::InsertChar('q'));
        assert_eq!(map_key(press(KeyCode::Char('/')), &prompt()), Action::InsertChar('/'));
    }

    #[test]
    fn prompt_editing_keys() {
        assert_eq!(map_key(press(KeyCode::Enter), &prompt()), Action::Confirm);
        assert_eq!(map_key(press(KeyCode::Esc), &prompt()), Action::Cancel);
        assert_eq!(map_key(press(KeyCode::Backspace), &prompt()), Action::DeleteChar);
    }

    #[test]
    fn prompt_ignores_alt_chords() {
        assert_eq!(
            map_key(press_with(KeyCode::Char('x'), KeyModifiers::ALT), &prompt()),
            Action::None
        );
    }

    #[test]
    fn prompt_accepts_shifted_chars() {
        assert_eq!(
            map_key(press_with(KeyCode::Char('A'), KeyModifiers::SHIFT), &prompt()),
            Action::InsertChar('A')
        );
    }

    #[test]
    fn non_press_event_filtered() {
        assert_eq!(map_key(release(KeyCode::Char('q')), &list()), Action::None);
    }

    #[test]
    fn unbound_key_returns_none() {
        assert_eq!(map_key(press(KeyCode::Char('z')), &list()), Action::None);
    }
}
