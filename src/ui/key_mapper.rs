// Maps keyboard input to actions based on the current mode

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;
use tracing::trace;

use crate::ui::actions::{Action, AppMode, NavigateAction};

type KeyMap = HashMap<(KeyCode, KeyModifiers), Action>;

pub struct KeyMapper {
    /// Mappings that apply in every mode
    global_mappings: KeyMap,

    mode_mappings: HashMap<AppMode, KeyMap>,

    /// Vim-style count typed before a motion ("5j")
    count_buffer: String,
}

impl Default for KeyMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyMapper {
    pub fn new() -> Self {
        let mut mapper = Self {
            global_mappings: HashMap::new(),
            mode_mappings: HashMap::new(),
            count_buffer: String::new(),
        };

        mapper.init_global_mappings();
        mapper.init_browse_mappings();
        mapper.init_input_mappings();
        mapper.init_detail_mappings();
        mapper.init_prompt_mappings();
        mapper
    }

    fn init_global_mappings(&mut self) {
        use KeyCode::*;
        use KeyModifiers as Mod;

        self.global_mappings
            .insert((F(1), Mod::NONE), Action::ShowHelp);
        self.global_mappings
            .insert((F(5), Mod::NONE), Action::ShowDebugInfo);
        self.global_mappings
            .insert((Char('c'), Mod::CONTROL), Action::ForceQuit);
    }

    fn init_browse_mappings(&mut self) {
        use KeyCode::*;
        use KeyModifiers as Mod;
        use NavigateAction as Nav;

        let mut m = KeyMap::new();

        m.insert((Up, Mod::NONE), Action::Navigate(Nav::Up(1)));
        m.insert((Down, Mod::NONE), Action::Navigate(Nav::Down(1)));
        m.insert((Left, Mod::NONE), Action::Navigate(Nav::Left(1)));
        m.insert((Right, Mod::NONE), Action::Navigate(Nav::Right(1)));
        m.insert((Char('k'), Mod::NONE), Action::Navigate(Nav::Up(1)));
        m.insert((Char('j'), Mod::NONE), Action::Navigate(Nav::Down(1)));
        m.insert((Char('h'), Mod::NONE), Action::Navigate(Nav::Left(1)));
        m.insert((Char('l'), Mod::NONE), Action::Navigate(Nav::Right(1)));
        m.insert((PageUp, Mod::NONE), Action::Navigate(Nav::PageUp));
        m.insert((PageDown, Mod::NONE), Action::Navigate(Nav::PageDown));
        m.insert((Char('u'), Mod::CONTROL), Action::Navigate(Nav::PageUp));
        m.insert((Char('d'), Mod::CONTROL), Action::Navigate(Nav::PageDown));
        m.insert((Home, Mod::NONE), Action::Navigate(Nav::Home));
        m.insert((End, Mod::NONE), Action::Navigate(Nav::End));
        m.insert((Char('g'), Mod::NONE), Action::Navigate(Nav::Home));
        m.insert((Char('G'), Mod::SHIFT), Action::Navigate(Nav::End));

        m.insert((Char('<'), Mod::NONE), Action::HeaderCursorLeft);
        m.insert((Char('>'), Mod::NONE), Action::HeaderCursorRight);
        m.insert((Char('S'), Mod::SHIFT), Action::PressHeader);

        m.insert((Enter, Mod::NONE), Action::OpenSelected);
        m.insert((Char('e'), Mod::NONE), Action::EditSelected);
        m.insert((Char('d'), Mod::NONE), Action::DeleteSelected);
        m.insert((Char('n'), Mod::NONE), Action::CreateItem);

        m.insert((Char('/'), Mod::NONE), Action::StartSearch);
        m.insert((Char('s'), Mod::NONE), Action::CycleSort);
        m.insert((Char('f'), Mod::NONE), Action::CycleStatusFilter);
        m.insert((Char('v'), Mod::NONE), Action::CycleViewMode);
        m.insert((Char('r'), Mod::NONE), Action::Refresh);
        m.insert((F(5), Mod::SHIFT), Action::Refresh);

        m.insert((Char('t'), Mod::NONE), Action::CycleTheme);
        m.insert((Char('c'), Mod::NONE), Action::CycleTint);
        m.insert((Char('L'), Mod::SHIFT), Action::ToggleLanguage);

        m.insert((Char('?'), Mod::NONE), Action::ShowHelp);
        m.insert((Esc, Mod::NONE), Action::ExitCurrentMode);
        m.insert((Char('q'), Mod::NONE), Action::Quit);

        self.mode_mappings.insert(AppMode::Browse, m);
    }

    /// Text entry modes: only control keys are mapped, the rest is typed
    fn init_input_mappings(&mut self) {
        use KeyCode::*;
        use KeyModifiers as Mod;

        let mut search = KeyMap::new();
        search.insert((Enter, Mod::NONE), Action::Submit);
        search.insert((Esc, Mod::NONE), Action::Cancel);
        self.mode_mappings.insert(AppMode::Search, search);

        let mut form = KeyMap::new();
        form.insert((Enter, Mod::NONE), Action::Submit);
        form.insert((Esc, Mod::NONE), Action::Cancel);
        form.insert((Tab, Mod::NONE), Action::NextField);
        form.insert((Down, Mod::NONE), Action::NextField);
        form.insert((BackTab, Mod::SHIFT), Action::PreviousField);
        form.insert((Up, Mod::NONE), Action::PreviousField);
        self.mode_mappings.insert(AppMode::Form, form);
    }

    fn init_detail_mappings(&mut self) {
        use KeyCode::*;
        use KeyModifiers as Mod;

        let mut m = KeyMap::new();
        m.insert((Char('e'), Mod::NONE), Action::EditSelected);
        m.insert((Char('d'), Mod::NONE), Action::DeleteSelected);
        m.insert((Esc, Mod::NONE), Action::ExitCurrentMode);
        m.insert((Char('q'), Mod::NONE), Action::ExitCurrentMode);
        m.insert((Backspace, Mod::NONE), Action::ExitCurrentMode);
        self.mode_mappings.insert(AppMode::Detail, m);
    }

    fn init_prompt_mappings(&mut self) {
        use KeyCode::*;
        use KeyModifiers as Mod;

        let mut confirm = KeyMap::new();
        confirm.insert((Char('y'), Mod::NONE), Action::Confirm);
        confirm.insert((Char('Y'), Mod::SHIFT), Action::Confirm);
        confirm.insert((Char('n'), Mod::NONE), Action::Cancel);
        confirm.insert((Esc, Mod::NONE), Action::Cancel);
        self.mode_mappings.insert(AppMode::ConfirmDelete, confirm);

        let mut close = KeyMap::new();
        close.insert((Esc, Mod::NONE), Action::ExitCurrentMode);
        close.insert((Char('q'), Mod::NONE), Action::ExitCurrentMode);
        close.insert((Enter, Mod::NONE), Action::ExitCurrentMode);
        self.mode_mappings.insert(AppMode::Help, close.clone());
        self.mode_mappings.insert(AppMode::Debug, close);
    }

    /// Map a key to an action. None means the key is unmapped in this mode
    /// (text modes forward it to the input widget).
    pub fn map_key(&mut self, key: KeyEvent, mode: AppMode) -> Option<Action> {
        if mode == AppMode::Browse {
            if let KeyCode::Char(c) = key.code {
                if c.is_ascii_digit() && (c != '0' || !self.count_buffer.is_empty()) {
                    self.count_buffer.push(c);
                    trace!(target: "key_mapper", "Count buffer: {}", self.count_buffer);
                    return None;
                }
            }
        }

        let lookup = (key.code, key.modifiers);
        let action = self
            .global_mappings
            .get(&lookup)
            .or_else(|| self.mode_mappings.get(&mode).and_then(|m| m.get(&lookup)))
            .or_else(|| {
                // Some terminals report uppercase letters without SHIFT
                if let KeyCode::Char(c) = key.code {
                    if c.is_ascii_uppercase() && key.modifiers == KeyModifiers::NONE {
                        return self
                            .mode_mappings
                            .get(&mode)
                            .and_then(|m| m.get(&(key.code, KeyModifiers::SHIFT)));
                    }
                }
                None
            })
            .cloned();

        let count = self.take_count();
        action.map(|a| Self::apply_count(a, count))
    }

    fn take_count(&mut self) -> usize {
        let count = self.count_buffer.parse().unwrap_or(1);
        self.count_buffer.clear();
        count.max(1)
    }

    fn apply_count(action: Action, count: usize) -> Action {
        match action {
            Action::Navigate(NavigateAction::Up(n)) => Action::Navigate(NavigateAction::Up(n * count)),
            Action::Navigate(NavigateAction::Down(n)) => {
                Action::Navigate(NavigateAction::Down(n * count))
            }
            Action::Navigate(NavigateAction::Left(n)) => {
                Action::Navigate(NavigateAction::Left(n * count))
            }
            Action::Navigate(NavigateAction::Right(n)) => {
                Action::Navigate(NavigateAction::Right(n * count))
            }
            other => other,
        }
    }

    pub fn pending_count(&self) -> &str {
        &self.count_buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_browse_navigation() {
        let mut mapper = KeyMapper::new();
        assert_eq!(
            mapper.map_key(key(KeyCode::Char('j')), AppMode::Browse),
            Some(Action::Navigate(NavigateAction::Down(1)))
        );
        assert_eq!(
            mapper.map_key(key(KeyCode::Char('q')), AppMode::Browse),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_count_prefix() {
        let mut mapper = KeyMapper::new();
        assert_eq!(mapper.map_key(key(KeyCode::Char('1')), AppMode::Browse), None);
        assert_eq!(mapper.map_key(key(KeyCode::Char('2')), AppMode::Browse), None);
        assert_eq!(mapper.pending_count(), "12");
        assert_eq!(
            mapper.map_key(key(KeyCode::Char('k')), AppMode::Browse),
            Some(Action::Navigate(NavigateAction::Up(12)))
        );
        assert_eq!(mapper.pending_count(), "");
    }

    #[test]
    fn test_text_modes_pass_through_letters() {
        let mut mapper = KeyMapper::new();
        assert_eq!(mapper.map_key(key(KeyCode::Char('q')), AppMode::Search), None);
        assert_eq!(mapper.map_key(key(KeyCode::Char('5')), AppMode::Form), None);
        assert_eq!(
            mapper.map_key(key(KeyCode::Enter), AppMode::Search),
            Some(Action::Submit)
        );
    }

    #[test]
    fn test_uppercase_without_shift() {
        let mut mapper = KeyMapper::new();
        assert_eq!(
            mapper.map_key(key(KeyCode::Char('S')), AppMode::Browse),
            Some(Action::PressHeader)
        );
    }

    #[test]
    fn test_global_mappings_everywhere() {
        let mut mapper = KeyMapper::new();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(mapper.map_key(ctrl_c, AppMode::Form), Some(Action::ForceQuit));
    }
}
