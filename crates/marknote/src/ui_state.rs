use crate::command_processor::CommandProcessor;
use crate::status_manager::{Severity, StatusManager, StatusMessage};

const COMMAND_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Typing goes into the buffer.
    Edit,
    /// Typing goes into the command line.
    Command,
    /// Waiting for y/n before clearing the buffer.
    ConfirmClear,
    /// Waiting for y/n/c before quitting with unsaved changes.
    ConfirmQuit,
    Help,
}

#[derive(Debug, Clone)]
pub struct UIState {
    pub mode: Mode,
    pub status: StatusManager,
    pub command_buffer: String,
    pub should_quit: bool,
    pub command_history: Vec<String>,
    pub history_index: Option<usize>,
}

impl UIState {
    pub fn new() -> Self {
        Self {
            mode: Mode::Edit,
            status: StatusManager::new(),
            command_buffer: String::new(),
            should_quit: false,
            command_history: Vec::new(),
            history_index: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn enter_edit_mode(&mut self) {
        self.mode = Mode::Edit;
    }

    pub fn enter_command_mode(&mut self) {
        self.mode = Mode::Command;
        self.command_buffer.clear();
        self.history_index = None;
    }

    pub fn ask_clear_confirmation(&mut self) {
        self.mode = Mode::ConfirmClear;
        self.status.show(StatusMessage::sticky(
            "Clear the whole document? (y/n)",
            Severity::Warning,
        ));
    }

    pub fn ask_save_before_quit(&mut self) {
        self.mode = Mode::ConfirmQuit;
        self.status.show(StatusMessage::sticky(
            "Save changes before exit? (y/n/c)",
            Severity::Warning,
        ));
    }

    pub fn toggle_help(&mut self) {
        self.mode = if self.mode == Mode::Help {
            Mode::Edit
        } else {
            Mode::Help
        };
    }

    pub fn is_help_shown(&self) -> bool {
        self.mode == Mode::Help
    }

    pub fn command_buffer(&self) -> &str {
        &self.command_buffer
    }

    pub fn push_to_command_buffer(&mut self, c: char) {
        self.command_buffer.push(c);
    }

    pub fn pop_from_command_buffer(&mut self) {
        self.command_buffer.pop();
    }

    pub fn take_command_buffer(&mut self) -> String {
        std::mem::take(&mut self.command_buffer)
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn update_status(&mut self) {
        self.status.update();
    }

    pub fn add_to_history(&mut self, command: String) {
        if !command.is_empty() && self.command_history.last() != Some(&command) {
            self.command_history.push(command);
            if self.command_history.len() > COMMAND_HISTORY_LIMIT {
                self.command_history.remove(0);
            }
        }
        self.history_index = None;
    }

    pub fn history_up(&mut self) {
        if self.command_history.is_empty() {
            return;
        }

        let new_index = match self.history_index {
            None => self.command_history.len() - 1,
            Some(0) => 0,
            Some(i) => i - 1,
        };

        self.history_index = Some(new_index);
        self.command_buffer = self.command_history[new_index].clone();
    }

    pub fn history_down(&mut self) {
        match self.history_index {
            None => {}
            Some(i) if i + 1 >= self.command_history.len() => {
                self.history_index = None;
                self.command_buffer.clear();
            }
            Some(i) => {
                self.history_index = Some(i + 1);
                self.command_buffer = self.command_history[i + 1].clone();
            }
        }
    }

    /// Complete the command line: a single match replaces the buffer, several
    /// are listed in the status line.
    pub fn complete_command(&mut self) {
        let suggestions = CommandProcessor::suggestions(&self.command_buffer);
        match suggestions.len() {
            0 => {}
            1 => self.command_buffer = suggestions[0].to_string(),
            _ => self
                .status
                .info(format!("Suggestions: {}", suggestions.join(", "))),
        }
    }
}

impl Default for UIState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = UIState::new();
        assert_eq!(state.mode(), Mode::Edit);
        assert_eq!(state.command_buffer(), "");
        assert!(!state.should_quit());
        assert!(!state.status.has_message());
    }

    #[test]
    fn test_help_toggle() {
        let mut state = UIState::new();
        state.toggle_help();
        assert!(state.is_help_shown());
        state.toggle_help();
        assert_eq!(state.mode(), Mode::Edit);
    }

    #[test]
    fn test_clear_confirmation_prompt_is_sticky() {
        let mut state = UIState::new();
        state.ask_clear_confirmation();
        assert_eq!(state.mode(), Mode::ConfirmClear);
        let message = state.status.current().unwrap();
        assert!(message.content.contains("(y/n)"));
        assert!(message.lifetime.is_none());
    }

    #[test]
    fn test_quit_prompt_is_sticky() {
        let mut state = UIState::new();
        state.ask_save_before_quit();
        assert_eq!(state.mode(), Mode::ConfirmQuit);
        let message = state.status.current().unwrap();
        assert!(message.content.contains("(y/n/c)"));
        assert!(message.lifetime.is_none());
        assert!(!state.should_quit());
    }

    #[test]
    fn test_command_buffer_operations() {
        let mut state = UIState::new();
        state.enter_command_mode();
        state.push_to_command_buffer('h');
        state.push_to_command_buffer('2');
        assert_eq!(state.command_buffer(), "h2");
        state.pop_from_command_buffer();
        assert_eq!(state.take_command_buffer(), "h");
        assert_eq!(state.command_buffer(), "");
    }

    #[test]
    fn test_history_navigation() {
        let mut state = UIState::new();
        state.add_to_history("bold".to_string());
        state.add_to_history("bold".to_string());
        state.add_to_history("table".to_string());
        assert_eq!(state.command_history.len(), 2);

        state.history_up();
        assert_eq!(state.command_buffer(), "table");
        state.history_up();
        assert_eq!(state.command_buffer(), "bold");
        state.history_up();
        assert_eq!(state.command_buffer(), "bold");

        state.history_down();
        assert_eq!(state.command_buffer(), "table");
        state.history_down();
        assert_eq!(state.command_buffer(), "");
    }

    #[test]
    fn test_complete_single_match() {
        let mut state = UIState::new();
        state.command_buffer = "foot".to_string();
        state.complete_command();
        assert_eq!(state.command_buffer(), "footnote");
    }

    #[test]
    fn test_complete_lists_several_matches() {
        let mut state = UIState::new();
        state.command_buffer = "h".to_string();
        state.complete_command();
        assert_eq!(state.command_buffer(), "h");
        let message = state.status.current().unwrap();
        assert!(message.content.contains("h1"));
        assert!(message.content.contains("highlight"));
    }
}
