use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use std::path::Path;

use editcore::{Buffer, Change, Command, EditController, Origin};
use mdcore::PreviewLine;

use crate::command_processor::{CommandProcessor, Invocation};
use crate::config::Config;
use crate::keymap::{self, Action};
use crate::storage::{Storage, Theme};
use crate::text_width;
use crate::ui_state::{Mode, UIState};

pub struct App {
    pub editor: EditController,
    pub config: Config,
    pub ui_state: UIState,
    pub storage: Storage,
    pub theme: Theme,
    pub show_preview: bool,
    /// Buffer changes not yet written to storage (only with autosave off).
    pub unsaved: bool,
    pub scroll_row: usize,
    pub scroll_col: usize,
    preview: Vec<PreviewLine>,
    preview_dirty: bool,
    escape_pending: bool,
}

impl App {
    pub async fn new() -> Result<Self> {
        let mut config = Config::load().await?;
        config.validate()?;
        let storage = Storage::new()?;
        Self::with_parts(config, storage).await
    }

    /// Build the app around an already loaded config and a store location.
    pub async fn with_parts(config: Config, mut storage: Storage) -> Result<Self> {
        let restored = storage.load(&config.welcome_text).await?;
        log::info!(
            "Starting with {} chars ({}), {:?} theme",
            restored.buffer.chars().count(),
            if restored.from_store { "restored" } else { "welcome" },
            restored.theme
        );

        let editor =
            EditController::with_history_limit(Buffer::from(restored.buffer), config.history_limit);

        Ok(Self {
            editor,
            show_preview: config.preview,
            config,
            ui_state: UIState::new(),
            storage,
            theme: restored.theme,
            unsaved: false,
            scroll_row: 0,
            scroll_col: 0,
            preview: Vec::new(),
            preview_dirty: true,
            escape_pending: false,
        })
    }

    pub fn should_quit(&self) -> bool {
        self.ui_state.should_quit()
    }

    pub fn update_status(&mut self) {
        self.ui_state.update_status();
    }

    /// Called once the current buffer has been drawn.
    pub fn after_render(&mut self) {
        self.editor.commit_selection();
    }

    /// Preview of the current buffer, rebuilt after changes.
    pub fn preview_lines(&mut self) -> &[PreviewLine] {
        if self.preview_dirty {
            self.preview = mdcore::preview(&self.editor.text());
            self.preview_dirty = false;
        }
        &self.preview
    }

    /// Scroll the editor pane so the caret stays inside `rows` x `cols`.
    pub fn ensure_caret_visible(&mut self, rows: usize, cols: usize) {
        let (row, col) = text_width::caret_cell(self.editor.buffer(), self.editor.head());
        if row < self.scroll_row {
            self.scroll_row = row;
        } else if rows > 0 && row >= self.scroll_row + rows {
            self.scroll_row = row + 1 - rows;
        }
        if col < self.scroll_col {
            self.scroll_col = col;
        } else if cols > 0 && col >= self.scroll_col + cols {
            self.scroll_col = col + 1 - cols;
        }
    }

    pub async fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        match self.ui_state.mode() {
            Mode::Edit => self.handle_edit_mode(key).await,
            Mode::Command => self.handle_command_mode(key).await,
            Mode::ConfirmClear => self.handle_confirm_clear(key).await,
            Mode::ConfirmQuit => self.handle_confirm_quit(key).await,
            Mode::Help => {
                self.ui_state.toggle_help();
                Ok(())
            }
        }
    }

    async fn handle_edit_mode(&mut self, key: KeyEvent) -> Result<()> {
        let escaped = std::mem::take(&mut self.escape_pending);
        match key.code {
            KeyCode::Esc => {
                self.escape_pending = true;
                return Ok(());
            }
            KeyCode::Char(':') if escaped => {
                self.ui_state.enter_command_mode();
                return Ok(());
            }
            _ => {}
        }

        match keymap::action_for(key) {
            Some(action) => self.perform(action).await,
            None => Ok(()),
        }
    }

    async fn handle_command_mode(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => self.ui_state.enter_edit_mode(),
            KeyCode::Enter => {
                let line = self.ui_state.take_command_buffer();
                self.ui_state.add_to_history(line.clone());
                self.ui_state.enter_edit_mode();
                self.execute_command_line(&line).await?;
            }
            KeyCode::Backspace => {
                if self.ui_state.command_buffer().is_empty() {
                    self.ui_state.enter_edit_mode();
                } else {
                    self.ui_state.pop_from_command_buffer();
                }
            }
            KeyCode::Tab => self.ui_state.complete_command(),
            KeyCode::Up => self.ui_state.history_up(),
            KeyCode::Down => self.ui_state.history_down(),
            KeyCode::Char(c) => self.ui_state.push_to_command_buffer(c),
            _ => {}
        }
        Ok(())
    }

    async fn handle_confirm_clear(&mut self, key: KeyEvent) -> Result<()> {
        self.ui_state.enter_edit_mode();
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                let change = self.editor.clear();
                self.changed(change).await?;
                self.ui_state.status.info("Document cleared");
            }
            _ => self.ui_state.status.info("Clear cancelled"),
        }
        Ok(())
    }

    async fn handle_confirm_quit(&mut self, key: KeyEvent) -> Result<()> {
        self.ui_state.enter_edit_mode();
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.save().await?;
                self.ui_state.quit();
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                log::warn!("Quitting without saving");
                self.ui_state.quit();
            }
            _ => {
                self.ui_state.status.info("Quit cancelled");
            }
        }
        Ok(())
    }

    /// Quit, asking first when there are changes not yet in storage.
    pub fn request_quit(&mut self) {
        if self.unsaved {
            log::info!("Quit requested with unsaved changes");
            self.ui_state.ask_save_before_quit();
        } else {
            log::info!("Quit requested");
            self.ui_state.quit();
        }
    }

    pub async fn perform(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Command(command) => return self.run_command(command).await,
            Action::Type(c) => {
                let mut buf = [0u8; 4];
                let change = self.editor.type_text(c.encode_utf8(&mut buf));
                self.changed(change).await?;
            }
            Action::Newline => {
                let change = self.editor.type_text("\n");
                self.changed(change).await?;
            }
            Action::Tab => {
                let indent = self.config.indent_unit();
                let change = self.editor.type_text(&indent);
                self.changed(change).await?;
            }
            Action::Backspace => {
                let change = self.editor.delete_backward();
                self.changed(change).await?;
            }
            Action::Delete => {
                let change = self.editor.delete_forward();
                self.changed(change).await?;
            }
            Action::Move { motion, extend } => self.editor.move_caret(motion, extend),
            Action::ToggleTheme => self.toggle_theme().await?,
            Action::TogglePreview => self.show_preview = !self.show_preview,
            Action::OpenCommandLine => self.ui_state.enter_command_mode(),
            Action::Help => self.ui_state.toggle_help(),
            Action::Quit => self.request_quit(),
        }
        Ok(())
    }

    pub async fn run_command(&mut self, command: Command) -> Result<()> {
        log::debug!("Running command {}", command);
        if command.needs_confirmation() {
            self.ui_state.ask_clear_confirmation();
            return Ok(());
        }

        match command {
            // Nothing to undo/redo is not worth a message.
            Command::Undo => {
                let change = self.editor.undo();
                self.changed(change).await
            }
            Command::Redo => {
                let change = self.editor.redo();
                self.changed(change).await
            }
            Command::Save => self.save().await,
            markup => {
                let Some(transform) = markup.transform() else {
                    return Ok(());
                };
                let change = self.editor.apply(&transform);
                self.changed(change).await
            }
        }
    }

    async fn execute_command_line(&mut self, line: &str) -> Result<()> {
        let invocation = match CommandProcessor::parse(line) {
            Ok(Some(invocation)) => invocation,
            Ok(None) => return Ok(()),
            Err(e) => {
                log::warn!("Command line rejected: {}", e);
                self.ui_state.status.error(e.to_string());
                return Ok(());
            }
        };

        match invocation {
            Invocation::Edit(command) => self.run_command(command).await,
            Invocation::ToggleTheme => self.toggle_theme().await,
            Invocation::Export(path) => self.export(&path).await,
            Invocation::Import(path) => self.import(&path).await,
            Invocation::Help => {
                self.ui_state.toggle_help();
                Ok(())
            }
            Invocation::Quit => {
                self.request_quit();
                Ok(())
            }
        }
    }

    /// React to a buffer change: the preview is rebuilt on the next draw and
    /// the buffer persisted when autosave is on.
    async fn changed(&mut self, change: Option<Change>) -> Result<()> {
        let Some(change) = change else {
            return Ok(());
        };

        log::trace!(
            "Buffer changed ({:?}, recorded: {})",
            change.origin,
            change.recorded
        );
        if change.origin == Origin::History {
            log::debug!("History moved to {}", self.editor.history().pointer());
        }

        self.preview_dirty = true;
        if self.config.autosave {
            self.storage.save_buffer(&self.editor.text()).await?;
        } else {
            self.unsaved = true;
        }
        Ok(())
    }

    async fn save(&mut self) -> Result<()> {
        if self.config.autosave {
            self.ui_state.status.success("Saved (autosave is on)");
            return Ok(());
        }

        self.storage.save_buffer(&self.editor.text()).await?;
        self.unsaved = false;
        self.ui_state.status.success("Saved");
        Ok(())
    }

    async fn toggle_theme(&mut self) -> Result<()> {
        self.theme = self.theme.toggled();
        log::info!("Switched to {:?} theme", self.theme);
        self.storage.save_theme(self.theme).await
    }

    /// Replace the document with a file's contents. Starts a fresh history.
    async fn import(&mut self, path: &Path) -> Result<()> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to import {}", path.display()))?;
        self.editor.load(Buffer::from(text));
        self.scroll_row = 0;
        self.scroll_col = 0;
        self.preview_dirty = true;
        self.storage.save_buffer(&self.editor.text()).await?;
        self.unsaved = false;

        log::info!("Imported {}", path.display());
        self.ui_state
            .status
            .success(format!("Imported {}", path.display()));
        Ok(())
    }

    async fn export(&mut self, path: &Path) -> Result<()> {
        let html = mdcore::to_safe_html(&self.editor.text());
        tokio::fs::write(path, html)
            .await
            .with_context(|| format!("Failed to export to {}", path.display()))?;
        log::info!("Exported HTML to {}", path.display());
        self.ui_state
            .status
            .success(format!("Exported to {}", path.display()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use editcore::Selection;
    use mdcore::LineKind;
    use tempfile::TempDir;

    async fn test_app(dir: &TempDir) -> App {
        let config = Config {
            welcome_text: String::new(),
            ..Config::default()
        };
        App::with_parts(config, Storage::at(dir.path().join("store.json")))
            .await
            .unwrap()
    }

    async fn press(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        app.handle_key_event(KeyEvent::new(code, modifiers))
            .await
            .unwrap();
        app.after_render();
    }

    async fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c), KeyModifiers::NONE).await;
        }
    }

    async fn stored(dir: &TempDir) -> String {
        Storage::at(dir.path().join("store.json"))
            .load("<none>")
            .await
            .unwrap()
            .buffer
    }

    #[tokio::test]
    async fn test_starts_with_welcome_text() {
        let dir = TempDir::new().unwrap();
        let app = App::with_parts(Config::default(), Storage::at(dir.path().join("store.json")))
            .await
            .unwrap();
        assert_eq!(app.editor.text(), crate::config::DEFAULT_WELCOME);
        assert_eq!(app.theme, Theme::Light);
    }

    #[tokio::test]
    async fn test_typing_is_persisted() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir).await;
        type_str(&mut app, "hi").await;
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE).await;

        assert_eq!(app.editor.text(), "hi\n");
        assert_eq!(stored(&dir).await, "hi\n");
    }

    #[tokio::test]
    async fn test_bold_shortcut_wraps_selection() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir).await;
        type_str(&mut app, "title").await;
        app.editor.select(Selection::new(0, 5));

        press(&mut app, KeyCode::Char('b'), KeyModifiers::CONTROL).await;
        assert_eq!(app.editor.text(), "**title**");
        assert_eq!(app.editor.selection(), Selection::new(2, 7));
        assert_eq!(stored(&dir).await, "**title**");
    }

    #[tokio::test]
    async fn test_undo_redo_and_silent_boundaries() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir).await;

        press(&mut app, KeyCode::Char('z'), KeyModifiers::CONTROL).await;
        assert!(!app.ui_state.status.has_message());

        type_str(&mut app, "ab").await;
        press(&mut app, KeyCode::Char('z'), KeyModifiers::CONTROL).await;
        assert_eq!(app.editor.text(), "a");
        assert_eq!(stored(&dir).await, "a");

        press(&mut app, KeyCode::Char('y'), KeyModifiers::CONTROL).await;
        assert_eq!(app.editor.text(), "ab");
        press(&mut app, KeyCode::Char('y'), KeyModifiers::CONTROL).await;
        assert_eq!(app.editor.text(), "ab");
        assert!(!app.ui_state.status.has_message());
    }

    #[tokio::test]
    async fn test_clear_needs_confirmation() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir).await;
        type_str(&mut app, "keep").await;

        press(&mut app, KeyCode::Char('l'), KeyModifiers::CONTROL).await;
        assert_eq!(app.ui_state.mode(), Mode::ConfirmClear);
        press(&mut app, KeyCode::Char('n'), KeyModifiers::NONE).await;
        assert_eq!(app.ui_state.mode(), Mode::Edit);
        assert_eq!(app.editor.text(), "keep");

        press(&mut app, KeyCode::Char('l'), KeyModifiers::CONTROL).await;
        press(&mut app, KeyCode::Char('y'), KeyModifiers::NONE).await;
        assert_eq!(app.editor.text(), "");
        assert_eq!(stored(&dir).await, "");

        press(&mut app, KeyCode::Char('z'), KeyModifiers::CONTROL).await;
        assert_eq!(app.editor.text(), "keep");
    }

    #[tokio::test]
    async fn test_command_line_runs_commands() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir).await;

        press(&mut app, KeyCode::Char('p'), KeyModifiers::CONTROL).await;
        assert_eq!(app.ui_state.mode(), Mode::Command);
        type_str(&mut app, "h2").await;
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE).await;

        assert_eq!(app.ui_state.mode(), Mode::Edit);
        assert_eq!(app.editor.text(), "## Heading");
        assert_eq!(app.preview_lines()[0].kind, LineKind::Heading(2));
    }

    #[tokio::test]
    async fn test_escape_colon_opens_command_line() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir).await;

        type_str(&mut app, ":").await;
        assert_eq!(app.editor.text(), ":");

        press(&mut app, KeyCode::Esc, KeyModifiers::NONE).await;
        type_str(&mut app, ":").await;
        assert_eq!(app.ui_state.mode(), Mode::Command);
        assert_eq!(app.editor.text(), ":");
    }

    #[tokio::test]
    async fn test_unknown_command_is_reported() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir).await;

        press(&mut app, KeyCode::Char('p'), KeyModifiers::CONTROL).await;
        type_str(&mut app, "nope").await;
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE).await;

        let message = app.ui_state.status.current().unwrap();
        assert!(message.content.contains("nope"));
        assert_eq!(app.editor.text(), "");
    }

    #[tokio::test]
    async fn test_theme_toggle_is_persisted() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir).await;
        press(&mut app, KeyCode::Char('t'), KeyModifiers::CONTROL).await;
        assert_eq!(app.theme, Theme::Dark);

        let restored = Storage::at(dir.path().join("store.json"))
            .load("")
            .await
            .unwrap();
        assert_eq!(restored.theme, Theme::Dark);
    }

    #[tokio::test]
    async fn test_save_without_autosave() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            welcome_text: String::new(),
            autosave: false,
            ..Config::default()
        };
        let mut app = App::with_parts(config, Storage::at(dir.path().join("store.json")))
            .await
            .unwrap();

        type_str(&mut app, "draft").await;
        assert!(app.unsaved);
        assert_eq!(stored(&dir).await, "<none>");

        press(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL).await;
        assert!(!app.unsaved);
        assert_eq!(stored(&dir).await, "draft");
        assert_eq!(app.ui_state.status.current().unwrap().content, "Saved");
    }

    async fn unsaved_app(dir: &TempDir) -> App {
        let config = Config {
            welcome_text: String::new(),
            autosave: false,
            ..Config::default()
        };
        let mut app = App::with_parts(config, Storage::at(dir.path().join("store.json")))
            .await
            .unwrap();
        type_str(&mut app, "draft").await;
        app
    }

    #[tokio::test]
    async fn test_quit_with_unsaved_changes_asks_first() {
        let dir = TempDir::new().unwrap();
        let mut app = unsaved_app(&dir).await;

        press(&mut app, KeyCode::Char('q'), KeyModifiers::CONTROL).await;
        assert!(!app.should_quit());
        assert_eq!(app.ui_state.mode(), Mode::ConfirmQuit);

        press(&mut app, KeyCode::Char('y'), KeyModifiers::NONE).await;
        assert!(app.should_quit());
        assert!(!app.unsaved);
        assert_eq!(stored(&dir).await, "draft");
    }

    #[tokio::test]
    async fn test_quit_prompt_can_cancel_or_discard() {
        let dir = TempDir::new().unwrap();
        let mut app = unsaved_app(&dir).await;

        app.execute_command_line("q").await.unwrap();
        assert_eq!(app.ui_state.mode(), Mode::ConfirmQuit);
        press(&mut app, KeyCode::Char('c'), KeyModifiers::NONE).await;
        assert!(!app.should_quit());
        assert_eq!(app.ui_state.mode(), Mode::Edit);
        assert_eq!(app.editor.text(), "draft");

        app.request_quit();
        press(&mut app, KeyCode::Char('n'), KeyModifiers::NONE).await;
        assert!(app.should_quit());
        assert_eq!(stored(&dir).await, "<none>");
    }

    #[tokio::test]
    async fn test_quit_without_changes_is_immediate() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir).await;
        type_str(&mut app, "kept").await;

        press(&mut app, KeyCode::Char('q'), KeyModifiers::CONTROL).await;
        assert!(app.should_quit());
        assert_eq!(stored(&dir).await, "kept");
    }

    #[tokio::test]
    async fn test_save_with_autosave_only_acknowledges() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir).await;
        press(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL).await;

        let message = app.ui_state.status.current().unwrap();
        assert!(message.content.starts_with("Saved"));
        assert!(!dir.path().join("store.json").exists());
    }

    #[tokio::test]
    async fn test_export_writes_sanitized_html() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir).await;
        type_str(&mut app, "# Hi <script>").await;

        let target = dir.path().join("out.html");
        app.execute_command_line(&format!("export {}", target.display()))
            .await
            .unwrap();

        let html = std::fs::read_to_string(&target).unwrap();
        assert!(html.contains("<h1>"));
        assert!(!html.contains("<script>"));
    }

    #[tokio::test]
    async fn test_import_replaces_document_and_history() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir).await;
        type_str(&mut app, "old").await;

        let source = dir.path().join("notes.md");
        std::fs::write(&source, "# Imported").unwrap();
        app.execute_command_line(&format!("import {}", source.display()))
            .await
            .unwrap();

        assert_eq!(app.editor.text(), "# Imported");
        assert!(!app.editor.history().can_undo());
        assert_eq!(stored(&dir).await, "# Imported");
    }

    #[tokio::test]
    async fn test_import_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir).await;
        let err = app
            .execute_command_line(&format!("import {}", dir.path().join("nope.md").display()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to import"));
    }

    #[tokio::test]
    async fn test_caret_scrolling() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir).await;
        for _ in 0..10 {
            press(&mut app, KeyCode::Enter, KeyModifiers::NONE).await;
        }
        app.ensure_caret_visible(4, 80);
        assert_eq!(app.scroll_row, 7);

        press(&mut app, KeyCode::Home, KeyModifiers::CONTROL).await;
        app.ensure_caret_visible(4, 80);
        assert_eq!(app.scroll_row, 0);
    }
}
