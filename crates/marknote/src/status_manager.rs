use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    fn lifetime(self) -> Duration {
        match self {
            Severity::Info => Duration::from_secs(3),
            Severity::Success => Duration::from_secs(2),
            Severity::Warning => Duration::from_secs(5),
            Severity::Error => Duration::from_secs(7),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub content: String,
    pub severity: Severity,
    pub created_at: Instant,
    /// `None` keeps the message until it is replaced or cleared.
    pub lifetime: Option<Duration>,
}

impl StatusMessage {
    pub fn new(content: impl Into<String>, severity: Severity) -> Self {
        Self {
            content: content.into(),
            severity,
            created_at: Instant::now(),
            lifetime: Some(severity.lifetime()),
        }
    }

    pub fn with_lifetime(content: impl Into<String>, severity: Severity, lifetime: Duration) -> Self {
        Self {
            lifetime: Some(lifetime),
            ..Self::new(content, severity)
        }
    }

    pub fn sticky(content: impl Into<String>, severity: Severity) -> Self {
        Self {
            lifetime: None,
            ..Self::new(content, severity)
        }
    }

    pub fn is_expired(&self) -> bool {
        self.lifetime
            .is_some_and(|lifetime| self.created_at.elapsed() > lifetime)
    }
}

/// The one-line feedback area under the editor.
#[derive(Debug, Clone, Default)]
pub struct StatusManager {
    current: Option<StatusMessage>,
}

impl StatusManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: StatusMessage) {
        self.current = Some(message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.show(StatusMessage::new(message, Severity::Info));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.show(StatusMessage::new(message, Severity::Success));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.show(StatusMessage::new(message, Severity::Warning));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(StatusMessage::new(message, Severity::Error));
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Drop the current message once it has outlived its lifetime.
    pub fn update(&mut self) {
        if self.current.as_ref().is_some_and(StatusMessage::is_expired) {
            self.current = None;
        }
    }

    pub fn current(&self) -> Option<&StatusMessage> {
        self.current.as_ref()
    }

    pub fn has_message(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_starts_empty() {
        let manager = StatusManager::new();
        assert!(!manager.has_message());
    }

    #[test]
    fn test_severities() {
        let mut manager = StatusManager::new();

        manager.info("Info");
        assert_eq!(manager.current().unwrap().severity, Severity::Info);
        manager.success("Saved");
        assert_eq!(manager.current().unwrap().severity, Severity::Success);
        manager.warning("Careful");
        assert_eq!(manager.current().unwrap().severity, Severity::Warning);
        manager.error("Broken");
        let message = manager.current().unwrap();
        assert_eq!(message.severity, Severity::Error);
        assert_eq!(message.content, "Broken");
        assert_eq!(message.lifetime, Some(Duration::from_secs(7)));
    }

    #[test]
    fn test_fresh_message_is_not_expired() {
        let mut manager = StatusManager::new();
        manager.info("Hello");
        manager.update();
        assert!(manager.has_message());
    }

    #[test]
    fn test_expired_message_is_dropped() {
        let mut manager = StatusManager::new();
        manager.show(StatusMessage::with_lifetime(
            "Short",
            Severity::Info,
            Duration::from_millis(1),
        ));
        thread::sleep(Duration::from_millis(10));
        manager.update();
        assert!(!manager.has_message());
    }

    #[test]
    fn test_sticky_message_never_expires() {
        let message = StatusMessage::sticky("Clear the whole document? (y/n)", Severity::Warning);
        assert!(message.lifetime.is_none());
        assert!(!message.is_expired());
    }

    #[test]
    fn test_clear() {
        let mut manager = StatusManager::new();
        manager.warning("x");
        manager.clear();
        assert!(!manager.has_message());
    }
}
