//! User-facing outcome notifications.
//!
//! The orchestrator reports every operation outcome through a [`Notifier`]
//! so the embedding application can surface toasts, status bars, or
//! whatever fits. The default sink is the tracing log.

use std::sync::Mutex;

/// Sink for user-facing success and error messages.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Routes notifications into the tracing log.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(target: "codestake::notify", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::warn!(target: "codestake::notify", "{message}");
    }
}

/// Records every notification for tests to assert on.
#[derive(Default)]
pub struct RecordingNotifier {
    successes: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_notifier_keeps_messages_in_order() {
        let notifier = RecordingNotifier::new();
        notifier.success("first");
        notifier.error("oops");
        notifier.success("second");

        assert_eq!(notifier.successes(), vec!["first", "second"]);
        assert_eq!(notifier.errors(), vec!["oops"]);
    }
}
