/// What the status indicator should show.
///
/// `current` is `None` until a session finishes, and again after a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusView {
    pub current: Option<i64>,
    pub best: i64,
}

impl StatusView {
    pub fn unset(best: i64) -> Self {
        Self {
            current: None,
            best,
        }
    }

    pub fn finished(wpm: i64, best: i64) -> Self {
        Self {
            current: Some(wpm),
            best,
        }
    }
}

/// Host-side presentation of the status indicator
pub trait DisplaySink {
    fn render(&mut self, view: StatusView);

    /// Short informational message for the user.
    fn notify(&mut self, _message: &str) {}
}

/// Display sink that keeps everything it was asked to show
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    pub views: Vec<StatusView>,
    pub messages: Vec<String>,
}

impl RecordingDisplay {
    pub fn last(&self) -> Option<StatusView> {
        self.views.last().copied()
    }
}

impl DisplaySink for RecordingDisplay {
    fn render(&mut self, view: StatusView) {
        self.views.push(view);
    }

    fn notify(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}
