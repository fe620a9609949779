use std::time::Instant;

/// A run of typing that has not yet gone idle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingSession {
    pub started_at: Instant,
    pub character_count: u64,
}

impl TypingSession {
    pub fn start(now: Instant, character_count: u64) -> Self {
        Self {
            started_at: now,
            character_count,
        }
    }

    pub fn add(&mut self, characters: u64) {
        self.character_count = self.character_count.saturating_add(characters);
    }

    /// Milliseconds from the session start to `now`, never negative.
    pub fn elapsed_ms(&self, now: Instant) -> i64 {
        now.saturating_duration_since(self.started_at).as_millis() as i64
    }
}

/// Outcome of closing a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finalized {
    pub wpm: i64,
    pub new_best: bool,
    pub elapsed_ms: i64,
    pub characters: u64,
}
