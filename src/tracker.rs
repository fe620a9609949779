use std::time::{Duration, Instant};

use log::debug;

use crate::idle_timer::IdleTimer;
use crate::keystroke::Classification;
use crate::session::{Finalized, TypingSession};
use crate::wpm::wpm;

/// Owns the active typing session, its idle deadline and the best score.
///
/// A session exists exactly when the idle timer is pending.
#[derive(Debug, Clone)]
pub struct SessionTracker {
    session: Option<TypingSession>,
    timer: IdleTimer,
    best: i64,
}

impl SessionTracker {
    pub fn new(idle_window: Duration, best: i64) -> Self {
        Self {
            session: None,
            timer: IdleTimer::new(idle_window),
            best,
        }
    }

    pub fn best(&self) -> i64 {
        self.best
    }

    pub fn session(&self) -> Option<&TypingSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Feed a classified batch. Returns whether the batch counted as typing.
    pub fn on_keystrokes(&mut self, batch: Classification, now: Instant) -> bool {
        if !batch.valid || batch.added_characters == 0 {
            return false;
        }

        match self.session.as_mut() {
            Some(session) => session.add(batch.added_characters),
            None => {
                debug!("typing session started");
                self.session = Some(TypingSession::start(now, batch.added_characters));
            }
        }
        self.timer.rearm(now);
        true
    }

    /// Close the session as if the idle deadline fired at `now`.
    pub fn on_idle_timeout(&mut self, now: Instant) -> Option<Finalized> {
        self.timer.cancel();
        let session = self.session.take()?;

        let elapsed_ms = session.elapsed_ms(now);
        let speed = wpm(session.character_count, elapsed_ms);
        let new_best = speed > self.best;
        if new_best {
            self.best = speed;
        }

        debug!(
            "typing session finished: {} chars in {} ms, {} wpm",
            session.character_count, elapsed_ms, speed
        );

        Some(Finalized {
            wpm: speed,
            new_best,
            elapsed_ms,
            characters: session.character_count,
        })
    }

    /// Finalize once the pending deadline has passed.
    ///
    /// The session is scored as of the deadline itself, so a late wake-up
    /// does not count as typing time.
    pub fn poll(&mut self, now: Instant) -> Option<Finalized> {
        let deadline = self.timer.deadline()?;
        if self.timer.is_due(now) {
            self.on_idle_timeout(deadline)
        } else {
            None
        }
    }

    pub fn reset_best(&mut self) {
        self.best = 0;
    }

    /// Drop the session and pending deadline without scoring them.
    pub fn cancel(&mut self) {
        self.timer.cancel();
        self.session = None;
    }
}
