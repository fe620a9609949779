use std::marker::PhantomData;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};
use log::debug;

use crate::commands::{Command, Prompter};
use crate::display::DisplaySink;
use crate::extension::Extension;
use crate::keystroke::ChangeDescriptor;
use crate::store::ScoreStore;

/// Terminal input forwarded to the scratchpad host
#[derive(Clone, Debug)]
pub enum TermEvent {
    Key(KeyEvent),
    Paste(String),
    Resize,
}

/// Input for an embedding host that already produces change descriptors
#[derive(Clone, Debug)]
pub enum HostEvent {
    Edit(Vec<ChangeDescriptor>),
    Command(Command),
    Shutdown,
}

/// Source of events for the single dispatch thread
pub trait EventSource<E> {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<E, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<TermEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) => Some(TermEvent::Key(key)),
                Ok(CtEvent::Paste(text)) => Some(TermEvent::Paste(text)),
                Ok(CtEvent::Resize(_, _)) => Some(TermEvent::Resize),
                Ok(_) => None,
                Err(_) => break,
            };
            if let Some(ev) = forwarded {
                if tx.send(ev).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource<TermEvent> for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TermEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-backed event source for tests and embedding hosts
pub struct ChannelEventSource<E> {
    rx: Receiver<E>,
}

impl<E> ChannelEventSource<E> {
    pub fn new(rx: Receiver<E>) -> Self {
        Self { rx }
    }
}

impl<E> EventSource<E> for ChannelEventSource<E> {
    fn recv_timeout(&self, timeout: Duration) -> Result<E, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// What woke the dispatch loop
#[derive(Debug)]
pub enum Step<E> {
    Event(E),
    /// The idle deadline passed before any event arrived.
    DeadlineElapsed,
    /// The ticker interval passed with no deadline due.
    Wake,
    Disconnected,
}

/// Waits for the next event, the idle deadline or the ticker, whichever comes first
pub struct Runner<E, S: EventSource<E>, T: Ticker> {
    event_source: S,
    ticker: T,
    _event: PhantomData<fn() -> E>,
}

impl<E, S: EventSource<E>, T: Ticker> Runner<E, S, T> {
    pub fn new(event_source: S, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
            _event: PhantomData,
        }
    }

    pub fn step(&self, deadline: Option<Instant>) -> Step<E> {
        let interval = self.ticker.interval();
        let (timeout, waiting_on_deadline) = match deadline {
            Some(deadline) => {
                let left = deadline.saturating_duration_since(Instant::now());
                if left <= interval {
                    (left, true)
                } else {
                    (interval, false)
                }
            }
            None => (interval, false),
        };

        match self.event_source.recv_timeout(timeout) {
            Ok(ev) => Step::Event(ev),
            Err(RecvTimeoutError::Timeout) if waiting_on_deadline => Step::DeadlineElapsed,
            Err(RecvTimeoutError::Timeout) => Step::Wake,
            Err(RecvTimeoutError::Disconnected) => Step::Disconnected,
        }
    }
}

impl<S: EventSource<HostEvent>, T: Ticker> Runner<HostEvent, S, T> {
    /// Dispatch host events into `ext` until shutdown, then deactivate it.
    pub fn drive<St, D>(&self, ext: &mut Extension<St, D>, prompter: &mut dyn Prompter)
    where
        St: ScoreStore,
        D: DisplaySink,
    {
        loop {
            match self.step(ext.next_deadline()) {
                Step::Event(HostEvent::Edit(changes)) => {
                    ext.handle_document_change(&changes, Instant::now());
                }
                Step::Event(HostEvent::Command(command)) => ext.execute(command, prompter),
                Step::Event(HostEvent::Shutdown) | Step::Disconnected => break,
                Step::DeadlineElapsed | Step::Wake => {}
            }
            if let Some(done) = ext.tick(Instant::now()) {
                debug!("session scored at {} wpm", done.wpm);
            }
        }
        ext.deactivate();
    }
}
