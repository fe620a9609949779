use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;

use log::{debug, info, warn};

use crate::commands::{
    Command, CommandError, MenuAction, Prompter, CANCEL_CHOICE, MENU_ITEMS, RESET_CHOICE,
    RESET_CONFIRMATION, RESET_NOTICE,
};
use crate::config::Config;
use crate::display::{DisplaySink, StatusView};
use crate::disposable::{Registration, Subscriptions};
use crate::keystroke::{classify, ChangeDescriptor, KeystrokeLimits};
use crate::session::Finalized;
use crate::store::ScoreStore;
use crate::tracker::SessionTracker;

pub const DOCUMENT_CHANGE_SUBSCRIPTION: &str = "typespeed.onDidChangeTextDocument";

/// The typing-speed add-on, alive from activation until deactivation.
///
/// All state lives here: the tracker (session, idle deadline, best score),
/// the persistence handle, the display and the host registrations.
#[derive(Debug)]
pub struct Extension<S: ScoreStore, D: DisplaySink> {
    config: Config,
    limits: KeystrokeLimits,
    tracker: SessionTracker,
    store: S,
    display: D,
    subscriptions: Subscriptions,
    // Flipped off when the document-change registration is released.
    listening: Rc<Cell<bool>>,
    // Commands whose registration has not been released yet.
    commands: Rc<RefCell<Vec<Command>>>,
}

impl<S: ScoreStore, D: DisplaySink> Extension<S, D> {
    pub fn activate(config: Config, store: S, mut display: D) -> Self {
        let best = store.get(&config.highscore_key, 0);
        info!("typespeed active, best score {best} wpm");

        let listening = Rc::new(Cell::new(true));
        let commands = Rc::new(RefCell::new(Command::ALL.to_vec()));

        let mut subscriptions = Subscriptions::new();
        let flag = Rc::clone(&listening);
        subscriptions.push(Registration::with_cleanup(
            DOCUMENT_CHANGE_SUBSCRIPTION,
            move || flag.set(false),
        ));
        for command in Command::ALL {
            let registered = Rc::clone(&commands);
            subscriptions.push(Registration::with_cleanup(command.to_string(), move || {
                registered.borrow_mut().retain(|c| *c != command)
            }));
        }

        display.render(StatusView::unset(best));

        Self {
            limits: config.keystroke_limits(),
            tracker: SessionTracker::new(config.idle_window(), best),
            config,
            store,
            display,
            subscriptions,
            listening,
            commands,
        }
    }

    pub fn best(&self) -> i64 {
        self.tracker.best()
    }

    pub fn is_active(&self) -> bool {
        self.listening.get()
    }

    pub fn is_registered(&self, command: Command) -> bool {
        self.commands.borrow().contains(&command)
    }

    pub fn is_typing(&self) -> bool {
        self.tracker.is_active()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.tracker.deadline()
    }

    pub fn registrations(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn tracker(&self) -> &SessionTracker {
        &self.tracker
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Handle one edit notification. Returns whether it counted as typing.
    ///
    /// A session whose idle deadline passed before `now` is scored first, so
    /// the edit starts a fresh one even when no tick ran in between.
    pub fn handle_document_change(&mut self, changes: &[ChangeDescriptor], now: Instant) -> bool {
        if !self.is_active() {
            return false;
        }
        self.tick(now);
        let batch = classify(changes, &self.limits);
        self.tracker.on_keystrokes(batch, now)
    }

    /// The idle deadline fired at `now`.
    pub fn handle_idle_timeout(&mut self, now: Instant) -> Option<Finalized> {
        let done = self.tracker.on_idle_timeout(now)?;
        self.publish(done);
        Some(done)
    }

    /// Finalize the session if its idle deadline passed by `now`.
    pub fn tick(&mut self, now: Instant) -> Option<Finalized> {
        let done = self.tracker.poll(now)?;
        self.publish(done);
        Some(done)
    }

    pub fn reset_highscore(&mut self) {
        self.tracker.reset_best();
        self.persist(0);
        info!("best score reset");
        self.display.render(StatusView::unset(0));
        self.display.notify(RESET_NOTICE);
    }

    /// Options menu; returns whether the best score was reset.
    pub fn show_menu(&mut self, prompter: &mut dyn Prompter) -> bool {
        match prompter.pick(MENU_ITEMS) {
            Some(MenuAction::ResetHighscore) => {
                let answer = prompter.confirm(RESET_CONFIRMATION, &[RESET_CHOICE, CANCEL_CHOICE]);
                if answer == Some(RESET_CHOICE) {
                    self.reset_highscore();
                    true
                } else {
                    debug!("reset cancelled");
                    false
                }
            }
            None => false,
        }
    }

    pub fn execute(&mut self, command: Command, prompter: &mut dyn Prompter) {
        if !self.is_registered(command) {
            debug!("ignoring {command}, not registered");
            return;
        }
        debug!("running {command}");
        match command {
            Command::ShowMenu => {
                self.show_menu(prompter);
            }
            Command::ResetHighscore => self.reset_highscore(),
        }
    }

    pub fn execute_id(&mut self, id: &str, prompter: &mut dyn Prompter) -> Result<(), CommandError> {
        let command = Command::from_id(id)?;
        if !self.is_registered(command) {
            return Err(CommandError::Unregistered(id.to_string()));
        }
        self.execute(command, prompter);
        Ok(())
    }

    /// Cancel any pending idle deadline and release host registrations.
    pub fn deactivate(&mut self) {
        if !self.is_active() {
            return;
        }
        self.tracker.cancel();
        self.subscriptions.dispose_all();
        debug!("typespeed deactivated");
    }

    fn publish(&mut self, done: Finalized) {
        if done.new_best {
            info!("new best score {} wpm", done.wpm);
            self.persist(done.wpm);
        }
        self.display
            .render(StatusView::finished(done.wpm, self.tracker.best()));
    }

    fn persist(&mut self, value: i64) {
        if let Err(err) = self.store.set(&self.config.highscore_key, value) {
            warn!("could not save best score: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::ScriptedPrompter;
    use crate::config::HIGHSCORE_KEY;
    use crate::display::RecordingDisplay;
    use crate::store::MemoryStore;
    use std::time::Duration;

    type TestExtension = Extension<MemoryStore, RecordingDisplay>;

    fn activate_with(best: i64) -> TestExtension {
        Extension::activate(
            Config::default(),
            MemoryStore::with_value(HIGHSCORE_KEY, best),
            RecordingDisplay::default(),
        )
    }

    fn type_chars(ext: &mut TestExtension, count: usize, start: Instant, gap: Duration) -> Instant {
        let mut now = start;
        for i in 0..count {
            now = start + gap * i as u32;
            ext.handle_document_change(&[ChangeDescriptor::insert("a")], now);
        }
        now
    }

    #[test]
    fn activation_loads_best_and_renders_unset() {
        let ext = activate_with(42);
        assert_eq!(ext.best(), 42);
        assert_eq!(ext.display().views, vec![StatusView::unset(42)]);
        assert_eq!(ext.registrations(), 3);
        assert!(ext.is_active());
        assert!(!ext.is_typing());
    }

    #[test]
    fn activation_without_saved_score_starts_at_zero() {
        let ext = Extension::activate(
            Config::default(),
            MemoryStore::new(),
            RecordingDisplay::default(),
        );
        assert_eq!(ext.best(), 0);
    }

    #[test]
    fn paste_does_not_start_a_session() {
        let mut ext = activate_with(0);
        let counted = ext.handle_document_change(
            &[ChangeDescriptor::insert("fn main() { println!(\"hi\"); }")],
            Instant::now(),
        );
        assert!(!counted);
        assert!(!ext.is_typing());
        assert_eq!(ext.next_deadline(), None);
    }

    #[test]
    fn tick_before_deadline_does_nothing() {
        let t0 = Instant::now();
        let mut ext = activate_with(0);
        ext.handle_document_change(&[ChangeDescriptor::insert("a")], t0);
        assert_eq!(ext.tick(t0 + Duration::from_millis(2999)), None);
        assert!(ext.is_typing());
    }

    #[test]
    fn finished_session_updates_display_and_store() {
        let t0 = Instant::now();
        let mut ext = activate_with(10);

        // 100 keystrokes, 120 ms apart: 99 * 120 ms of typing + 3 s idle window
        let last = type_chars(&mut ext, 100, t0, Duration::from_millis(120));
        let done = ext.tick(last + Duration::from_secs(10)).unwrap();

        let elapsed_ms = (last - t0).as_millis() as i64 + 3000;
        assert_eq!(done.elapsed_ms, elapsed_ms);
        assert_eq!(done.characters, 100);
        assert_eq!(done.wpm, crate::wpm::wpm(100, elapsed_ms));
        assert!(done.new_best);

        assert_eq!(ext.best(), done.wpm);
        assert_eq!(ext.store().get(HIGHSCORE_KEY, 0), done.wpm);
        assert_eq!(
            ext.display().last(),
            Some(StatusView::finished(done.wpm, done.wpm))
        );
        assert!(!ext.is_typing());
    }

    #[test]
    fn slower_session_does_not_touch_store() {
        let t0 = Instant::now();
        let mut ext = activate_with(500);
        ext.handle_document_change(&[ChangeDescriptor::insert("ab")], t0);
        let done = ext.handle_idle_timeout(t0 + Duration::from_secs(3)).unwrap();

        assert_eq!(done.wpm, 8);
        assert!(!done.new_best);
        assert_eq!(ext.store().get(HIGHSCORE_KEY, 0), 500);
        assert_eq!(ext.display().last(), Some(StatusView::finished(8, 500)));
    }

    #[test]
    fn reset_zeroes_persists_and_notifies() {
        let mut ext = activate_with(77);
        ext.reset_highscore();
        assert_eq!(ext.best(), 0);
        assert_eq!(ext.store().get(HIGHSCORE_KEY, -1), 0);
        assert_eq!(ext.display().last(), Some(StatusView::unset(0)));
        assert_eq!(ext.display().messages, vec![RESET_NOTICE.to_string()]);

        ext.reset_highscore();
        assert_eq!(ext.best(), 0);
        assert_eq!(ext.store().get(HIGHSCORE_KEY, -1), 0);
    }

    #[test]
    fn menu_requires_confirmation() {
        let mut ext = activate_with(64);

        let mut dismissed = ScriptedPrompter::new().pick_then(None);
        assert!(!ext.show_menu(&mut dismissed));
        assert!(dismissed.questions.is_empty());

        let mut cancelled = ScriptedPrompter::new()
            .pick_then(Some(MenuAction::ResetHighscore))
            .answer_then(Some(CANCEL_CHOICE));
        assert!(!ext.show_menu(&mut cancelled));
        assert_eq!(cancelled.questions, vec![RESET_CONFIRMATION.to_string()]);
        assert_eq!(ext.best(), 64);

        let mut confirmed = ScriptedPrompter::new()
            .pick_then(Some(MenuAction::ResetHighscore))
            .answer_then(Some(RESET_CHOICE));
        assert!(ext.show_menu(&mut confirmed));
        assert_eq!(ext.best(), 0);
    }

    #[test]
    fn commands_dispatch_by_id() {
        let mut ext = activate_with(9);
        let mut prompter = ScriptedPrompter::new();

        ext.execute_id("typespeed.resetHighscore", &mut prompter)
            .unwrap();
        assert_eq!(ext.best(), 0);

        assert_eq!(
            ext.execute_id("typespeed.nope", &mut prompter),
            Err(CommandError::Unknown("typespeed.nope".into()))
        );

        // Dismissed menu leaves state alone.
        ext.execute(Command::ShowMenu, &mut prompter);
        assert_eq!(ext.display().messages.len(), 1);
    }

    #[test]
    fn deactivate_cancels_pending_session() {
        let t0 = Instant::now();
        let mut ext = activate_with(3);
        ext.handle_document_change(&[ChangeDescriptor::insert("abc")], t0);
        assert!(ext.next_deadline().is_some());

        ext.deactivate();
        assert!(!ext.is_active());
        assert_eq!(ext.registrations(), 0);
        assert_eq!(ext.next_deadline(), None);
        assert_eq!(ext.tick(t0 + Duration::from_secs(60)), None);
        assert!(!ext.handle_document_change(&[ChangeDescriptor::insert("d")], t0));

        // Only the activation render happened.
        assert_eq!(ext.display().views.len(), 1);
        ext.deactivate();
    }

    #[test]
    fn reset_while_typing_keeps_the_session() {
        let t0 = Instant::now();
        let mut ext = activate_with(90);
        ext.handle_document_change(&[ChangeDescriptor::insert("abcde")], t0);
        let deadline = ext.next_deadline();

        ext.reset_highscore();
        assert_eq!(ext.best(), 0);
        assert!(ext.is_typing());
        assert_eq!(ext.next_deadline(), deadline);
        assert_eq!(ext.tracker().session().unwrap().character_count, 5);

        // 5 chars over the 3 s window
        let done = ext.tick(t0 + Duration::from_secs(4)).unwrap();
        assert_eq!(done.wpm, 20);
        assert!(done.new_best);
        assert_eq!(ext.best(), 20);
        assert_eq!(ext.store().get(HIGHSCORE_KEY, -1), 20);
        assert_eq!(ext.display().last(), Some(StatusView::finished(20, 20)));
    }

    #[test]
    fn late_edit_scores_the_overdue_session_first() {
        let t0 = Instant::now();
        let mut ext = activate_with(0);
        ext.handle_document_change(&[ChangeDescriptor::insert("ab")], t0);

        let t1 = t0 + Duration::from_secs(10);
        assert!(ext.handle_document_change(&[ChangeDescriptor::insert("c")], t1));

        // The first session ended at its deadline, not at the late edit.
        assert_eq!(ext.display().last(), Some(StatusView::finished(8, 8)));
        assert_eq!(ext.store().get(HIGHSCORE_KEY, 0), 8);

        let session = *ext.tracker().session().unwrap();
        assert_eq!(session.started_at, t1);
        assert_eq!(session.character_count, 1);
        assert_eq!(ext.next_deadline(), Some(t1 + Duration::from_secs(3)));
    }

    #[test]
    fn released_registrations_stop_dispatch() {
        let mut ext = activate_with(41);
        assert!(Command::ALL.iter().all(|c| ext.is_registered(*c)));

        ext.deactivate();
        assert!(Command::ALL.iter().all(|c| !ext.is_registered(*c)));

        let mut prompter = ScriptedPrompter::new()
            .pick_then(Some(MenuAction::ResetHighscore))
            .answer_then(Some(RESET_CHOICE));
        ext.execute(Command::ResetHighscore, &mut prompter);
        ext.execute(Command::ShowMenu, &mut prompter);
        assert_eq!(
            ext.execute_id("typespeed.resetHighscore", &mut prompter),
            Err(CommandError::Unregistered("typespeed.resetHighscore".into()))
        );

        assert_eq!(ext.best(), 41);
        assert_eq!(ext.store().get(HIGHSCORE_KEY, 0), 41);
        assert!(prompter.questions.is_empty());
        assert!(ext.display().messages.is_empty());
    }
}
