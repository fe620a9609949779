pub mod ui;

use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    slice,
    time::{Duration, Instant},
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableBracketedPaste, EnableBracketedPaste, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::info;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use typespeed::{
    app_dirs::AppDirs,
    commands::Command,
    config::{Config, ConfigStore, FileConfigStore},
    display::{DisplaySink, StatusView},
    editor::Scratchpad,
    runtime::{CrosstermEventSource, FixedTicker, Runner, Step, TermEvent},
    store::{JsonFileStore, ScoreStore},
    Extension,
};

use crate::ui::{overlay::TuiPrompter, StatusBar};

const WAKE_INTERVAL_MS: u64 = 250;

/// measure your typing speed while you write, and keep your best score
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal scratchpad that measures words per minute while you type. A typing session ends after a few seconds without keystrokes; pastes and bulk deletions are ignored. The best score is kept across runs."
)]
pub struct Cli {
    /// milliseconds without typing before a session is scored
    #[clap(long)]
    idle_ms: Option<u64>,

    /// file holding the persisted best score
    #[clap(long)]
    state_file: Option<PathBuf>,

    /// configuration file to load
    #[clap(long)]
    config: Option<PathBuf>,

    /// print the stored best score and exit
    #[clap(long)]
    best: bool,

    /// reset the stored best score to 0 and exit
    #[clap(long, conflicts_with = "best")]
    reset: bool,
}

impl Cli {
    fn resolve_config(&self) -> Config {
        let mut config = match &self.config {
            Some(path) => FileConfigStore::with_path(path).load(),
            None => FileConfigStore::new().load(),
        };
        if let Some(idle_ms) = self.idle_ms {
            config.idle_timeout_ms = idle_ms;
        }
        config
    }

    fn open_store(&self) -> JsonFileStore {
        match &self.state_file {
            Some(path) => JsonFileStore::open(path),
            None => JsonFileStore::open_default(),
        }
    }
}

/// Display sink for the non-interactive flags
struct ConsoleDisplay;

impl DisplaySink for ConsoleDisplay {
    fn render(&mut self, _view: StatusView) {}

    fn notify(&mut self, message: &str) {
        println!("{message}");
    }
}

// The terminal belongs to the UI, so log records go to a file.
fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    let config = cli.resolve_config();
    let store = cli.open_store();

    if cli.best {
        println!("{}", store.get(&config.highscore_key, 0));
        return Ok(());
    }

    if cli.reset {
        let mut ext = Extension::activate(config, store, ConsoleDisplay);
        ext.reset_highscore();
        ext.deactivate();
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, config, store);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

#[derive(Debug, PartialEq)]
enum KeyAction {
    Quit,
    Menu,
    Reset,
    Edit,
}

fn key_action(key: &KeyEvent) -> KeyAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('c') if ctrl => KeyAction::Quit,
        KeyCode::Char('r') if ctrl => KeyAction::Menu,
        KeyCode::Char('x') if ctrl => KeyAction::Reset,
        _ => KeyAction::Edit,
    }
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    config: Config,
    store: JsonFileStore,
) -> Result<(), Box<dyn Error>> {
    info!("scratchpad opened, state in {}", store.path().display());

    let mut ext = Extension::activate(config, store, StatusBar::default());
    let mut pad = Scratchpad::new();
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(WAKE_INTERVAL_MS)),
    );

    loop {
        terminal.draw(|f| ui::draw(f, &pad, ext.display()))?;

        let change = match runner.step(ext.next_deadline()) {
            Step::Event(TermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                match key_action(&key) {
                    KeyAction::Quit => break,
                    KeyAction::Menu => {
                        let mut prompter =
                            TuiPrompter::new(terminal, &runner, &pad, ext.display().clone());
                        ext.execute(Command::ShowMenu, &mut prompter);
                        None
                    }
                    KeyAction::Reset => {
                        ext.reset_highscore();
                        None
                    }
                    KeyAction::Edit => pad.apply_key(&key),
                }
            }
            Step::Event(TermEvent::Paste(text)) => pad.apply_paste(&text),
            Step::Event(_) | Step::DeadlineElapsed | Step::Wake => None,
            Step::Disconnected => break,
        };

        if let Some(change) = change {
            ext.display_mut().clear_message();
            ext.handle_document_change(slice::from_ref(&change), Instant::now());
        }
        ext.tick(Instant::now());
    }

    ext.deactivate();
    Ok(())
}
