// Library surface for the terminal host, headless drivers and tests.
// Rendering and CLI parsing stay in the binary.
pub mod app_dirs;
pub mod commands;
pub mod config;
pub mod display;
pub mod disposable;
pub mod editor;
pub mod extension;
pub mod idle_timer;
pub mod keystroke;
pub mod runtime;
pub mod session;
pub mod store;
pub mod tracker;
pub mod wpm;

pub use extension::Extension;
pub use keystroke::ChangeDescriptor;
pub use wpm::wpm;
