use std::collections::VecDeque;

use thiserror::Error;

/// User commands the host can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Command {
    #[strum(to_string = "typespeed.showMenu")]
    ShowMenu,
    #[strum(to_string = "typespeed.resetHighscore")]
    ResetHighscore,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("command `{0}` is no longer registered")]
    Unregistered(String),
}

impl Command {
    pub const ALL: [Command; 2] = [Command::ShowMenu, Command::ResetHighscore];

    pub fn from_id(id: &str) -> Result<Self, CommandError> {
        Self::ALL
            .into_iter()
            .find(|command| command.to_string() == id)
            .ok_or_else(|| CommandError::Unknown(id.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    ResetHighscore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: &'static str,
    pub description: &'static str,
    pub action: MenuAction,
}

pub const MENU_ITEMS: &[MenuItem] = &[MenuItem {
    label: "Reset Highscore WPM",
    description: "Reset your highest WPM to 0",
    action: MenuAction::ResetHighscore,
}];

pub const RESET_CONFIRMATION: &str = "Are you sure you want to reset your highscore WPM?";
pub const RESET_CHOICE: &str = "Reset";
pub const CANCEL_CHOICE: &str = "Cancel";
pub const RESET_NOTICE: &str = "Highscore WPM has been reset to 0";

/// Host-side pickers and confirmation dialogs
pub trait Prompter {
    /// Let the user pick one item; `None` when dismissed.
    fn pick(&mut self, items: &[MenuItem]) -> Option<MenuAction>;

    /// Modal question; returns the chosen entry of `choices`, `None` when dismissed.
    fn confirm<'c>(&mut self, message: &str, choices: &[&'c str]) -> Option<&'c str>;
}

/// Prompter that replays canned answers, for tests and scripted hosts
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    picks: VecDeque<Option<MenuAction>>,
    answers: VecDeque<Option<String>>,
    pub questions: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pick_then(mut self, pick: Option<MenuAction>) -> Self {
        self.picks.push_back(pick);
        self
    }

    pub fn answer_then(mut self, answer: Option<&str>) -> Self {
        self.answers.push_back(answer.map(str::to_string));
        self
    }
}

impl Prompter for ScriptedPrompter {
    fn pick(&mut self, _items: &[MenuItem]) -> Option<MenuAction> {
        self.picks.pop_front().flatten()
    }

    fn confirm<'c>(&mut self, message: &str, choices: &[&'c str]) -> Option<&'c str> {
        self.questions.push(message.to_string());
        let answer = self.answers.pop_front().flatten()?;
        choices.iter().copied().find(|choice| *choice == answer)
    }
}
