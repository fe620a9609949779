use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::keystroke::ChangeDescriptor;

const TAB: &str = "    ";

/// Minimal in-memory document the terminal host edits.
///
/// Every mutation reports the content change it made, the same way an editor
/// reports document changes to its extensions.
#[derive(Debug, Clone, Default)]
pub struct Scratchpad {
    text: String,
}

impl Scratchpad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Apply an editing key. Keys that do not edit, or edits with nothing to
    /// remove, return `None`.
    pub fn apply_key(&mut self, key: &KeyEvent) -> Option<ChangeDescriptor> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Char('w') if ctrl => self.delete_word(),
            KeyCode::Char('u') if ctrl => self.delete_line(),
            KeyCode::Char(c) if !ctrl && !alt => Some(self.insert(c.encode_utf8(&mut [0; 4]))),
            KeyCode::Enter => Some(self.insert("\n")),
            KeyCode::Tab => Some(self.insert(TAB)),
            KeyCode::Backspace => self.delete_back(1),
            _ => None,
        }
    }

    /// Insert pasted text in one change, normalizing line endings.
    pub fn apply_paste(&mut self, text: &str) -> Option<ChangeDescriptor> {
        if text.is_empty() {
            return None;
        }
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        Some(self.insert(&normalized))
    }

    fn insert(&mut self, text: &str) -> ChangeDescriptor {
        self.text.push_str(text);
        ChangeDescriptor::insert(text)
    }

    fn delete_back(&mut self, count: usize) -> Option<ChangeDescriptor> {
        let mut removed = 0;
        while removed < count && self.text.pop().is_some() {
            removed += 1;
        }
        (removed > 0).then(|| ChangeDescriptor::delete(removed))
    }

    // Trailing blanks, then the word before them.
    fn delete_word(&mut self) -> Option<ChangeDescriptor> {
        let chars: Vec<char> = self.text.chars().collect();
        let blanks = chars
            .iter()
            .rev()
            .take_while(|c| c.is_whitespace())
            .count();
        let word = chars[..chars.len() - blanks]
            .iter()
            .rev()
            .take_while(|c| !c.is_whitespace())
            .count();
        self.delete_back(blanks + word)
    }

    fn delete_line(&mut self) -> Option<ChangeDescriptor> {
        let line = self
            .text
            .rsplit('\n')
            .next()
            .map(|line| line.chars().count())
            .unwrap_or(0);
        self.delete_back(line)
    }
}
