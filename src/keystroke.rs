/// Largest insertion that still counts as typing rather than a paste
pub const DEFAULT_MAX_INSERTED: usize = 10;
/// Largest replaced range that still counts as typing rather than a bulk edit
pub const DEFAULT_MAX_REPLACED: usize = 10;

/// One content change from a document edit notification.
///
/// Only lengths are kept; the classifier never looks at document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeDescriptor {
    pub inserted_len: usize,
    pub replaced_len: usize,
}

impl ChangeDescriptor {
    pub fn new(inserted_len: usize, replaced_len: usize) -> Self {
        Self {
            inserted_len,
            replaced_len,
        }
    }

    pub fn insert(text: &str) -> Self {
        Self::new(text.chars().count(), 0)
    }

    pub fn replace(text: &str, replaced_len: usize) -> Self {
        Self::new(text.chars().count(), replaced_len)
    }

    pub fn delete(len: usize) -> Self {
        Self::new(0, len)
    }
}

/// Size thresholds separating organic typing from pastes and bulk edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeystrokeLimits {
    pub max_inserted: usize,
    pub max_replaced: usize,
}

impl Default for KeystrokeLimits {
    fn default() -> Self {
        Self {
            max_inserted: DEFAULT_MAX_INSERTED,
            max_replaced: DEFAULT_MAX_REPLACED,
        }
    }
}

impl KeystrokeLimits {
    fn admits(&self, change: &ChangeDescriptor) -> bool {
        change.inserted_len > 0
            && change.inserted_len <= self.max_inserted
            && change.replaced_len <= self.max_replaced
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    pub valid: bool,
    pub added_characters: u64,
}

/// Decide whether a batch of changes from one notification is typing.
pub fn classify(changes: &[ChangeDescriptor], limits: &KeystrokeLimits) -> Classification {
    let mut qualified = false;
    let mut added_characters = 0u64;

    for change in changes.iter().filter(|c| limits.admits(c)) {
        qualified = true;
        added_characters += change.inserted_len as u64;
    }

    Classification {
        valid: qualified && added_characters > 0,
        added_characters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(changes: &[ChangeDescriptor]) -> Classification {
        classify(changes, &KeystrokeLimits::default())
    }

    #[test]
    fn test_empty_batch_is_invalid() {
        assert_eq!(
            run(&[]),
            Classification {
                valid: false,
                added_characters: 0
            }
        );
    }

    #[test]
    fn test_single_char_is_valid() {
        let c = run(&[ChangeDescriptor::insert("a")]);
        assert!(c.valid);
        assert_eq!(c.added_characters, 1);
    }

    #[test]
    fn test_insert_bounds() {
        for len in 1..=10 {
            let c = run(&[ChangeDescriptor::new(len, 10)]);
            assert!(c.valid, "len {len} should count");
            assert_eq!(c.added_characters, len as u64);
        }

        let paste = run(&[ChangeDescriptor::new(11, 0)]);
        assert!(!paste.valid);
        assert_eq!(paste.added_characters, 0);
    }

    #[test]
    fn test_large_replaced_range_is_rejected() {
        let c = run(&[ChangeDescriptor::new(1, 11)]);
        assert!(!c.valid);
        assert_eq!(c.added_characters, 0);
    }

    #[test]
    fn test_pure_deletion_never_counts() {
        let c = run(&[ChangeDescriptor::delete(1), ChangeDescriptor::delete(5)]);
        assert!(!c.valid);
        assert_eq!(c.added_characters, 0);
    }

    #[test]
    fn test_multi_cursor_sums() {
        let c = run(&[
            ChangeDescriptor::insert("a"),
            ChangeDescriptor::insert("b"),
            ChangeDescriptor::insert("cd"),
        ]);
        assert!(c.valid);
        assert_eq!(c.added_characters, 4);
    }

    #[test]
    fn test_mixed_batch_counts_only_qualifying() {
        let c = run(&[
            ChangeDescriptor::insert("x"),
            ChangeDescriptor::insert("a pasted paragraph"),
            ChangeDescriptor::delete(3),
        ]);
        assert!(c.valid);
        assert_eq!(c.added_characters, 1);
    }

    #[test]
    fn test_lengths_count_chars_not_bytes() {
        let d = ChangeDescriptor::insert("héllo✓");
        assert_eq!(d.inserted_len, 6);
    }

    #[test]
    fn test_custom_limits() {
        let limits = KeystrokeLimits {
            max_inserted: 1,
            max_replaced: 0,
        };
        assert!(classify(&[ChangeDescriptor::insert("a")], &limits).valid);
        assert!(!classify(&[ChangeDescriptor::insert("ab")], &limits).valid);
        assert!(!classify(&[ChangeDescriptor::replace("a", 1)], &limits).valid);
    }
}
