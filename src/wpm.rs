/// Characters that make up one "word" for speed purposes
pub const CHARS_PER_WORD: f64 = 5.0;

const MS_PER_MINUTE: f64 = 60_000.0;

/// Words per minute for `character_count` characters typed over `elapsed_ms`.
///
/// Zero elapsed time yields 0. The result is rounded half away from zero.
/// Negative elapsed time is not clamped and yields a negative speed.
pub fn wpm(character_count: u64, elapsed_ms: i64) -> i64 {
    if elapsed_ms == 0 {
        return 0;
    }

    let words = character_count as f64 / CHARS_PER_WORD;
    let minutes = elapsed_ms as f64 / MS_PER_MINUTE;

    (words / minutes).round() as i64
}
