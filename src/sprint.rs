use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::util::word_count;

pub const DEFAULT_LENGTH_MIN: u32 = 25;
pub const DEFAULT_SHORT_BREAK_MIN: u32 = 5;
pub const DEFAULT_LONG_BREAK_MIN: u32 = 15;
pub const DEFAULT_TARGET_WORDS: u32 = 500;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    #[default]
    Work,
    Break,
}

/// Board or card selected to receive credit for a sprint. Persisted as a
/// tagged string, `board:<id>` / `card:<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum AttachTarget {
    Board(String),
    Card(String),
}

impl fmt::Display for AttachTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachTarget::Board(id) => write!(f, "board:{}", id),
            AttachTarget::Card(id) => write!(f, "card:{}", id),
        }
    }
}

impl FromStr for AttachTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("board", id)) if !id.is_empty() => Ok(AttachTarget::Board(id.to_string())),
            Some(("card", id)) if !id.is_empty() => Ok(AttachTarget::Card(id.to_string())),
            _ => Err(format!("invalid attach target: {}", s)),
        }
    }
}

impl From<AttachTarget> for String {
    fn from(t: AttachTarget) -> Self {
        t.to_string()
    }
}

impl TryFrom<String> for AttachTarget {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// One completed (or manually saved) timer session. Immutable once created
/// apart from the point edits the history log allows (title, words).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintRecord {
    /// Monotonic key assigned by the history log; timestamps alone can
    /// collide within a millisecond.
    #[serde(default)]
    pub seq: u64,
    pub timestamp: DateTime<Local>,
    pub mode: Mode,
    pub length_min: u32,
    #[serde(default)]
    pub words: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub remaining_sec: u32,
    #[serde(default)]
    pub editor_text: String,
    #[serde(default)]
    pub target: Option<AttachTarget>,
}

/// Work/break countdown state machine. One instance per process; persisted as
/// current configuration/progress so it survives a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintTimer {
    pub length_min: u32,
    pub short_break_min: u32,
    pub long_break_min: u32,
    pub target_words: u32,
    pub running: bool,
    pub remaining_sec: u32,
    pub mode: Mode,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub target: Option<AttachTarget>,
}

impl Default for SprintTimer {
    fn default() -> Self {
        Self {
            length_min: DEFAULT_LENGTH_MIN,
            short_break_min: DEFAULT_SHORT_BREAK_MIN,
            long_break_min: DEFAULT_LONG_BREAK_MIN,
            target_words: DEFAULT_TARGET_WORDS,
            running: false,
            remaining_sec: DEFAULT_LENGTH_MIN * 60,
            mode: Mode::Work,
            title: String::new(),
            target: None,
        }
    }
}

impl SprintTimer {
    /// No-op if already running; the caller's single-threaded turn is the
    /// guard against a second countdown.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
    }

    /// Remaining seconds are retained, not reset.
    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.mode = Mode::Work;
        self.remaining_sec = self.length_min * 60;
    }

    /// Length edits only reset the countdown while paused; a running
    /// countdown keeps its remaining seconds until the next reset.
    pub fn set_length_min(&mut self, min: u32) {
        self.length_min = if min == 0 { DEFAULT_LENGTH_MIN } else { min };
        if !self.running {
            self.remaining_sec = self.length_min * 60;
        }
    }

    pub fn set_short_break_min(&mut self, min: u32) {
        self.short_break_min = if min == 0 {
            DEFAULT_SHORT_BREAK_MIN
        } else {
            min
        };
    }

    pub fn set_long_break_min(&mut self, min: u32) {
        self.long_break_min = if min == 0 {
            DEFAULT_LONG_BREAK_MIN
        } else {
            min
        };
    }

    pub fn set_target_words(&mut self, words: u32) {
        self.target_words = words;
    }

    /// Live editor word count if non-zero, else the configured target.
    fn credited_words(&self, editor_text: &str) -> u32 {
        let live = word_count(editor_text) as u32;
        if live > 0 {
            live
        } else {
            self.target_words
        }
    }

    fn make_record(&self, editor_text: &str) -> SprintRecord {
        SprintRecord {
            seq: 0,
            timestamp: Local::now(),
            mode: self.mode,
            length_min: self.length_min,
            words: self.credited_words(editor_text),
            title: self.title.clone(),
            remaining_sec: self.remaining_sec,
            editor_text: editor_text.to_string(),
            target: self.target.clone(),
        }
    }

    /// Advance the countdown by one elapsed second. Returns the completed
    /// session record when the countdown reaches zero; the caller is
    /// responsible for logging, attaching, and persisting it.
    pub fn tick(&mut self, editor_text: &str) -> Option<SprintRecord> {
        if !self.running {
            return None;
        }
        self.remaining_sec = self.remaining_sec.saturating_sub(1);
        if self.remaining_sec > 0 {
            return None;
        }

        self.running = false;
        let record = self.make_record(editor_text);
        match self.mode {
            Mode::Work => {
                self.mode = Mode::Break;
                self.remaining_sec = self.short_break_min * 60;
            }
            Mode::Break => {
                self.mode = Mode::Work;
                self.remaining_sec = self.length_min * 60;
            }
        }
        Some(record)
    }

    /// Forced completion-without-waiting: pauses and emits a record carrying
    /// the current remaining seconds and mode. Does not flip the mode.
    pub fn save_now(&mut self, editor_text: &str) -> SprintRecord {
        self.pause();
        self.make_record(editor_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn default_timer_is_paused_work_at_full_length() {
        let timer = SprintTimer::default();
        assert!(!timer.running);
        assert_matches!(timer.mode, Mode::Work);
        assert_eq!(timer.remaining_sec, 25 * 60);
    }

    #[test]
    fn start_is_noop_while_running() {
        let mut timer = SprintTimer::default();
        timer.start();
        assert!(timer.running);
        timer.remaining_sec = 17;
        timer.start();
        assert!(timer.running);
        assert_eq!(timer.remaining_sec, 17);
    }

    #[test]
    fn pause_retains_remaining_seconds() {
        let mut timer = SprintTimer::default();
        timer.start();
        timer.tick("");
        timer.tick("");
        timer.pause();
        assert!(!timer.running);
        assert_eq!(timer.remaining_sec, 25 * 60 - 2);
    }

    #[test]
    fn reset_forces_work_mode_and_full_length() {
        let mut timer = SprintTimer {
            mode: Mode::Break,
            remaining_sec: 3,
            running: true,
            ..SprintTimer::default()
        };
        timer.reset();
        assert!(!timer.running);
        assert_matches!(timer.mode, Mode::Work);
        assert_eq!(timer.remaining_sec, 25 * 60);
    }

    #[test]
    fn tick_does_nothing_while_paused() {
        let mut timer = SprintTimer::default();
        assert!(timer.tick("words here").is_none());
        assert_eq!(timer.remaining_sec, 25 * 60);
    }

    #[test]
    fn one_minute_sprint_completes_after_sixty_ticks() {
        let mut timer = SprintTimer {
            length_min: 1,
            remaining_sec: 60,
            target_words: 500,
            ..SprintTimer::default()
        };
        timer.start();

        let mut record = None;
        for _ in 0..60 {
            assert!(record.is_none());
            record = timer.tick("");
        }

        let record = record.expect("sixtieth tick completes the sprint");
        assert_eq!(record.words, 500);
        assert_matches!(record.mode, Mode::Work);
        assert_eq!(record.remaining_sec, 0);
        assert!(!timer.running);
        assert_matches!(timer.mode, Mode::Break);
        assert_eq!(timer.remaining_sec, timer.short_break_min * 60);
    }

    #[test]
    fn break_completion_flips_back_to_work() {
        let mut timer = SprintTimer {
            mode: Mode::Break,
            remaining_sec: 1,
            ..SprintTimer::default()
        };
        timer.start();
        let record = timer.tick("").expect("break completes");
        assert_matches!(record.mode, Mode::Break);
        assert_matches!(timer.mode, Mode::Work);
        assert_eq!(timer.remaining_sec, timer.length_min * 60);
    }

    #[test]
    fn live_editor_words_beat_the_target() {
        let mut timer = SprintTimer {
            remaining_sec: 1,
            target_words: 500,
            ..SprintTimer::default()
        };
        timer.start();
        let record = timer.tick("three little words").unwrap();
        assert_eq!(record.words, 3);
    }

    #[test]
    fn save_now_keeps_mode_and_remaining() {
        let mut timer = SprintTimer::default();
        timer.start();
        timer.tick("");
        let record = timer.save_now("");
        assert!(!timer.running);
        assert_matches!(record.mode, Mode::Work);
        assert_eq!(record.remaining_sec, 25 * 60 - 1);
        assert_matches!(timer.mode, Mode::Work);
        assert_eq!(timer.remaining_sec, 25 * 60 - 1);
    }

    #[test]
    fn length_edit_resets_remaining_only_while_paused() {
        let mut timer = SprintTimer::default();
        timer.set_length_min(10);
        assert_eq!(timer.remaining_sec, 10 * 60);

        timer.start();
        timer.tick("");
        timer.set_length_min(50);
        assert_eq!(timer.length_min, 50);
        assert_eq!(timer.remaining_sec, 10 * 60 - 1);

        timer.reset();
        assert_eq!(timer.remaining_sec, 50 * 60);
    }

    #[test]
    fn zero_field_edits_coerce_to_defaults() {
        let mut timer = SprintTimer::default();
        timer.set_length_min(0);
        assert_eq!(timer.length_min, DEFAULT_LENGTH_MIN);
        timer.set_short_break_min(0);
        assert_eq!(timer.short_break_min, DEFAULT_SHORT_BREAK_MIN);
        timer.set_long_break_min(0);
        assert_eq!(timer.long_break_min, DEFAULT_LONG_BREAK_MIN);
        timer.set_target_words(0);
        assert_eq!(timer.target_words, 0);
    }

    #[test]
    fn attach_target_string_form_roundtrips() {
        let board: AttachTarget = "board:board-3".parse().unwrap();
        assert_eq!(board, AttachTarget::Board("board-3".into()));
        assert_eq!(board.to_string(), "board:board-3");

        let card: AttachTarget = "card:card-12".parse().unwrap();
        assert_eq!(card.to_string(), "card:card-12");

        assert!("note:x".parse::<AttachTarget>().is_err());
        assert!("board:".parse::<AttachTarget>().is_err());
    }

    #[test]
    fn timer_state_roundtrips_through_json() {
        let mut timer = SprintTimer::default();
        timer.title = "morning pages".into();
        timer.target = Some(AttachTarget::Card("card-2".into()));
        let json = serde_json::to_string(&timer).unwrap();
        let back: SprintTimer = serde_json::from_str(&json).unwrap();
        assert_eq!(timer, back);
    }
}
