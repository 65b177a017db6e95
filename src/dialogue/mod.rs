//! Dialogue session: reveals one line at a time, character by character.
//!
//! `Idle → Typing → LineComplete → (Typing | Finished)`
//!
//! The session is a plain state object. The flow controller owns the
//! active one, feeds it frame deltas through `tick`, and forwards the
//! advance trigger to `advance`.

use crate::shared::FlowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialoguePhase {
    #[default]
    Idle,
    Typing,
    LineComplete,
    Finished,
}

/// What an advance press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueProgress {
    /// Idle or Finished: nothing happened.
    Ignored,
    /// The running reveal was cut short and the full line is shown.
    Snapped,
    /// The next line started typing.
    NextLine,
    /// The last line was acknowledged.
    Finished,
}

/// The pending character reveal. At most one exists per session.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Reveal {
    /// Byte offset into the current line of the next character to show.
    cursor: usize,
    elapsed: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialogueSession {
    lines: Vec<String>,
    current_index: usize,
    revealed_text: String,
    phase: DialoguePhase,
    reveal: Option<Reveal>,
    char_interval: f32,
    lines_completed: usize,
}

impl DialogueSession {
    pub fn new(char_interval: f32) -> Self {
        Self {
            lines: Vec::new(),
            current_index: 0,
            revealed_text: String::new(),
            phase: DialoguePhase::Idle,
            reveal: None,
            char_interval: char_interval.max(0.0),
            lines_completed: 0,
        }
    }

    pub fn phase(&self) -> DialoguePhase {
        self.phase
    }

    pub fn revealed_text(&self) -> &str {
        &self.revealed_text
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// How many times the session has entered `LineComplete`.
    pub fn lines_completed(&self) -> usize {
        self.lines_completed
    }

    pub fn is_last_line(&self) -> bool {
        self.current_index + 1 >= self.lines.len()
    }

    /// Begins typing line 0. Rejects an empty line set without touching
    /// the current state.
    pub fn start(&mut self, lines: Vec<String>) -> Result<(), FlowError> {
        if lines.is_empty() {
            return Err(FlowError::InvalidInput("dialogue has no lines".to_string()));
        }
        self.lines = lines;
        self.current_index = 0;
        self.lines_completed = 0;
        self.begin_line();
        Ok(())
    }

    /// Handles the single advance trigger.
    pub fn advance(&mut self) -> DialogueProgress {
        match self.phase {
            DialoguePhase::Idle | DialoguePhase::Finished => DialogueProgress::Ignored,
            DialoguePhase::Typing => {
                self.reveal = None;
                self.revealed_text = self.lines[self.current_index].clone();
                self.complete_line();
                DialogueProgress::Snapped
            }
            DialoguePhase::LineComplete => {
                self.current_index += 1;
                if self.current_index >= self.lines.len() {
                    self.phase = DialoguePhase::Finished;
                    DialogueProgress::Finished
                } else {
                    self.begin_line();
                    DialogueProgress::NextLine
                }
            }
        }
    }

    /// Moves the reveal forward by `dt` seconds. Returns true when the
    /// visible text changed.
    pub fn tick(&mut self, dt: f32) -> bool {
        let Some(mut reveal) = self.reveal else {
            return false;
        };
        reveal.elapsed += dt.max(0.0);

        let mut changed = false;
        while reveal.elapsed >= self.char_interval {
            reveal.elapsed -= self.char_interval;
            if !self.reveal_next_char(&mut reveal) {
                break;
            }
            changed = true;
            if self.phase != DialoguePhase::Typing {
                return true;
            }
        }

        if self.phase == DialoguePhase::Typing {
            self.reveal = Some(reveal);
        }
        changed
    }

    /// Clears the text and starts a fresh reveal of the current line. The
    /// first character shows immediately. Any pending reveal is dropped.
    fn begin_line(&mut self) {
        self.reveal = None;
        self.revealed_text.clear();
        self.phase = DialoguePhase::Typing;

        let mut reveal = Reveal {
            cursor: 0,
            elapsed: 0.0,
        };
        self.reveal_next_char(&mut reveal);
        if self.phase == DialoguePhase::Typing {
            self.reveal = Some(reveal);
        }
    }

    /// Appends one character. Finishing the line moves to `LineComplete`.
    /// Returns false if there was nothing left to reveal.
    fn reveal_next_char(&mut self, reveal: &mut Reveal) -> bool {
        let line = &self.lines[self.current_index];
        let Some(ch) = line[reveal.cursor..].chars().next() else {
            self.complete_line();
            return false;
        };
        self.revealed_text.push(ch);
        reveal.cursor += ch.len_utf8();
        if reveal.cursor >= line.len() {
            self.complete_line();
        }
        true
    }

    fn complete_line(&mut self) {
        self.reveal = None;
        self.phase = DialoguePhase::LineComplete;
        self.lines_completed += 1;
    }
}
