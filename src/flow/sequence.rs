//! Timed flow sequences: the sleep/day transition and the ending.
//!
//! A sequence is a queue of steps advanced by the frame delta, one step
//! per frame at most. Fades are driven here directly; the steps that
//! touch story state are handed back to `GameFlow` to apply.

use bevy::prelude::*;
use std::collections::VecDeque;

use crate::shared::*;

#[derive(Debug, Clone, PartialEq)]
pub enum FlowStep {
    /// Screen opacity from `from` to `to` over `duration` seconds.
    Fade { from: f32, to: f32, duration: f32 },
    Wait(f32),
    /// Dawn of the next day: clock, counters and rosters reset together.
    AdvanceDay,
    /// Sleep is over; hand control back to the player.
    Wake,
    /// Overhead camera over the village focal point.
    FrameVillage,
    RevealEnding,
}

impl FlowStep {
    fn is_timed(&self) -> bool {
        matches!(self, FlowStep::Fade { .. } | FlowStep::Wait(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    DayTransition,
    Ending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowSequence {
    kind: SequenceKind,
    steps: VecDeque<FlowStep>,
    step_timer: f32,
}

impl FlowSequence {
    /// Fade out, settle, advance the day, settle, fade in, wake.
    pub fn day_transition(settings: &FlowSettings) -> Self {
        let steps = VecDeque::from(vec![
            FlowStep::Fade {
                from: 0.0,
                to: 1.0,
                duration: settings.fade_duration,
            },
            FlowStep::Wait(settings.settle_duration),
            FlowStep::AdvanceDay,
            FlowStep::Wait(settings.settle_duration),
            FlowStep::Fade {
                from: 1.0,
                to: 0.0,
                duration: settings.fade_duration,
            },
            FlowStep::Wake,
        ]);
        Self {
            kind: SequenceKind::DayTransition,
            steps,
            step_timer: 0.0,
        }
    }

    /// Short pause, overhead shot, short pause, ending screen.
    pub fn ending(settings: &FlowSettings) -> Self {
        let steps = VecDeque::from(vec![
            FlowStep::Wait(settings.ending_camera_delay),
            FlowStep::FrameVillage,
            FlowStep::Wait(settings.ending_reveal_delay),
            FlowStep::RevealEnding,
        ]);
        Self {
            kind: SequenceKind::Ending,
            steps,
            step_timer: 0.0,
        }
    }

    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    pub fn current_step(&self) -> Option<&FlowStep> {
        self.steps.front()
    }

    pub fn remaining_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn is_finished(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs the front step for `dt` seconds. Timed steps are consumed
    /// here; an untimed step is popped and returned for the caller to
    /// apply.
    pub fn tick(&mut self, dt: f32, presentation: &mut Presentation) -> Option<FlowStep> {
        let step = self.steps.front()?.clone();

        if !step.is_timed() {
            self.pop();
            return Some(step);
        }

        match step {
            FlowStep::Fade { from, to, duration } => {
                if !presentation.is_available(Surface::Fade) {
                    debug!("[Flow] no fade surface, skipping fade to {}", to);
                    self.pop();
                    return None;
                }
                if self.step_timer == 0.0 {
                    presentation.set_visible(Surface::Fade, true);
                    presentation.set_screen_opacity(from);
                }
                self.step_timer += dt;
                if duration <= 0.0 || self.step_timer >= duration {
                    presentation.set_screen_opacity(to);
                    if to <= 0.0 {
                        presentation.set_visible(Surface::Fade, false);
                    }
                    self.pop();
                } else {
                    let t = self.step_timer / duration;
                    presentation.set_screen_opacity(from + (to - from) * t);
                }
            }
            FlowStep::Wait(secs) => {
                self.step_timer += dt;
                if self.step_timer >= secs {
                    self.pop();
                }
            }
            _ => {}
        }
        None
    }

    fn pop(&mut self) {
        self.steps.pop_front();
        self.step_timer = 0.0;
    }
}
