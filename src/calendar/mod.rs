//! Calendar domain: the day clock of Duskfall.
//!
//! Responsible for:
//! - Advancing the normalized time of day while the story lets time flow
//! - Formatting the wall-clock hour for the HUD
//! - Feeding the evening threshold check into the flow controller
//!
//! The day number only changes inside the sleep sequence (see `flow`).

use bevy::prelude::*;

use crate::flow::GameFlow;
use crate::npcs::InteractableRegistry;
use crate::shared::*;

pub struct CalendarPlugin;

impl Plugin for CalendarPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            tick_time
                .in_set(crate::flow::FlowSet::Clock)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

/// Day number plus normalized time of day (0 = dawn, 1 = dusk cutoff).
///
/// Time is the starting fraction plus the seconds elapsed since, summed in
/// f64 and divided once per tick, so the evening threshold lands on the
/// exact second it is authored for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayClock {
    pub day: u32,
    time_of_day: f64,
    start_fraction: f64,
    elapsed_seconds: f64,
}

impl Default for DayClock {
    fn default() -> Self {
        Self::at(FIRST_DAY, 0.0)
    }
}

impl DayClock {
    pub fn at(day: u32, time_of_day: f64) -> Self {
        let time_of_day = time_of_day.clamp(0.0, 1.0);
        Self {
            day,
            time_of_day,
            start_fraction: time_of_day,
            elapsed_seconds: 0.0,
        }
    }

    pub fn time_of_day(&self) -> f64 {
        self.time_of_day
    }

    /// Moves time forward by `delta_seconds / day_duration`, clamped to 1.0.
    /// A non-positive day duration freezes the clock. Never moves backwards.
    pub fn advance(&mut self, delta_seconds: f32, day_duration: f32) {
        if day_duration <= 0.0 || delta_seconds <= 0.0 {
            return;
        }
        self.elapsed_seconds += f64::from(delta_seconds);
        let t = self.start_fraction + self.elapsed_seconds / f64::from(day_duration);
        self.time_of_day = t.clamp(self.time_of_day, 1.0);
    }

    /// Hour shown on the clock, 0..=23. Dusk reads 23, never 24.
    pub fn formatted_time(&self) -> u32 {
        ((self.time_of_day * 24.0).floor() as u32).min(23)
    }

    pub fn clock_label(&self) -> String {
        format!("{:02}:00", self.formatted_time())
    }

    pub fn is_evening(&self, evening_fraction: f32) -> bool {
        self.time_of_day >= f64::from(evening_fraction)
    }

    /// Dawn of the next day.
    pub fn roll_over(&mut self) {
        self.day += 1;
        self.time_of_day = 0.0;
        self.start_fraction = 0.0;
        self.elapsed_seconds = 0.0;
    }
}

// ─── Main time-tick system ────────────────────────────────────────────────────

/// Advances the clock by the frame delta. Gating on intro, dialogue, sleep
/// and ending lives in `GameFlow::tick_clock`; the HUD label refreshes
/// every frame regardless.
fn tick_time(
    time: Res<Time>,
    mut flow: ResMut<GameFlow>,
    mut registry: ResMut<InteractableRegistry>,
    mut presentation: ResMut<Presentation>,
) {
    flow.tick_clock(time.delta_secs(), &mut registry, &mut presentation);
}

// ─── Tests ────────────────────────────────────────────────────────────────────
