//! Data layer: loads the authored story at startup.
//!
//! This plugin runs in OnEnter(GameState::Loading), parses the story
//! definition embedded from `assets/story.ron`, seeds the interactable
//! registry and the flow controller from it, then transitions the game
//! into GameState::Playing.
//!
//! No other domain needs to seed these resources. All domain plugins can
//! safely read them once GameState has advanced past Loading.

use bevy::prelude::*;
use crate::flow::GameFlow;
use crate::npcs::InteractableRegistry;
use crate::shared::*;

/// Story definition compiled into the binary.
pub const STORY_RON: &str = include_str!("../../assets/story.ron");

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Loading), load_story);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoryLoadError {
    #[error("story file is not valid RON: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("story has no NPCs for day {0}")]
    EmptyDay(u32),

    #[error("story setting out of range: {0}")]
    BadSetting(&'static str),
}

/// Parses and sanity-checks a story definition.
pub fn parse_story(source: &str) -> Result<StoryConfig, StoryLoadError> {
    let story: StoryConfig = ron::from_str(source)?;
    validate_story(&story)?;
    Ok(story)
}

fn validate_story(story: &StoryConfig) -> Result<(), StoryLoadError> {
    let settings = &story.settings;
    if settings.day_duration <= 0.0 {
        return Err(StoryLoadError::BadSetting("day_duration must be positive"));
    }
    if !(0.0..=1.0).contains(&settings.evening_fraction) {
        return Err(StoryLoadError::BadSetting("evening_fraction must be within 0..=1"));
    }
    if settings.reveal_interval < 0.0 {
        return Err(StoryLoadError::BadSetting("reveal_interval must not be negative"));
    }
    if settings.interact_radius <= 0.0 {
        return Err(StoryLoadError::BadSetting("interact_radius must be positive"));
    }
    for day in [FIRST_DAY, FINAL_DAY] {
        if !story.npcs.iter().any(|npc| npc.day == day) {
            return Err(StoryLoadError::EmptyDay(day));
        }
    }
    if door_reach_exceeds_search(story) {
        warn!(
            "[Data] door reach {:?} exceeds interact_radius {}; the outer part is unreachable",
            story.door.as_ref().map(|door| door.interact_distance),
            settings.interact_radius
        );
    }
    Ok(())
}

/// The resolver only looks `interact_radius` around the player, so a door
/// reach beyond it can never be used.
fn door_reach_exceeds_search(story: &StoryConfig) -> bool {
    story
        .door
        .as_ref()
        .is_some_and(|door| door.interact_distance > story.settings.interact_radius)
}

/// Single system that seeds story state and then transitions to Playing.
///
/// A story that fails to load is logged and replaced by the default
/// configuration, so the game still boots.
fn load_story(mut commands: Commands, mut next_state: ResMut<NextState<GameState>>) {
    info!("[Data] loading story…");

    let story = match parse_story(STORY_RON) {
        Ok(story) => story,
        Err(err) => {
            error!("[Data] {}; falling back to the default story", err);
            StoryConfig::default()
        }
    };

    let registry = InteractableRegistry::from_story(&story);
    info!(
        "[Data]   NPCs loaded: {} for day 1, {} for day 2, door: {}",
        registry.roster(1).len(),
        registry.roster(2).len(),
        registry.door().is_some()
    );

    commands.insert_resource(GameFlow::from_story(&story));
    commands.insert_resource(registry);
    commands.insert_resource(story);

    info!("[Data] story ready: transitioning to Playing");
    next_state.set(GameState::Playing);
}

// ─── Tests ────────────────────────────────────────────────────────────────────
