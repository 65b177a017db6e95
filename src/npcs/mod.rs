//! NPC domain plugin for Duskfall.
//!
//! Owns the interactable registry types and the sprites that stand in for
//! them in the village. Story state changes arrive through flow events.

use bevy::prelude::*;
use crate::flow::FlowSet;
use crate::shared::*;

mod registry;
pub mod spawning;

pub use registry::{DoorEntity, Interactable, InteractableId, InteractableRegistry, NpcEntity};

pub struct NpcPlugin;

impl Plugin for NpcPlugin {
    fn build(&self, app: &mut App) {
        // Spawn sprites once the story has been loaded into the registry.
        app.add_systems(OnEnter(GameState::Playing), spawning::spawn_interactables);

        app.add_systems(
            Update,
            (
                spawning::refresh_roster_on_new_day,
                spawning::tint_unavailable_npcs,
            )
                .after(FlowSet::Publish)
                .run_if(in_state(GameState::Playing)),
        );
    }
}
