//! Player domain: the walking avatar, the camera that follows it, and the
//! interaction resolver bound to the E key.

mod camera;
pub mod interaction;
mod movement;
mod spawn;

use bevy::prelude::*;
use crate::flow::FlowSet;
use crate::shared::*;

pub use camera::overhead_zoom;
pub use movement::player_movement;
pub use spawn::spawn_player;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        // -- Spawn player when we enter Playing --
        app.add_systems(OnEnter(GameState::Playing), spawn::spawn_player);

        // -- Systems that run every frame while Playing --
        app.add_systems(
            Update,
            (
                // Movement reads the mode the input handler left behind.
                movement::player_movement.after(FlowSet::Input).before(FlowSet::Publish),
                movement::sync_player_transform.after(movement::player_movement),
                interaction::update_interaction_prompt.in_set(FlowSet::Publish),
                camera::camera_follow_player.after(FlowSet::Publish),
            )
                .run_if(in_state(GameState::Playing)),
        );
    }
}
