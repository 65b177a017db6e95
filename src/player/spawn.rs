use bevy::prelude::*;
use crate::shared::*;

/// Side of the placeholder player square, in pixels.
const PLAYER_SIZE: f32 = 24.0;

/// Spawn the player at the authored start position.
/// Runs once on `OnEnter(GameState::Playing)`.
pub fn spawn_player(
    mut commands: Commands,
    story: Option<Res<StoryConfig>>,
    existing: Query<Entity, With<Player>>,
) {
    // Guard: don't double-spawn if returning to Playing state.
    if !existing.is_empty() {
        return;
    }

    let start = story
        .map(|s| Vec3::from_array(s.player_start))
        .unwrap_or(Vec3::ZERO);

    commands.spawn((
        Player,
        WorldPosition(start),
        // Placeholder sprite: a pale blue square
        Sprite {
            color: Color::srgb(0.55, 0.75, 0.95),
            custom_size: Some(Vec2::splat(PLAYER_SIZE)),
            ..default()
        },
        // Z = 10 so the player draws above the ground and NPCs.
        Transform::from_translation(world_to_screen(start).extend(10.0)),
        Visibility::default(),
    ));
    info!("[Player] spawned at {:?}", start);
}
