use bevy::prelude::*;
use crate::flow::GameFlow;
use crate::shared::*;

/// Walks the player on the ground plane from `PlayerInput::move_axis`.
///
/// Screen up is world -Z. Only free roam moves the player; dialogue, sleep
/// and the ending keep them in place.
pub fn player_movement(
    time: Res<Time>,
    input: Res<PlayerInput>,
    flow: Res<GameFlow>,
    mut query: Query<&mut WorldPosition, With<Player>>,
) {
    if !flow.player_can_move() || input.move_axis == Vec2::ZERO {
        return;
    }
    let Ok(mut position) = query.get_single_mut() else {
        return;
    };

    let step = input.move_axis.normalize_or_zero() * flow.settings().player_speed * time.delta_secs();
    position.0 += Vec3::new(step.x, 0.0, -step.y);
}

/// Keeps the sprite transform on top of the logical position.
pub fn sync_player_transform(
    mut query: Query<(&WorldPosition, &mut Transform), (With<Player>, Changed<WorldPosition>)>,
) {
    for (position, mut transform) in &mut query {
        let screen = world_to_screen(position.0);
        transform.translation.x = screen.x;
        transform.translation.y = screen.y;
    }
}
