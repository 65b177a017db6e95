use bevy::prelude::*;
use crate::shared::*;

/// Height above the focal point that maps to an unzoomed view.
const BASE_VIEW_HEIGHT: f32 = 10.0;

/// Smoothly follow the player with the camera using a lerp. Once the flow
/// has set a camera pose (the ending shot) the camera frames that instead.
pub fn camera_follow_player(
    time: Res<Time>,
    presentation: Res<Presentation>,
    player_query: Query<&WorldPosition, (With<Player>, Without<Camera2d>)>,
    mut camera_query: Query<&mut Transform, (With<Camera2d>, Without<Player>)>,
) {
    let Ok(mut cam_tf) = camera_query.get_single_mut() else {
        return;
    };

    let (focus, zoom) = match presentation.camera_pose() {
        Some(pose) => (pose.look_at, overhead_zoom(pose)),
        None => {
            let Ok(position) = player_query.get_single() else {
                return;
            };
            (position.0, 1.0)
        }
    };

    let target = world_to_screen(focus);
    let lerp_speed = 5.0;
    let t = (lerp_speed * time.delta_secs()).min(1.0);
    cam_tf.translation.x += (target.x - cam_tf.translation.x) * t;
    cam_tf.translation.y += (target.y - cam_tf.translation.y) * t;

    let scale = cam_tf.scale.x + (zoom - cam_tf.scale.x) * t;
    cam_tf.scale = Vec3::new(scale, scale, 1.0);
}

/// Orthographic zoom for a pose looking straight down from `position`.
pub fn overhead_zoom(pose: CameraPose) -> f32 {
    let height = (pose.position - pose.look_at).length();
    (height / BASE_VIEW_HEIGHT).max(1.0)
}
