use bevy::prelude::*;
use crate::shared::*;
use super::SurfaceNode;

/// Marker for the screen fade overlay
#[derive(Component)]
pub struct ScreenFadeOverlay;

/// Spawn the fade overlay (always present but invisible)
pub fn spawn_fade_overlay(mut commands: Commands, mut presentation: ResMut<Presentation>) {
    commands.spawn((
        ScreenFadeOverlay,
        SurfaceNode(Surface::Fade),
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            position_type: PositionType::Absolute,
            ..default()
        },
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.0)),
        GlobalZIndex(100), // on top of everything
        Visibility::Hidden,
    ));
    presentation.register_surface(Surface::Fade);
}

/// Paint the overlay with the opacity the sleep sequence is driving.
pub fn update_fade(
    presentation: Res<Presentation>,
    mut query: Query<&mut BackgroundColor, With<ScreenFadeOverlay>>,
) {
    if !presentation.is_changed() {
        return;
    }
    let alpha = if presentation.is_visible(Surface::Fade) {
        presentation.screen_opacity()
    } else {
        0.0
    };
    for mut bg in &mut query {
        *bg = BackgroundColor(Color::srgba(0.0, 0.0, 0.0, alpha));
    }
}
