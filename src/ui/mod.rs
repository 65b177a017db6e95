mod dialogue_box;
mod hud;
mod screens;
mod transitions;

use bevy::prelude::*;
use crate::flow::FlowSet;
use crate::shared::*;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UiFontHandle>();

        // ─── SURFACES: always present, hidden until the flow shows them ───
        app.add_systems(
            Startup,
            (
                transitions::spawn_fade_overlay,
                hud::spawn_hud,
                dialogue_box::spawn_dialogue_box,
                screens::spawn_intro_screen,
                screens::spawn_ending_screen,
            ),
        );

        // ─── MIRROR: Presentation → nodes, after the flow has settled ───
        app.add_systems(
            Update,
            (
                sync_surface_visibility,
                sync_surface_text,
                transitions::update_fade,
                dialogue_box::update_continue_hint,
            )
                .after(FlowSet::Publish),
        );
    }
}

/// Font used by every UI text node. The default handle is Bevy's embedded
/// font.
#[derive(Resource, Default)]
pub struct UiFontHandle(pub Handle<Font>);

/// Root node of a presentation surface. Shown and hidden as a whole.
#[derive(Component, Debug, Clone, Copy)]
pub struct SurfaceNode(pub Surface);

/// Text node carrying a surface's text.
#[derive(Component, Debug, Clone, Copy)]
pub struct SurfaceText(pub Surface);

fn sync_surface_visibility(
    presentation: Res<Presentation>,
    mut query: Query<(&SurfaceNode, &mut Visibility)>,
) {
    if !presentation.is_changed() {
        return;
    }
    for (node, mut visibility) in &mut query {
        let wanted = if presentation.is_visible(node.0) {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        if *visibility != wanted {
            *visibility = wanted;
        }
    }
}

fn sync_surface_text(
    presentation: Res<Presentation>,
    mut query: Query<(&SurfaceText, &mut Text)>,
) {
    if !presentation.is_changed() {
        return;
    }
    for (surface, mut text) in &mut query {
        let wanted = presentation.text(surface.0);
        if text.0 != wanted {
            text.0 = wanted.to_string();
        }
    }
}
