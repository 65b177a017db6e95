use bevy::prelude::*;
use crate::shared::*;
use super::{SurfaceNode, SurfaceText, UiFontHandle};

// ═══════════════════════════════════════════════════════════════════════
// MARKER COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component)]
pub struct HudRoot;

#[derive(Component)]
pub struct HudClockText;

#[derive(Component)]
pub struct HudWarningBanner;

#[derive(Component, Debug)]
pub struct HudInteractionPrompt;

// ═══════════════════════════════════════════════════════════════════════
// SPAWN HUD
// ═══════════════════════════════════════════════════════════════════════

/// Clock in the top-left, warning banner top-centre, interaction prompt
/// near the bottom. Registers the clock, warning and prompt surfaces.
pub fn spawn_hud(
    mut commands: Commands,
    font_handle: Res<UiFontHandle>,
    mut presentation: ResMut<Presentation>,
) {
    let font = font_handle.0.clone();

    // Root container: full screen overlay
    commands
        .spawn((
            HudRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::SpaceBetween,
                align_items: AlignItems::Center,
                padding: UiRect::all(Val::Px(12.0)),
                ..default()
            },
        ))
        .with_children(|parent| {
            // ─── TOP ROW: clock + warning ───
            parent
                .spawn(Node {
                    width: Val::Percent(100.0),
                    flex_direction: FlexDirection::Row,
                    justify_content: JustifyContent::SpaceBetween,
                    align_items: AlignItems::FlexStart,
                    ..default()
                })
                .with_children(|top| {
                    top.spawn((
                        Node {
                            padding: UiRect::axes(Val::Px(10.0), Val::Px(4.0)),
                            ..default()
                        },
                        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
                    ))
                    .with_children(|clock| {
                        clock.spawn((
                            HudClockText,
                            SurfaceText(Surface::Clock),
                            Text::new("00:00"),
                            TextFont {
                                font: font.clone(),
                                font_size: 20.0,
                                ..default()
                            },
                            TextColor(Color::WHITE),
                        ));
                    });

                    top.spawn((
                        HudWarningBanner,
                        SurfaceNode(Surface::Warning),
                        Node {
                            flex_direction: FlexDirection::Column,
                            align_items: AlignItems::Center,
                            padding: UiRect::axes(Val::Px(16.0), Val::Px(8.0)),
                            ..default()
                        },
                        BackgroundColor(Color::srgba(0.45, 0.08, 0.05, 0.85)),
                        Visibility::Hidden,
                    ))
                    .with_children(|banner| {
                        banner.spawn((
                            SurfaceText(Surface::Warning),
                            Text::new(""),
                            TextFont {
                                font: font.clone(),
                                font_size: 20.0,
                                ..default()
                            },
                            TextColor(Color::srgb(1.0, 0.9, 0.8)),
                        ));
                        banner.spawn((
                            Text::new("[Esc] dismiss"),
                            TextFont {
                                font: font.clone(),
                                font_size: 12.0,
                                ..default()
                            },
                            TextColor(Color::srgba(1.0, 0.9, 0.8, 0.7)),
                        ));
                    });

                    // Spacer so the banner stays centred.
                    top.spawn(Node {
                        width: Val::Px(80.0),
                        ..default()
                    });
                });

            // ─── INTERACTION PROMPT: bottom centre ───
            parent.spawn((
                HudInteractionPrompt,
                SurfaceNode(Surface::Prompt),
                SurfaceText(Surface::Prompt),
                Text::new(""),
                TextFont {
                    font: font.clone(),
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 0.95, 0.7)),
                Node {
                    margin: UiRect::bottom(Val::Px(24.0)),
                    ..default()
                },
                Visibility::Hidden,
            ));
        });

    presentation.register_surface(Surface::Clock);
    presentation.register_surface(Surface::Warning);
    presentation.register_surface(Surface::Prompt);
}
