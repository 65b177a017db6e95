use bevy::prelude::*;
use crate::dialogue::DialoguePhase;
use crate::flow::GameFlow;
use crate::shared::*;
use super::{SurfaceNode, SurfaceText, UiFontHandle};

// ═══════════════════════════════════════════════════════════════════════
// MARKER COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component)]
pub struct DialogueBoxRoot;

#[derive(Component)]
pub struct DialogueNpcName;

#[derive(Component)]
pub struct DialogueText;

#[derive(Component)]
pub struct DialoguePrompt;

// ═══════════════════════════════════════════════════════════════════════
// SPAWN
// ═══════════════════════════════════════════════════════════════════════

pub fn spawn_dialogue_box(
    mut commands: Commands,
    font_handle: Res<UiFontHandle>,
    mut presentation: ResMut<Presentation>,
) {
    let font = font_handle.0.clone();

    commands
        .spawn((
            DialogueBoxRoot,
            SurfaceNode(Surface::Dialogue),
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                justify_content: JustifyContent::FlexEnd,
                align_items: AlignItems::Center,
                flex_direction: FlexDirection::Column,
                padding: UiRect::bottom(Val::Px(20.0)),
                ..default()
            },
            GlobalZIndex(10),
            Visibility::Hidden,
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    Node {
                        width: Val::Px(700.0),
                        min_height: Val::Px(150.0),
                        flex_direction: FlexDirection::Column,
                        padding: UiRect::all(Val::Px(16.0)),
                        row_gap: Val::Px(8.0),
                        border: UiRect::all(Val::Px(2.0)),
                        ..default()
                    },
                    BackgroundColor(Color::srgba(0.12, 0.08, 0.05, 0.92)),
                    BorderColor(Color::srgb(0.75, 0.55, 0.3)),
                ))
                .with_children(|panel| {
                    // Speaker name
                    panel.spawn((
                        DialogueNpcName,
                        SurfaceNode(Surface::Speaker),
                        SurfaceText(Surface::Speaker),
                        Text::new(""),
                        TextFont {
                            font: font.clone(),
                            font_size: 20.0,
                            ..default()
                        },
                        TextColor(Color::srgb(1.0, 0.85, 0.5)),
                    ));

                    // Revealed text
                    panel.spawn((
                        DialogueText,
                        SurfaceText(Surface::Dialogue),
                        Text::new(""),
                        TextFont {
                            font: font.clone(),
                            font_size: 18.0,
                            ..default()
                        },
                        TextColor(Color::WHITE),
                        Node {
                            flex_grow: 1.0,
                            ..default()
                        },
                    ));

                    // Continue hint, bottom-right
                    panel.spawn((
                        DialoguePrompt,
                        Text::new(""),
                        TextFont {
                            font: font.clone(),
                            font_size: 14.0,
                            ..default()
                        },
                        TextColor(Color::srgba(1.0, 1.0, 1.0, 0.6)),
                        Node {
                            align_self: AlignSelf::FlexEnd,
                            ..default()
                        },
                    ));
                });
        });

    presentation.register_surface(Surface::Dialogue);
    presentation.register_surface(Surface::Speaker);
}

// ═══════════════════════════════════════════════════════════════════════
// CONTINUE HINT
// ═══════════════════════════════════════════════════════════════════════

/// Shows what the next Space press does once the line is fully out.
pub fn update_continue_hint(
    flow: Res<GameFlow>,
    mut query: Query<&mut Text, With<DialoguePrompt>>,
) {
    if !flow.is_changed() {
        return;
    }
    let hint = match flow.dialogue() {
        Some(session) if session.phase() == DialoguePhase::LineComplete => {
            if session.is_last_line() {
                "[Space] Close"
            } else {
                "[Space] Continue"
            }
        }
        _ => "",
    };
    for mut text in &mut query {
        if text.0 != hint {
            text.0 = hint.to_string();
        }
    }
}
