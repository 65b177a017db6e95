//! Full-screen story cards: the intro shown before day 1 and the ending
//! revealed by the ending sequence.

use bevy::prelude::*;
use crate::shared::*;
use super::{SurfaceNode, SurfaceText, UiFontHandle};

#[derive(Component)]
pub struct IntroScreenRoot;

#[derive(Component)]
pub struct EndingScreenRoot;

pub fn spawn_intro_screen(
    mut commands: Commands,
    font_handle: Res<UiFontHandle>,
    mut presentation: ResMut<Presentation>,
) {
    spawn_story_card(
        &mut commands,
        &font_handle.0,
        IntroScreenRoot,
        Surface::Intro,
        "Press Enter to begin",
    );
    presentation.register_surface(Surface::Intro);
}

pub fn spawn_ending_screen(
    mut commands: Commands,
    font_handle: Res<UiFontHandle>,
    mut presentation: ResMut<Presentation>,
) {
    spawn_story_card(
        &mut commands,
        &font_handle.0,
        EndingScreenRoot,
        Surface::Ending,
        "Thank you for playing",
    );
    presentation.register_surface(Surface::Ending);
}

/// Black card with centred story text and a small footer line.
fn spawn_story_card(
    commands: &mut Commands,
    font: &Handle<Font>,
    marker: impl Component,
    surface: Surface,
    footer: &str,
) {
    commands
        .spawn((
            marker,
            SurfaceNode(surface),
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(32.0),
                padding: UiRect::all(Val::Px(80.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.92)),
            GlobalZIndex(50),
            Visibility::Hidden,
        ))
        .with_children(|card| {
            card.spawn((
                SurfaceText(surface),
                Text::new(""),
                TextFont {
                    font: font.clone(),
                    font_size: 26.0,
                    ..default()
                },
                TextColor(Color::srgb(0.95, 0.9, 0.8)),
                TextLayout::new_with_justify(JustifyText::Center),
            ));
            card.spawn((
                Text::new(footer),
                TextFont {
                    font: font.clone(),
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgba(0.95, 0.9, 0.8, 0.6)),
            ));
        });
}
