//! NPC spawning: one placeholder sprite per registered interactable.
//! Sprites only mirror the registry; they never decide eligibility.

use bevy::prelude::*;
use crate::flow::GameFlow;
use crate::shared::*;
use super::{Interactable, InteractableId, InteractableRegistry};

/// Side of an NPC square, in pixels.
const NPC_SIZE: f32 = 24.0;
const DOOR_SIZE: Vec2 = Vec2::new(32.0, 40.0);

const NPC_PALETTE: [Color; 5] = [
    Color::srgb(0.85, 0.45, 0.35),
    Color::srgb(0.55, 0.7, 0.4),
    Color::srgb(0.9, 0.75, 0.35),
    Color::srgb(0.6, 0.5, 0.8),
    Color::srgb(0.4, 0.7, 0.75),
];

/// Links a sprite back to its registry entry.
#[derive(Component, Debug, Clone, Copy)]
pub struct NpcSprite(pub InteractableId);

#[derive(Component, Debug, Clone, Copy)]
pub struct DoorSprite;

/// System: on entering Playing state, spawn a sprite for every NPC of
/// every day plus the door. Off-day NPCs start hidden.
pub fn spawn_interactables(
    mut commands: Commands,
    registry: Res<InteractableRegistry>,
    flow: Res<GameFlow>,
    existing: Query<Entity, Or<(With<NpcSprite>, With<DoorSprite>)>>,
) {
    if !existing.is_empty() {
        return;
    }

    let mut spawned = 0;
    for (id, npc) in registry.npcs() {
        let color = NPC_PALETTE[id.0 % NPC_PALETTE.len()];
        commands.spawn((
            NpcSprite(id),
            WorldPosition(npc.position),
            Sprite {
                color,
                custom_size: Some(Vec2::splat(NPC_SIZE)),
                ..default()
            },
            Transform::from_translation(world_to_screen(npc.position).extend(5.0)),
            visibility_for_day(npc.day, flow.current_day()),
        ));
        spawned += 1;
    }

    if let Some(door) = registry.door() {
        commands.spawn((
            DoorSprite,
            WorldPosition(door.position),
            Sprite {
                color: Color::srgb(0.45, 0.3, 0.18),
                custom_size: Some(DOOR_SIZE),
                ..default()
            },
            Transform::from_translation(world_to_screen(door.position).extend(2.0)),
            Visibility::default(),
        ));
    }
    info!("[Npc] spawned {} NPC sprite(s)", spawned);
}

/// System: on a new day, show that day's roster and hide the rest.
pub fn refresh_roster_on_new_day(
    mut events: EventReader<DayStartedEvent>,
    registry: Res<InteractableRegistry>,
    mut query: Query<(&NpcSprite, &mut Visibility)>,
) {
    let Some(event) = events.read().last() else {
        return;
    };
    for (sprite, mut visibility) in &mut query {
        if let Some(Interactable::Npc(npc)) = registry.get(sprite.0) {
            *visibility = visibility_for_day(npc.day, event.day);
        }
    }
    debug!("[Npc] roster refreshed for day {}", event.day);
}

/// System: dim NPCs that can no longer be talked to.
pub fn tint_unavailable_npcs(
    registry: Res<InteractableRegistry>,
    mut query: Query<(&NpcSprite, &mut Sprite)>,
) {
    if !registry.is_changed() {
        return;
    }
    for (&NpcSprite(id), mut sprite) in &mut query {
        let Some(npc) = registry.npc(id) else {
            continue;
        };
        let base = NPC_PALETTE[id.0 % NPC_PALETTE.len()];
        let available = npc.interactable && !npc.has_been_talked_to;
        sprite.color = if available { base } else { base.with_alpha(0.45) };
    }
}

fn visibility_for_day(npc_day: u32, current_day: u32) -> Visibility {
    if npc_day == current_day {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    }
}
