//! Interaction resolver (E key).
//!
//! Stateless: every call looks at the player's position and the registry
//! flags as they are right now, picks one target, and hands it to the flow.

use bevy::prelude::*;

use crate::flow::GameFlow;
use crate::npcs::{Interactable, InteractableId, InteractableRegistry};
use crate::shared::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionTarget {
    Npc(InteractableId),
    Door,
}

/// Gathers every candidate within `radius` that passes its eligibility
/// check and picks one with `choose_target`.
pub fn resolve_interaction(
    player: Vec3,
    radius: f32,
    registry: &InteractableRegistry,
    current_day: u32,
    must_go_home: bool,
) -> Option<InteractionTarget> {
    let eligible = registry
        .within_radius(player, radius)
        .filter_map(|(id, entry, distance)| match entry {
            Interactable::Npc(npc) if npc.is_eligible(current_day, must_go_home) => {
                Some((InteractionTarget::Npc(id), distance))
            }
            Interactable::Door(door) if door.can_enter(player, must_go_home) => {
                Some((InteractionTarget::Door, distance))
            }
            _ => None,
        });
    choose_target(eligible)
}

/// The closest eligible NPC, or failing that the closest door. An NPC
/// always wins over the door, even when the door is nearer.
pub fn choose_target(
    eligible: impl IntoIterator<Item = (InteractionTarget, f32)>,
) -> Option<InteractionTarget> {
    let mut best_npc: Option<(InteractionTarget, f32)> = None;
    let mut best_door: Option<(InteractionTarget, f32)> = None;

    for (target, distance) in eligible {
        let slot = match target {
            InteractionTarget::Npc(_) => &mut best_npc,
            InteractionTarget::Door => &mut best_door,
        };
        if slot.map_or(true, |(_, d)| distance < d) {
            *slot = Some((target, distance));
        }
    }

    best_npc.or(best_door).map(|(target, _)| target)
}

/// Resolves and invokes the target under the player. `Ok(None)` means
/// nothing was in reach.
pub fn try_interact(
    player: Vec3,
    flow: &mut GameFlow,
    registry: &mut InteractableRegistry,
    presentation: &mut Presentation,
) -> Result<Option<InteractionTarget>, FlowError> {
    if !flow.can_interact() || flow.in_dialogue() {
        return Err(FlowError::PreconditionViolation("interaction not allowed now"));
    }

    let target = resolve_interaction(
        player,
        flow.settings().interact_radius,
        registry,
        flow.current_day(),
        flow.must_go_home(),
    );

    match target {
        Some(InteractionTarget::Npc(id)) => talk_to_npc(id, flow, registry, presentation)?,
        Some(InteractionTarget::Door) => flow.sleep(presentation)?,
        None => debug!("[Interact] nothing in reach at {:?}", player),
    }
    Ok(target)
}

/// Starts the NPC's dialogue, then marks it talked to. A dialogue that
/// fails to start leaves the NPC untouched so it can be retried.
fn talk_to_npc(
    id: InteractableId,
    flow: &mut GameFlow,
    registry: &mut InteractableRegistry,
    presentation: &mut Presentation,
) -> Result<(), FlowError> {
    let npc = registry
        .npc(id)
        .ok_or(FlowError::ConfigurationMissing("npc entry"))?;
    let name = npc.name.clone();
    let lines = npc.dialogue_lines.clone();

    flow.start_dialogue(&name, lines, presentation)?;

    if let Some(npc) = registry.npc_mut(id) {
        npc.has_been_talked_to = true;
    }
    info!("[Interact] talking to {}", name);
    Ok(())
}

/// Text for the on-screen prompt naming what E would do.
pub fn prompt_label(target: InteractionTarget, registry: &InteractableRegistry) -> String {
    match target {
        InteractionTarget::Npc(id) => match registry.npc(id) {
            Some(npc) => format!("[E] Talk to {}", npc.name),
            None => "[E] Talk".to_string(),
        },
        InteractionTarget::Door => "[E] Sleep".to_string(),
    }
}

/// Shows the interaction prompt while something is in reach.
pub fn update_interaction_prompt(
    flow: Res<GameFlow>,
    registry: Res<InteractableRegistry>,
    player: Query<&WorldPosition, With<Player>>,
    mut presentation: ResMut<Presentation>,
) {
    let target = match player.get_single() {
        Ok(position) if flow.can_interact() && flow.mode() == FlowMode::FreeRoam => {
            resolve_interaction(
                position.0,
                flow.settings().interact_radius,
                &registry,
                flow.current_day(),
                flow.must_go_home(),
            )
        }
        _ => None,
    };

    match target {
        Some(target) => {
            let label = prompt_label(target, &registry);
            if presentation.text(Surface::Prompt) != label {
                presentation.show_text(Surface::Prompt, label);
            }
            if !presentation.is_visible(Surface::Prompt) {
                presentation.set_visible(Surface::Prompt, true);
            }
        }
        None => {
            if presentation.is_visible(Surface::Prompt) {
                presentation.set_visible(Surface::Prompt, false);
            }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
