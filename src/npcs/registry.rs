//! Interactable registry: the per-day NPC rosters and the house door.
//!
//! Entities are registered once at world load. The flow controller only
//! toggles `interactable`/`has_been_talked_to` through the roster-wide
//! operations below; the resolver only reads.

use bevy::prelude::*;

use crate::shared::*;

/// Index into the registry's entity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InteractableId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct NpcEntity {
    pub name: String,
    pub day: u32,
    pub dialogue_lines: Vec<String>,
    pub has_been_talked_to: bool,
    pub interactable: bool,
    pub position: Vec3,
}

impl NpcEntity {
    pub fn new(name: impl Into<String>, day: u32, position: Vec3, lines: Vec<String>) -> Self {
        Self {
            name: name.into(),
            day,
            dialogue_lines: lines,
            has_been_talked_to: false,
            interactable: true,
            position,
        }
    }

    pub fn from_def(def: &NpcDef) -> Self {
        Self::new(
            def.name.clone(),
            def.day,
            Vec3::from_array(def.position),
            def.lines.clone(),
        )
    }

    /// Talkable today: still interactable, not yet talked to, and the day is not over.
    pub fn is_eligible(&self, current_day: u32, must_go_home: bool) -> bool {
        self.interactable && !self.has_been_talked_to && !must_go_home && self.day == current_day
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoorEntity {
    pub position: Vec3,
    pub interact_distance: f32,
}

impl DoorEntity {
    pub fn from_def(def: &DoorDef) -> Self {
        Self {
            position: Vec3::from_array(def.position),
            interact_distance: def.interact_distance,
        }
    }

    /// Only once the player must go home, and only within `interact_distance`.
    pub fn can_enter(&self, player: Vec3, must_go_home: bool) -> bool {
        must_go_home && player.distance(self.position) <= self.interact_distance
    }
}

/// Closed set of things the player can interact with.
#[derive(Debug, Clone, PartialEq)]
pub enum Interactable {
    Npc(NpcEntity),
    Door(DoorEntity),
}

impl Interactable {
    pub fn position(&self) -> Vec3 {
        match self {
            Interactable::Npc(npc) => npc.position,
            Interactable::Door(door) => door.position,
        }
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct InteractableRegistry {
    entries: Vec<Interactable>,
    day1: Vec<InteractableId>,
    day2: Vec<InteractableId>,
    door: Option<InteractableId>,
}

impl InteractableRegistry {
    /// Files an NPC into the roster for `npc.day`. Only the first-day
    /// roster starts out interactable.
    pub fn register_npc(&mut self, mut npc: NpcEntity) -> Result<InteractableId, FlowError> {
        let id = InteractableId(self.entries.len());
        let roster = match npc.day {
            1 => &mut self.day1,
            2 => &mut self.day2,
            other => {
                return Err(FlowError::InvalidInput(format!(
                    "NPC {} assigned to day {}, only days 1 and 2 have rosters",
                    npc.name, other
                )))
            }
        };
        roster.push(id);
        npc.interactable = npc.day == FIRST_DAY;
        debug!("[Registry] {} registered for day {}", npc.name, npc.day);
        self.entries.push(Interactable::Npc(npc));
        Ok(id)
    }

    /// Installs the house door. There is only one; a second registration
    /// replaces the first.
    pub fn register_door(&mut self, door: DoorEntity) -> InteractableId {
        if let Some(existing) = self.door {
            warn!("[Registry] door registered twice, replacing the earlier one");
            self.entries[existing.0] = Interactable::Door(door);
            return existing;
        }
        let id = InteractableId(self.entries.len());
        self.entries.push(Interactable::Door(door));
        self.door = Some(id);
        id
    }

    pub fn get(&self, id: InteractableId) -> Option<&Interactable> {
        self.entries.get(id.0)
    }

    pub fn npc(&self, id: InteractableId) -> Option<&NpcEntity> {
        match self.entries.get(id.0) {
            Some(Interactable::Npc(npc)) => Some(npc),
            _ => None,
        }
    }

    pub fn npc_mut(&mut self, id: InteractableId) -> Option<&mut NpcEntity> {
        match self.entries.get_mut(id.0) {
            Some(Interactable::Npc(npc)) => Some(npc),
            _ => None,
        }
    }

    pub fn npcs(&self) -> impl Iterator<Item = (InteractableId, &NpcEntity)> {
        self.entries.iter().enumerate().filter_map(|(i, entry)| match entry {
            Interactable::Npc(npc) => Some((InteractableId(i), npc)),
            Interactable::Door(_) => None,
        })
    }

    pub fn door(&self) -> Option<&DoorEntity> {
        match self.door.and_then(|id| self.entries.get(id.0)) {
            Some(Interactable::Door(door)) => Some(door),
            _ => None,
        }
    }

    pub fn roster(&self, day: u32) -> &[InteractableId] {
        match day {
            1 => self.day1.as_slice(),
            2 => self.day2.as_slice(),
            _ => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// World query: every interactable within `radius` of `point`, with its
    /// distance.
    pub fn within_radius(
        &self,
        point: Vec3,
        radius: f32,
    ) -> impl Iterator<Item = (InteractableId, &Interactable, f32)> {
        self.entries.iter().enumerate().filter_map(move |(i, entry)| {
            let distance = point.distance(entry.position());
            (distance <= radius).then_some((InteractableId(i), entry, distance))
        })
    }

    /// Locks every NPC of `day` that the player has not talked to yet.
    pub fn disable_all(&mut self, day: u32) {
        let ids = self.roster(day).to_vec();
        let mut disabled = 0;
        for id in ids {
            if let Some(npc) = self.npc_mut(id) {
                if !npc.has_been_talked_to {
                    npc.interactable = false;
                    disabled += 1;
                }
            }
        }
        info!("[Registry] disabled {} untalked NPC(s) for day {}", disabled, day);
    }

    /// Retires the day-1 roster and wakes up the day-2 roster. Takes
    /// `&mut self` for the whole swap so no reader sees half of it.
    pub fn reset_for_day_transition(&mut self) {
        for id in self.day1.clone() {
            if let Some(npc) = self.npc_mut(id) {
                npc.has_been_talked_to = false;
                npc.interactable = false;
            }
        }
        for id in self.day2.clone() {
            if let Some(npc) = self.npc_mut(id) {
                npc.has_been_talked_to = false;
                npc.interactable = true;
            }
        }
        info!(
            "[Registry] day transition: {} day-1 NPC(s) retired, {} day-2 NPC(s) active",
            self.day1.len(),
            self.day2.len()
        );
    }

    /// Builds the registry from authored story data. Bad entries are
    /// logged and skipped.
    pub fn from_story(story: &StoryConfig) -> Self {
        let mut registry = Self::default();
        for def in &story.npcs {
            if let Err(err) = registry.register_npc(NpcEntity::from_def(def)) {
                log_flow_error("Registry", &err);
            }
        }
        match &story.door {
            Some(door) => {
                registry.register_door(DoorEntity::from_def(door));
            }
            None => warn!("[Registry] story has no door; the player cannot sleep"),
        }
        registry
    }
}
