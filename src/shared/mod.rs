//! Shared components, resources, events, and states for Duskfall.
//!
//! This is the type contract. Anything that crosses a domain boundary
//! (story data, the presentation surface, input, flow events, errors)
//! is declared here so plugins agree on one shape.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Pixels drawn per world unit on the top-down view.
pub const PIXEL_SCALE: f32 = 32.0;
pub const SCREEN_WIDTH: f32 = 1280.0;
pub const SCREEN_HEIGHT: f32 = 720.0;

/// The story starts on this day; NPCs assigned to it are interactable at load.
pub const FIRST_DAY: u32 = 1;
/// Day on which the game can end.
pub const FINAL_DAY: u32 = 2;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE: engine-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
}

/// Story-level mode. Derived from the flow flags, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowMode {
    Intro,
    FreeRoam,
    Dialogue,
    Sleeping,
    Ended,
}

// ═══════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("missing configuration: {0}")]
    ConfigurationMissing(&'static str),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("precondition not met: {0}")]
    PreconditionViolation(&'static str),
}

/// Logs a flow error at the level its kind calls for. Precondition
/// violations are expected (callers gate on the same predicates) and only
/// show up at debug level.
pub fn log_flow_error(context: &str, err: &FlowError) {
    match err {
        FlowError::PreconditionViolation(_) => debug!("[{}] ignored: {}", context, err),
        FlowError::ConfigurationMissing(_) => error!("[{}] {}", context, err),
        FlowError::InvalidInput(_) => warn!("[{}] {}", context, err),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// STORY DATA: authored in assets/story.ron
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowSettings {
    /// Real seconds from dawn to the dusk cutoff.
    pub day_duration: f32,
    /// Fraction of the day after which the player must go home.
    pub evening_fraction: f32,
    pub required_conversations_day1: u32,
    pub required_conversations_day2: u32,
    pub fade_duration: f32,
    pub settle_duration: f32,
    /// Seconds between revealed characters.
    pub reveal_interval: f32,
    pub ending_camera_delay: f32,
    pub ending_reveal_delay: f32,
    /// Radius of the candidate search around the player.
    pub interact_radius: f32,
    /// Height of the overhead ending shot above its focal point.
    pub camera_height: f32,
    pub village_center: Option<[f32; 3]>,
    pub player_speed: f32,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            day_duration: 300.0,
            evening_fraction: 0.7,
            required_conversations_day1: 2,
            required_conversations_day2: 2,
            fade_duration: 1.0,
            settle_duration: 0.5,
            reveal_interval: 0.05,
            ending_camera_delay: 0.5,
            ending_reveal_delay: 1.0,
            interact_radius: 3.0,
            camera_height: 20.0,
            village_center: None,
            player_speed: 5.0,
        }
    }
}

impl FlowSettings {
    pub fn village_center(&self) -> Option<Vec3> {
        self.village_center.map(Vec3::from_array)
    }

    /// Conversations needed to close out `day`, if that day has a quota.
    pub fn required_conversations(&self, day: u32) -> Option<u32> {
        match day {
            1 => Some(self.required_conversations_day1),
            2 => Some(self.required_conversations_day2),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcDef {
    pub name: String,
    pub day: u32,
    pub position: [f32; 3],
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorDef {
    pub position: [f32; 3],
    #[serde(default = "default_door_distance")]
    pub interact_distance: f32,
}

fn default_door_distance() -> f32 {
    2.0
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryConfig {
    pub settings: FlowSettings,
    pub intro_text: String,
    pub warning_text: String,
    pub ending_text: String,
    pub player_start: [f32; 3],
    pub door: Option<DoorDef>,
    pub npcs: Vec<NpcDef>,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            settings: FlowSettings::default(),
            intro_text: "The village is quiet. Too quiet.".to_string(),
            warning_text: "Evening is falling! Head home.".to_string(),
            ending_text: String::new(),
            player_start: [0.0, 0.0, 0.0],
            door: None,
            npcs: Vec::new(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PRESENTATION SURFACE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Intro,
    Warning,
    Dialogue,
    Speaker,
    Clock,
    Fade,
    Ending,
    Prompt,
}

impl Surface {
    pub const ALL: [Surface; 8] = [
        Surface::Intro,
        Surface::Warning,
        Surface::Dialogue,
        Surface::Speaker,
        Surface::Clock,
        Surface::Fade,
        Surface::Ending,
        Surface::Prompt,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

/// What the player should currently see. The flow writes it; the UI
/// plugin mirrors it into Bevy nodes. A surface only exists once the UI
/// (or a test) has registered it.
#[derive(Resource, Debug, Clone, Default)]
pub struct Presentation {
    available: HashSet<Surface>,
    visible: HashSet<Surface>,
    texts: HashMap<Surface, String>,
    screen_opacity: f32,
    camera_pose: Option<CameraPose>,
}

impl Presentation {
    /// A presentation with every surface registered. Used by headless runs.
    pub fn with_all_surfaces() -> Self {
        let mut presentation = Self::default();
        for surface in Surface::ALL {
            presentation.register_surface(surface);
        }
        presentation
    }

    pub fn register_surface(&mut self, surface: Surface) {
        self.available.insert(surface);
    }

    pub fn is_available(&self, surface: Surface) -> bool {
        self.available.contains(&surface)
    }

    pub fn show_text(&mut self, surface: Surface, text: impl Into<String>) {
        self.texts.insert(surface, text.into());
    }

    pub fn text(&self, surface: Surface) -> &str {
        self.texts.get(&surface).map(String::as_str).unwrap_or("")
    }

    pub fn set_visible(&mut self, surface: Surface, visible: bool) {
        if visible {
            self.visible.insert(surface);
        } else {
            self.visible.remove(&surface);
        }
    }

    pub fn is_visible(&self, surface: Surface) -> bool {
        self.visible.contains(&surface)
    }

    pub fn set_screen_opacity(&mut self, alpha: f32) {
        self.screen_opacity = alpha.clamp(0.0, 1.0);
    }

    pub fn screen_opacity(&self) -> f32 {
        self.screen_opacity
    }

    pub fn set_camera_pose(&mut self, position: Vec3, look_at: Vec3) {
        self.camera_pose = Some(CameraPose { position, look_at });
    }

    pub fn camera_pose(&self) -> Option<CameraPose> {
        self.camera_pose
    }
}

// ═══════════════════════════════════════════════════════════════════════
// INPUT
// ═══════════════════════════════════════════════════════════════════════

/// Per-frame game actions. Rebuilt from hardware input every PreUpdate.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerInput {
    pub move_axis: Vec2,
    pub interact: bool,
    pub advance: bool,
    pub skip: bool,
    pub dismiss: bool,
}

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputContext {
    #[default]
    Disabled,
    Intro,
    Gameplay,
    Dialogue,
    Ending,
}

#[derive(Resource, Debug, Clone)]
pub struct KeyBindings {
    pub move_up: KeyCode,
    pub move_down: KeyCode,
    pub move_left: KeyCode,
    pub move_right: KeyCode,
    pub interact: KeyCode,
    pub advance: KeyCode,
    pub skip: KeyCode,
    pub dismiss: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_up: KeyCode::KeyW,
            move_down: KeyCode::KeyS,
            move_left: KeyCode::KeyA,
            move_right: KeyCode::KeyD,
            interact: KeyCode::KeyE,
            advance: KeyCode::Space,
            skip: KeyCode::Enter,
            dismiss: KeyCode::Escape,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component, Debug, Clone, Default)]
pub struct Player;

/// Position on the story's ground plane (x/z, y up). Sprites are drawn
/// from it; the resolver measures distances with it.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct WorldPosition(pub Vec3);

/// Maps a ground-plane position onto the top-down screen.
pub fn world_to_screen(position: Vec3) -> Vec2 {
    Vec2::new(position.x, -position.z) * PIXEL_SCALE
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS: cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MustGoHomeCause {
    Evening,
    ConversationsDone,
}

#[derive(Event, Debug, Clone)]
pub struct MustGoHomeEvent {
    pub day: u32,
    pub cause: MustGoHomeCause,
}

#[derive(Event, Debug, Clone)]
pub struct DialogueStartEvent {
    pub speaker: String,
}

#[derive(Event, Debug, Clone)]
pub struct DialogueEndEvent {
    pub speaker: String,
    pub conversations_completed: u32,
}

/// Sent when the day counter changes inside the sleep sequence.
#[derive(Event, Debug, Clone)]
pub struct DayStartedEvent {
    pub day: u32,
}

#[derive(Event, Debug, Clone)]
pub struct GameEndedEvent;
