//! The flow controller: owns every story flag, the clock, the active
//! dialogue session and the running timed sequence.
//!
//! Every mutation of story state goes through a `GameFlow` method. Bevy
//! systems only call in here and turn the queued notices into events.

use bevy::prelude::*;

use super::sequence::{FlowSequence, FlowStep, SequenceKind};
use crate::calendar::DayClock;
use crate::dialogue::{DialogueProgress, DialogueSession};
use crate::npcs::InteractableRegistry;
use crate::shared::*;

const DEFAULT_ENDING_TEXT: &str = "The End";

/// Something observable happened inside the flow this tick.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowNotice {
    MustGoHome { day: u32, cause: MustGoHomeCause },
    DialogueStarted { speaker: String },
    DialogueEnded { speaker: String, conversations_completed: u32 },
    DayStarted { day: u32 },
    GameEnded,
}

#[derive(Resource, Debug, Clone)]
pub struct GameFlow {
    settings: FlowSettings,
    clock: DayClock,
    intro_active: bool,
    can_interact: bool,
    must_go_home: bool,
    in_dialogue: bool,
    sleeping: bool,
    game_ended: bool,
    movement_enabled: bool,
    conversations_completed: u32,
    dialogue: Option<DialogueSession>,
    speaker: Option<String>,
    sequence: Option<FlowSequence>,
    warning_text: String,
    ending_text: String,
    notices: Vec<FlowNotice>,
}

impl Default for GameFlow {
    fn default() -> Self {
        Self::from_story(&StoryConfig::default())
    }
}

impl GameFlow {
    pub fn new(settings: FlowSettings) -> Self {
        Self {
            settings,
            clock: DayClock::default(),
            intro_active: true,
            can_interact: false,
            must_go_home: false,
            in_dialogue: false,
            sleeping: false,
            game_ended: false,
            movement_enabled: true,
            conversations_completed: 0,
            dialogue: None,
            speaker: None,
            sequence: None,
            warning_text: String::new(),
            ending_text: String::new(),
            notices: Vec::new(),
        }
    }

    pub fn from_story(story: &StoryConfig) -> Self {
        let mut flow = Self::new(story.settings.clone());
        flow.warning_text = story.warning_text.clone();
        flow.ending_text = story.ending_text.clone();
        flow
    }

    // ─── Read access ─────────────────────────────────────────────────────

    pub fn settings(&self) -> &FlowSettings {
        &self.settings
    }

    pub fn current_day(&self) -> u32 {
        self.clock.day
    }

    pub fn time_of_day(&self) -> f64 {
        self.clock.time_of_day()
    }

    pub fn clock(&self) -> &DayClock {
        &self.clock
    }

    pub fn intro_active(&self) -> bool {
        self.intro_active
    }

    pub fn can_interact(&self) -> bool {
        self.can_interact
    }

    pub fn must_go_home(&self) -> bool {
        self.must_go_home
    }

    pub fn in_dialogue(&self) -> bool {
        self.in_dialogue
    }

    pub fn sleeping(&self) -> bool {
        self.sleeping
    }

    pub fn game_ended(&self) -> bool {
        self.game_ended
    }

    pub fn movement_enabled(&self) -> bool {
        self.movement_enabled
    }

    pub fn conversations_completed(&self) -> u32 {
        self.conversations_completed
    }

    pub fn dialogue(&self) -> Option<&DialogueSession> {
        self.dialogue.as_ref()
    }

    pub fn speaker(&self) -> Option<&str> {
        self.speaker.as_deref()
    }

    pub fn sequence_kind(&self) -> Option<SequenceKind> {
        self.sequence.as_ref().map(FlowSequence::kind)
    }

    /// Top-level mode, derived from the flags. Ended wins over everything.
    pub fn mode(&self) -> FlowMode {
        if self.game_ended {
            FlowMode::Ended
        } else if self.intro_active {
            FlowMode::Intro
        } else if self.sleeping {
            FlowMode::Sleeping
        } else if self.in_dialogue {
            FlowMode::Dialogue
        } else {
            FlowMode::FreeRoam
        }
    }

    pub fn time_flows(&self) -> bool {
        !self.intro_active && !self.game_ended && !self.sleeping && !self.in_dialogue
    }

    /// The player may walk around: free roam with movement not locked.
    pub fn player_can_move(&self) -> bool {
        self.movement_enabled && self.mode() == FlowMode::FreeRoam
    }

    pub fn drain_notices(&mut self) -> Vec<FlowNotice> {
        std::mem::take(&mut self.notices)
    }

    // ─── Intro ───────────────────────────────────────────────────────────

    pub fn show_intro(&mut self, presentation: &mut Presentation, text: &str) {
        if !self.intro_active {
            return;
        }
        if !presentation.is_available(Surface::Intro) {
            log_flow_error("Flow", &FlowError::ConfigurationMissing("intro surface"));
            return;
        }
        presentation.show_text(Surface::Intro, text);
        presentation.set_visible(Surface::Intro, true);
    }

    pub fn skip_intro(&mut self, presentation: &mut Presentation) {
        if !self.intro_active {
            return;
        }
        self.intro_active = false;
        self.can_interact = true;
        presentation.set_visible(Surface::Intro, false);
        info!("[Flow] intro dismissed, day {} begins", self.clock.day);
    }

    // ─── Clock ───────────────────────────────────────────────────────────

    /// Advances the clock while time flows and fires the evening warning
    /// once. The clock label is refreshed regardless.
    pub fn tick_clock(
        &mut self,
        dt: f32,
        registry: &mut InteractableRegistry,
        presentation: &mut Presentation,
    ) {
        if self.time_flows() {
            self.clock.advance(dt, self.settings.day_duration);
            if self.clock.is_evening(self.settings.evening_fraction) {
                self.trigger_must_go_home(MustGoHomeCause::Evening, registry, presentation);
            }
        }
        presentation.show_text(Surface::Clock, self.clock.clock_label());
    }

    /// Sets the must-go-home flag for the rest of the day, shows the
    /// warning and locks every untalked NPC of today. Returns false if the
    /// flag was already set.
    pub fn trigger_must_go_home(
        &mut self,
        cause: MustGoHomeCause,
        registry: &mut InteractableRegistry,
        presentation: &mut Presentation,
    ) -> bool {
        if self.must_go_home {
            return false;
        }
        self.must_go_home = true;

        if presentation.is_available(Surface::Warning) {
            presentation.show_text(Surface::Warning, self.warning_text.as_str());
            presentation.set_visible(Surface::Warning, true);
        } else {
            log_flow_error("Flow", &FlowError::ConfigurationMissing("warning surface"));
        }
        registry.disable_all(self.clock.day);

        info!(
            "[Flow] must go home on day {} ({:?}) at {}",
            self.clock.day,
            cause,
            self.clock.clock_label()
        );
        self.notices.push(FlowNotice::MustGoHome {
            day: self.clock.day,
            cause,
        });
        true
    }

    pub fn hide_warning(&mut self, presentation: &mut Presentation) {
        presentation.set_visible(Surface::Warning, false);
    }

    // ─── Dialogue ────────────────────────────────────────────────────────

    pub fn start_dialogue(
        &mut self,
        speaker: &str,
        lines: Vec<String>,
        presentation: &mut Presentation,
    ) -> Result<(), FlowError> {
        if lines.is_empty() {
            return Err(FlowError::InvalidInput(format!(
                "{} has no dialogue lines",
                speaker
            )));
        }
        if !presentation.is_available(Surface::Dialogue) {
            return Err(FlowError::ConfigurationMissing("dialogue surface"));
        }
        if self.in_dialogue {
            return Err(FlowError::PreconditionViolation("already in dialogue"));
        }
        if self.sleeping || self.game_ended {
            return Err(FlowError::PreconditionViolation("dialogue outside free roam"));
        }

        let mut session = DialogueSession::new(self.settings.reveal_interval);
        session.start(lines)?;

        presentation.show_text(Surface::Dialogue, session.revealed_text());
        presentation.set_visible(Surface::Dialogue, true);
        if presentation.is_available(Surface::Speaker) {
            presentation.show_text(Surface::Speaker, speaker);
            presentation.set_visible(Surface::Speaker, true);
        }

        self.in_dialogue = true;
        self.dialogue = Some(session);
        self.speaker = Some(speaker.to_string());
        info!("[Flow] dialogue started with {}", speaker);
        self.notices.push(FlowNotice::DialogueStarted {
            speaker: speaker.to_string(),
        });
        Ok(())
    }

    /// Feeds the advance trigger to the active session. Finishing the last
    /// line ends the dialogue.
    pub fn advance_dialogue(
        &mut self,
        registry: &mut InteractableRegistry,
        presentation: &mut Presentation,
    ) -> Result<DialogueProgress, FlowError> {
        if !self.in_dialogue {
            return Err(FlowError::PreconditionViolation("no dialogue to advance"));
        }
        let Some(session) = self.dialogue.as_mut() else {
            return Err(FlowError::ConfigurationMissing("dialogue session"));
        };

        let progress = session.advance();
        match progress {
            DialogueProgress::Snapped | DialogueProgress::NextLine => {
                presentation.show_text(Surface::Dialogue, session.revealed_text());
            }
            DialogueProgress::Finished => self.end_dialogue(registry, presentation)?,
            DialogueProgress::Ignored => {}
        }
        Ok(progress)
    }

    pub fn tick_dialogue(&mut self, dt: f32, presentation: &mut Presentation) {
        let Some(session) = self.dialogue.as_mut() else {
            return;
        };
        if session.tick(dt) {
            presentation.show_text(Surface::Dialogue, session.revealed_text());
        }
    }

    /// Closes the active dialogue and counts it. A second call for the same
    /// session finds no dialogue and counts nothing.
    pub fn end_dialogue(
        &mut self,
        registry: &mut InteractableRegistry,
        presentation: &mut Presentation,
    ) -> Result<(), FlowError> {
        if !self.in_dialogue {
            return Err(FlowError::PreconditionViolation("no dialogue to end"));
        }
        self.in_dialogue = false;
        self.dialogue = None;
        let speaker = self.speaker.take().unwrap_or_default();
        presentation.set_visible(Surface::Dialogue, false);
        presentation.set_visible(Surface::Speaker, false);

        self.conversations_completed += 1;
        info!(
            "[Flow] dialogue with {} ended ({} conversation(s) today)",
            speaker, self.conversations_completed
        );
        self.notices.push(FlowNotice::DialogueEnded {
            speaker,
            conversations_completed: self.conversations_completed,
        });

        let day = self.clock.day;
        let Some(required) = self.settings.required_conversations(day) else {
            return Ok(());
        };
        if self.conversations_completed < required {
            return Ok(());
        }
        if day == FINAL_DAY {
            self.end_game(presentation)
        } else {
            self.trigger_must_go_home(MustGoHomeCause::ConversationsDone, registry, presentation);
            Ok(())
        }
    }

    // ─── Sleep ───────────────────────────────────────────────────────────

    /// Starts the day transition. The day number only changes inside it.
    pub fn sleep(&mut self, presentation: &mut Presentation) -> Result<(), FlowError> {
        if self.sleeping {
            return Err(FlowError::PreconditionViolation("already sleeping"));
        }
        if self.game_ended || self.in_dialogue || self.sequence.is_some() {
            return Err(FlowError::PreconditionViolation("cannot sleep now"));
        }
        self.sleeping = true;
        self.can_interact = false;
        presentation.set_visible(Surface::Prompt, false);
        self.sequence = Some(FlowSequence::day_transition(&self.settings));
        info!("[Flow] sleeping at the end of day {}", self.clock.day);
        Ok(())
    }

    // ─── Ending ──────────────────────────────────────────────────────────

    pub fn end_game(&mut self, presentation: &mut Presentation) -> Result<(), FlowError> {
        if self.game_ended {
            return Err(FlowError::PreconditionViolation("game already ended"));
        }
        self.can_interact = false;
        self.game_ended = true;
        self.movement_enabled = false;
        presentation.set_visible(Surface::Prompt, false);
        presentation.set_visible(Surface::Warning, false);
        self.sequence = Some(FlowSequence::ending(&self.settings));
        info!("[Flow] the story ends on day {}", self.clock.day);
        self.notices.push(FlowNotice::GameEnded);
        Ok(())
    }

    pub fn skip_ending(&mut self, presentation: &mut Presentation) {
        presentation.set_visible(Surface::Ending, false);
    }

    // ─── Timed sequences ─────────────────────────────────────────────────

    /// Drives the running sequence by one frame. `player_position` is the
    /// fallback focal point for the ending shot.
    pub fn tick_sequence(
        &mut self,
        dt: f32,
        player_position: Option<Vec3>,
        registry: &mut InteractableRegistry,
        presentation: &mut Presentation,
    ) {
        let Some(sequence) = self.sequence.as_mut() else {
            return;
        };
        let step = sequence.tick(dt, presentation);
        if sequence.is_finished() {
            self.sequence = None;
        }
        match step {
            Some(FlowStep::AdvanceDay) => self.advance_day(registry),
            Some(FlowStep::Wake) => self.wake(presentation),
            Some(FlowStep::FrameVillage) => self.frame_village(player_position, presentation),
            Some(FlowStep::RevealEnding) => self.reveal_ending(presentation),
            Some(FlowStep::Fade { .. } | FlowStep::Wait(_)) | None => {}
        }
    }

    fn advance_day(&mut self, registry: &mut InteractableRegistry) {
        self.clock.roll_over();
        self.conversations_completed = 0;
        self.must_go_home = false;
        if self.clock.day == 2 {
            registry.reset_for_day_transition();
        }
        if self.clock.day > FINAL_DAY {
            warn!(
                "[Flow] day {} has no NPCs and no quota; the story cannot end from here",
                self.clock.day
            );
        }
        info!("[Flow] day {} dawns", self.clock.day);
        self.notices.push(FlowNotice::DayStarted {
            day: self.clock.day,
        });
    }

    fn wake(&mut self, presentation: &mut Presentation) {
        self.sleeping = false;
        self.can_interact = true;
        self.hide_warning(presentation);
        info!("[Flow] woke up on day {}", self.clock.day);
    }

    fn frame_village(&mut self, player_position: Option<Vec3>, presentation: &mut Presentation) {
        let Some(focal) = self.settings.village_center().or(player_position) else {
            log_flow_error("Flow", &FlowError::ConfigurationMissing("ending focal point"));
            return;
        };
        let eye = focal + Vec3::Y * self.settings.camera_height;
        presentation.set_camera_pose(eye, focal);
        debug!("[Flow] ending camera over {:?}", focal);
    }

    fn reveal_ending(&mut self, presentation: &mut Presentation) {
        if !presentation.is_available(Surface::Ending) {
            log_flow_error("Flow", &FlowError::ConfigurationMissing("ending surface"));
            return;
        }
        let text = if self.ending_text.is_empty() {
            DEFAULT_ENDING_TEXT
        } else {
            self.ending_text.as_str()
        };
        presentation.show_text(Surface::Ending, text);
        presentation.set_visible(Surface::Ending, true);
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::DialoguePhase;
    use crate::npcs::{DoorEntity, InteractableId, NpcEntity};

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    struct Fixture {
        flow: GameFlow,
        registry: InteractableRegistry,
        presentation: Presentation,
        day1: Vec<InteractableId>,
        day2: Vec<InteractableId>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut registry = InteractableRegistry::default();
            let day1 = vec![
                registry
                    .register_npc(NpcEntity::new("Ayla", 1, Vec3::new(2.0, 0.0, 0.0), lines(&["Hi."])))
                    .unwrap(),
                registry
                    .register_npc(NpcEntity::new("Berk", 1, Vec3::new(-2.0, 0.0, 0.0), lines(&["Yo."])))
                    .unwrap(),
                registry
                    .register_npc(NpcEntity::new("Cem", 1, Vec3::new(0.0, 0.0, 4.0), lines(&["Hm."])))
                    .unwrap(),
            ];
            let day2 = vec![
                registry
                    .register_npc(NpcEntity::new("Deniz", 2, Vec3::new(3.0, 0.0, 3.0), lines(&["Hey."])))
                    .unwrap(),
                registry
                    .register_npc(NpcEntity::new("Ece", 2, Vec3::new(-3.0, 0.0, 3.0), lines(&["Oh."])))
                    .unwrap(),
            ];
            registry.register_door(DoorEntity {
                position: Vec3::new(0.0, 0.0, -5.0),
                interact_distance: 2.0,
            });

            let mut story = StoryConfig::default();
            story.warning_text = "Go home.".to_string();
            let mut flow = GameFlow::from_story(&story);
            let mut presentation = Presentation::with_all_surfaces();
            flow.skip_intro(&mut presentation);

            Self {
                flow,
                registry,
                presentation,
                day1,
                day2,
            }
        }

        /// Starts a dialogue and presses advance until it closes.
        fn talk(&mut self, speaker: &str, script: &[&str]) {
            self.flow
                .start_dialogue(speaker, lines(script), &mut self.presentation)
                .unwrap();
            for _ in 0..100 {
                if !self.flow.in_dialogue() {
                    return;
                }
                self.flow
                    .advance_dialogue(&mut self.registry, &mut self.presentation)
                    .unwrap();
            }
            panic!("dialogue with {} never finished", speaker);
        }

        fn run_sequence(&mut self) {
            for _ in 0..1_000 {
                if self.flow.sequence_kind().is_none() {
                    return;
                }
                self.flow
                    .tick_sequence(0.1, Some(Vec3::ZERO), &mut self.registry, &mut self.presentation);
            }
            panic!("sequence never finished");
        }

        fn tick_clock(&mut self, dt: f32) {
            self.flow.tick_clock(dt, &mut self.registry, &mut self.presentation);
        }
    }

    #[test]
    fn test_new_flow_starts_in_intro() {
        let flow = GameFlow::default();
        assert_eq!(flow.mode(), FlowMode::Intro);
        assert!(!flow.can_interact());
        assert_eq!(flow.current_day(), 1);
        assert!(!flow.time_flows());
    }

    #[test]
    fn test_skip_intro_is_idempotent() {
        let mut flow = GameFlow::default();
        let mut presentation = Presentation::with_all_surfaces();
        flow.show_intro(&mut presentation, "Once upon a time");
        assert!(presentation.is_visible(Surface::Intro));

        flow.skip_intro(&mut presentation);
        flow.skip_intro(&mut presentation);
        assert!(!flow.intro_active());
        assert!(flow.can_interact());
        assert!(!presentation.is_visible(Surface::Intro));
        assert_eq!(flow.mode(), FlowMode::FreeRoam);
    }

    #[test]
    fn test_clock_frozen_during_intro() {
        let mut flow = GameFlow::default();
        let mut registry = InteractableRegistry::default();
        let mut presentation = Presentation::with_all_surfaces();
        flow.tick_clock(60.0, &mut registry, &mut presentation);
        assert_eq!(flow.time_of_day(), 0.0);
        assert_eq!(presentation.text(Surface::Clock), "00:00");
    }

    #[test]
    fn test_clock_frozen_during_dialogue() {
        let mut fx = Fixture::new();
        fx.tick_clock(30.0);
        let before = fx.flow.time_of_day();
        fx.flow
            .start_dialogue("Ayla", lines(&["Hello"]), &mut fx.presentation)
            .unwrap();
        fx.tick_clock(30.0);
        assert_eq!(fx.flow.time_of_day(), before);
    }

    #[test]
    fn test_evening_fires_must_go_home_once() {
        let mut fx = Fixture::new();
        for _ in 0..209 {
            fx.tick_clock(1.0);
        }
        assert!(!fx.flow.must_go_home());
        fx.tick_clock(1.0);
        assert!(fx.flow.must_go_home());
        assert!(fx.presentation.is_visible(Surface::Warning));
        assert_eq!(fx.presentation.text(Surface::Warning), "Go home.");

        for _ in 0..200 {
            fx.tick_clock(1.0);
        }
        let fired: Vec<_> = fx
            .flow
            .drain_notices()
            .into_iter()
            .filter(|n| matches!(n, FlowNotice::MustGoHome { .. }))
            .collect();
        assert_eq!(
            fired,
            vec![FlowNotice::MustGoHome {
                day: 1,
                cause: MustGoHomeCause::Evening
            }]
        );
        assert_eq!(fx.flow.time_of_day(), 1.0);
        assert_eq!(fx.presentation.text(Surface::Clock), "23:00");
    }

    #[test]
    fn test_dismissed_warning_does_not_clear_must_go_home() {
        let mut fx = Fixture::new();
        fx.tick_clock(250.0);
        fx.flow.hide_warning(&mut fx.presentation);
        fx.tick_clock(1.0);
        assert!(fx.flow.must_go_home());
        assert!(!fx.presentation.is_visible(Surface::Warning));
    }

    #[test]
    fn test_start_dialogue_rejects_empty_lines() {
        let mut fx = Fixture::new();
        let err = fx
            .flow
            .start_dialogue("Ayla", Vec::new(), &mut fx.presentation)
            .unwrap_err();
        assert!(matches!(err, FlowError::InvalidInput(_)));
        assert!(!fx.flow.in_dialogue());
        assert!(!fx.presentation.is_visible(Surface::Dialogue));
    }

    #[test]
    fn test_start_dialogue_requires_dialogue_surface() {
        let mut fx = Fixture::new();
        let mut bare = Presentation::default();
        let err = fx
            .flow
            .start_dialogue("Ayla", lines(&["Hi"]), &mut bare)
            .unwrap_err();
        assert_eq!(err, FlowError::ConfigurationMissing("dialogue surface"));
        assert!(!fx.flow.in_dialogue());
    }

    #[test]
    fn test_start_dialogue_shows_speaker_and_first_char() {
        let mut fx = Fixture::new();
        fx.flow
            .start_dialogue("Ayla", lines(&["Hello"]), &mut fx.presentation)
            .unwrap();
        assert_eq!(fx.flow.mode(), FlowMode::Dialogue);
        assert_eq!(fx.presentation.text(Surface::Speaker), "Ayla");
        assert_eq!(fx.presentation.text(Surface::Dialogue), "H");
        assert!(fx.presentation.is_visible(Surface::Dialogue));

        fx.flow.tick_dialogue(0.05, &mut fx.presentation);
        assert_eq!(fx.presentation.text(Surface::Dialogue), "He");
    }

    #[test]
    fn test_advance_snaps_then_finishes() {
        let mut fx = Fixture::new();
        fx.flow
            .start_dialogue("Ayla", lines(&["Hello there"]), &mut fx.presentation)
            .unwrap();

        let progress = fx
            .flow
            .advance_dialogue(&mut fx.registry, &mut fx.presentation)
            .unwrap();
        assert_eq!(progress, DialogueProgress::Snapped);
        assert_eq!(fx.presentation.text(Surface::Dialogue), "Hello there");
        assert_eq!(
            fx.flow.dialogue().map(DialogueSession::phase),
            Some(DialoguePhase::LineComplete)
        );

        let progress = fx
            .flow
            .advance_dialogue(&mut fx.registry, &mut fx.presentation)
            .unwrap();
        assert_eq!(progress, DialogueProgress::Finished);
        assert!(!fx.flow.in_dialogue());
        assert!(fx.flow.dialogue().is_none());
        assert!(!fx.presentation.is_visible(Surface::Dialogue));
        assert_eq!(fx.flow.conversations_completed(), 1);
    }

    #[test]
    fn test_end_dialogue_never_double_counts() {
        let mut fx = Fixture::new();
        fx.talk("Ayla", &["Hi."]);
        assert_eq!(fx.flow.conversations_completed(), 1);

        let again = fx.flow.end_dialogue(&mut fx.registry, &mut fx.presentation);
        assert!(matches!(again, Err(FlowError::PreconditionViolation(_))));
        assert_eq!(fx.flow.conversations_completed(), 1);
    }

    #[test]
    fn test_day1_quota_sets_must_go_home_without_ending() {
        let mut fx = Fixture::new();
        fx.registry.npc_mut(fx.day1[0]).unwrap().has_been_talked_to = true;
        fx.talk("Ayla", &["Hi."]);
        assert!(!fx.flow.must_go_home());

        fx.registry.npc_mut(fx.day1[1]).unwrap().has_been_talked_to = true;
        fx.talk("Berk", &["Yo.", "Bye."]);

        assert!(fx.flow.must_go_home());
        assert!(!fx.flow.game_ended());
        let cem = fx.registry.npc(fx.day1[2]).unwrap();
        assert!(!cem.interactable);
        assert!(fx.registry.npc(fx.day1[0]).unwrap().interactable);
        assert!(fx.presentation.is_visible(Surface::Warning));
    }

    #[test]
    fn test_evening_then_quota_fires_once() {
        let mut fx = Fixture::new();
        fx.tick_clock(250.0);
        fx.talk("Ayla", &["Hi."]);
        fx.talk("Berk", &["Yo."]);
        let fired = fx
            .flow
            .drain_notices()
            .into_iter()
            .filter(|n| matches!(n, FlowNotice::MustGoHome { .. }))
            .count();
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_sleep_runs_day_transition() {
        let mut fx = Fixture::new();
        fx.registry.npc_mut(fx.day1[0]).unwrap().has_been_talked_to = true;
        fx.talk("Ayla", &["Hi."]);
        fx.tick_clock(250.0);
        assert!(fx.flow.must_go_home());

        fx.flow.sleep(&mut fx.presentation).unwrap();
        assert_eq!(fx.flow.mode(), FlowMode::Sleeping);
        assert!(!fx.flow.can_interact());

        // The day does not change before the screen is black.
        fx.flow
            .tick_sequence(0.1, None, &mut fx.registry, &mut fx.presentation);
        assert_eq!(fx.flow.current_day(), 1);

        fx.run_sequence();

        assert_eq!(fx.flow.current_day(), 2);
        assert_eq!(fx.flow.time_of_day(), 0.0);
        assert_eq!(fx.flow.conversations_completed(), 0);
        assert!(!fx.flow.must_go_home());
        assert!(!fx.flow.sleeping());
        assert!(fx.flow.can_interact());
        assert!(!fx.presentation.is_visible(Surface::Warning));
        assert_eq!(fx.presentation.screen_opacity(), 0.0);
        for id in &fx.day1 {
            let npc = fx.registry.npc(*id).unwrap();
            assert!(!npc.interactable);
            assert!(!npc.has_been_talked_to);
        }
        for id in &fx.day2 {
            assert!(fx.registry.npc(*id).unwrap().interactable);
        }
        assert!(fx
            .flow
            .drain_notices()
            .contains(&FlowNotice::DayStarted { day: 2 }));
    }

    #[test]
    fn test_sleep_cannot_interleave() {
        let mut fx = Fixture::new();
        fx.flow.sleep(&mut fx.presentation).unwrap();
        assert_eq!(
            fx.flow.sleep(&mut fx.presentation),
            Err(FlowError::PreconditionViolation("already sleeping"))
        );
        let err = fx
            .flow
            .start_dialogue("Ayla", lines(&["Hi"]), &mut fx.presentation)
            .unwrap_err();
        assert!(matches!(err, FlowError::PreconditionViolation(_)));

        fx.run_sequence();
        assert_eq!(fx.flow.current_day(), 2);
    }

    #[test]
    fn test_sleeping_past_final_day_rolls_on_without_ending() {
        let mut fx = Fixture::new();
        fx.flow.sleep(&mut fx.presentation).unwrap();
        fx.run_sequence();
        fx.flow.sleep(&mut fx.presentation).unwrap();
        fx.run_sequence();

        assert_eq!(fx.flow.current_day(), FINAL_DAY + 1);
        assert!(!fx.flow.game_ended());
        assert!(fx.flow.can_interact());
        assert!(fx.registry.roster(fx.flow.current_day()).is_empty());
        for id in &fx.day2 {
            let npc = fx.registry.npc(*id).unwrap();
            assert!(!npc.is_eligible(fx.flow.current_day(), fx.flow.must_go_home()));
        }
        assert!(fx
            .flow
            .drain_notices()
            .contains(&FlowNotice::DayStarted { day: 3 }));
    }

    #[test]
    fn test_clock_frozen_while_sleeping() {
        let mut fx = Fixture::new();
        fx.tick_clock(30.0);
        fx.flow.sleep(&mut fx.presentation).unwrap();
        let before = fx.flow.time_of_day();
        fx.tick_clock(30.0);
        assert_eq!(fx.flow.time_of_day(), before);
    }

    #[test]
    fn test_day2_quota_ends_game_once() {
        let mut fx = Fixture::new();
        fx.flow.sleep(&mut fx.presentation).unwrap();
        fx.run_sequence();
        fx.flow.drain_notices();

        fx.talk("Deniz", &["Hey."]);
        assert!(!fx.flow.game_ended());
        fx.talk("Ece", &["Oh.", "It dances."]);
        assert!(fx.flow.game_ended());
        assert_eq!(fx.flow.mode(), FlowMode::Ended);
        assert!(!fx.flow.can_interact());
        assert!(!fx.flow.movement_enabled());

        assert_eq!(
            fx.flow.end_game(&mut fx.presentation),
            Err(FlowError::PreconditionViolation("game already ended"))
        );
        let ended = fx
            .flow
            .drain_notices()
            .into_iter()
            .filter(|n| *n == FlowNotice::GameEnded)
            .count();
        assert_eq!(ended, 1);
    }

    #[test]
    fn test_ending_sequence_frames_player_and_reveals_default_text() {
        let mut fx = Fixture::new();
        fx.flow.end_game(&mut fx.presentation).unwrap();
        let player = Vec3::new(4.0, 0.0, -1.0);
        for _ in 0..100 {
            fx.flow
                .tick_sequence(0.1, Some(player), &mut fx.registry, &mut fx.presentation);
        }
        let pose = fx.presentation.camera_pose().unwrap();
        assert_eq!(pose.look_at, player);
        assert_eq!(pose.position, player + Vec3::Y * 20.0);
        assert!(fx.presentation.is_visible(Surface::Ending));
        assert_eq!(fx.presentation.text(Surface::Ending), "The End");
        assert!(fx.flow.sequence_kind().is_none());
    }

    #[test]
    fn test_ending_prefers_village_center() {
        let mut settings = FlowSettings::default();
        settings.village_center = Some([1.0, 0.0, 2.0]);
        let mut flow = GameFlow::new(settings);
        let mut registry = InteractableRegistry::default();
        let mut presentation = Presentation::with_all_surfaces();
        flow.skip_intro(&mut presentation);
        flow.end_game(&mut presentation).unwrap();
        for _ in 0..100 {
            flow.tick_sequence(0.1, Some(Vec3::ZERO), &mut registry, &mut presentation);
        }
        let pose = presentation.camera_pose().unwrap();
        assert_eq!(pose.look_at, Vec3::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn test_skip_ending_keeps_game_ended() {
        let mut fx = Fixture::new();
        fx.flow.end_game(&mut fx.presentation).unwrap();
        fx.run_sequence();
        fx.flow.skip_ending(&mut fx.presentation);
        assert!(!fx.presentation.is_visible(Surface::Ending));
        assert!(fx.flow.game_ended());
        fx.tick_clock(100.0);
        assert_eq!(fx.flow.time_of_day(), 0.0);
    }

    #[test]
    fn test_missing_ending_surface_leaves_flags_set() {
        let mut fx = Fixture::new();
        let mut bare = Presentation::default();
        fx.flow.end_game(&mut bare).unwrap();
        for _ in 0..100 {
            fx.flow.tick_sequence(0.1, None, &mut fx.registry, &mut bare);
        }
        assert!(fx.flow.game_ended());
        assert!(!bare.is_visible(Surface::Ending));
        assert!(bare.camera_pose().is_none());
    }
}
