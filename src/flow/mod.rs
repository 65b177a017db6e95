//! Flow domain: the story state machine of Duskfall.
//!
//! Responsible for:
//! - Owning `GameFlow`, the single source of truth for every story flag
//! - Routing the per-frame input to whichever mode is active
//! - Driving the dialogue reveal and the timed sequences (sleep, ending)
//! - Publishing what happened as Bevy events for the other domains
//!
//! Per-frame order inside `Update` is fixed by `FlowSet`: input first, then
//! the dialogue reveal, the clock, the sequences, and finally publishing.
//! Readers in `FlowSet::Publish` see every mutation made this frame.

mod controller;
pub mod sequence;

use bevy::prelude::*;

use crate::npcs::InteractableRegistry;
use crate::player::interaction::try_interact;
use crate::shared::*;

pub use controller::{FlowNotice, GameFlow};
pub use sequence::{FlowSequence, FlowStep, SequenceKind};

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowSet {
    Input,
    Dialogue,
    Clock,
    Sequence,
    Publish,
}

pub struct FlowPlugin;

impl Plugin for FlowPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameFlow>()
            .init_resource::<InteractableRegistry>()
            .init_resource::<Presentation>()
            .add_event::<MustGoHomeEvent>()
            .add_event::<DialogueStartEvent>()
            .add_event::<DialogueEndEvent>()
            .add_event::<DayStartedEvent>()
            .add_event::<GameEndedEvent>();

        app.configure_sets(
            Update,
            (
                FlowSet::Input,
                FlowSet::Dialogue,
                FlowSet::Clock,
                FlowSet::Sequence,
                FlowSet::Publish,
            )
                .chain()
                .run_if(in_state(GameState::Playing)),
        );

        app.add_systems(OnEnter(GameState::Playing), show_intro_screen);

        app.add_systems(
            Update,
            (
                handle_flow_input.in_set(FlowSet::Input),
                tick_dialogue_reveal.in_set(FlowSet::Dialogue),
                run_flow_sequence.in_set(FlowSet::Sequence),
                publish_flow_notices.in_set(FlowSet::Publish),
            ),
        );
    }
}

fn show_intro_screen(
    story: Option<Res<StoryConfig>>,
    mut flow: ResMut<GameFlow>,
    mut presentation: ResMut<Presentation>,
) {
    let intro = story
        .map(|s| s.intro_text.clone())
        .unwrap_or_else(|| StoryConfig::default().intro_text);
    flow.show_intro(&mut presentation, &intro);
}

/// Routes this frame's actions by the mode the flow was in when the frame
/// started. A press therefore has exactly one consumer: the press that
/// closes a dialogue cannot also open the next one.
fn handle_flow_input(
    input: Res<PlayerInput>,
    player: Query<&WorldPosition, With<Player>>,
    mut flow: ResMut<GameFlow>,
    mut registry: ResMut<InteractableRegistry>,
    mut presentation: ResMut<Presentation>,
) {
    match flow.mode() {
        FlowMode::Intro => {
            if input.skip || input.advance || input.interact {
                flow.skip_intro(&mut presentation);
            }
        }
        FlowMode::Dialogue => {
            if input.advance {
                if let Err(err) = flow.advance_dialogue(&mut registry, &mut presentation) {
                    log_flow_error("Dialogue", &err);
                }
            }
        }
        FlowMode::FreeRoam => {
            if input.dismiss {
                flow.hide_warning(&mut presentation);
            }
            if !input.interact {
                return;
            }
            let Ok(position) = player.get_single() else {
                log_flow_error("Interact", &FlowError::ConfigurationMissing("player"));
                return;
            };
            if let Err(err) = try_interact(position.0, &mut flow, &mut registry, &mut presentation) {
                log_flow_error("Interact", &err);
            }
        }
        FlowMode::Sleeping => {}
        FlowMode::Ended => {
            if input.skip || input.dismiss {
                flow.skip_ending(&mut presentation);
            }
        }
    }
}

fn tick_dialogue_reveal(
    time: Res<Time>,
    mut flow: ResMut<GameFlow>,
    mut presentation: ResMut<Presentation>,
) {
    flow.tick_dialogue(time.delta_secs(), &mut presentation);
}

fn run_flow_sequence(
    time: Res<Time>,
    player: Query<&WorldPosition, With<Player>>,
    mut flow: ResMut<GameFlow>,
    mut registry: ResMut<InteractableRegistry>,
    mut presentation: ResMut<Presentation>,
) {
    if flow.sequence_kind().is_none() {
        return;
    }
    let player_position = player.get_single().ok().map(|p| p.0);
    flow.tick_sequence(
        time.delta_secs(),
        player_position,
        &mut registry,
        &mut presentation,
    );
}

fn publish_flow_notices(
    mut flow: ResMut<GameFlow>,
    mut must_go_home: EventWriter<MustGoHomeEvent>,
    mut dialogue_start: EventWriter<DialogueStartEvent>,
    mut dialogue_end: EventWriter<DialogueEndEvent>,
    mut day_started: EventWriter<DayStartedEvent>,
    mut game_ended: EventWriter<GameEndedEvent>,
) {
    for notice in flow.drain_notices() {
        match notice {
            FlowNotice::MustGoHome { day, cause } => {
                must_go_home.send(MustGoHomeEvent { day, cause });
            }
            FlowNotice::DialogueStarted { speaker } => {
                dialogue_start.send(DialogueStartEvent { speaker });
            }
            FlowNotice::DialogueEnded {
                speaker,
                conversations_completed,
            } => {
                dialogue_end.send(DialogueEndEvent {
                    speaker,
                    conversations_completed,
                });
            }
            FlowNotice::DayStarted { day } => {
                day_started.send(DayStartedEvent { day });
            }
            FlowNotice::GameEnded => {
                game_ended.send(GameEndedEvent);
            }
        }
    }
}
