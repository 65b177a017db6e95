use bevy::prelude::*;
use crate::flow::GameFlow;
use crate::shared::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerInput>()
            .init_resource::<InputContext>()
            .init_resource::<KeyBindings>()
            .add_systems(
                PreUpdate,
                (manage_input_context, reset_and_read_input).chain(),
            );
    }
}

/// The single point where hardware input becomes game actions.
fn reset_and_read_input(
    keys: Res<ButtonInput<KeyCode>>,
    bindings: Res<KeyBindings>,
    context: Res<InputContext>,
    mut input: ResMut<PlayerInput>,
) {
    *input = PlayerInput::default();

    match *context {
        InputContext::Disabled => {}

        InputContext::Intro => {
            input.skip = keys.just_pressed(bindings.skip)
                || keys.just_pressed(bindings.advance)
                || keys.just_pressed(bindings.interact);
        }

        InputContext::Gameplay => {
            let mut axis = Vec2::ZERO;
            if keys.pressed(bindings.move_up) || keys.pressed(KeyCode::ArrowUp) {
                axis.y += 1.0;
            }
            if keys.pressed(bindings.move_down) || keys.pressed(KeyCode::ArrowDown) {
                axis.y -= 1.0;
            }
            if keys.pressed(bindings.move_left) || keys.pressed(KeyCode::ArrowLeft) {
                axis.x -= 1.0;
            }
            if keys.pressed(bindings.move_right) || keys.pressed(KeyCode::ArrowRight) {
                axis.x += 1.0;
            }
            input.move_axis = if axis != Vec2::ZERO {
                axis.normalize()
            } else {
                Vec2::ZERO
            };

            input.interact = keys.just_pressed(bindings.interact);
            input.dismiss = keys.just_pressed(bindings.dismiss);
        }

        InputContext::Dialogue => {
            // E keeps working so the key that opened a dialogue can page it.
            input.advance = keys.just_pressed(bindings.advance)
                || keys.just_pressed(bindings.interact)
                || keys.just_pressed(bindings.skip);
        }

        InputContext::Ending => {
            input.skip = keys.just_pressed(bindings.skip);
            input.dismiss = keys.just_pressed(bindings.dismiss);
        }
    }
}

/// Derives InputContext from GameState and the flow mode. ONE system,
/// replaces all per-domain guards.
fn manage_input_context(
    game_state: Res<State<GameState>>,
    flow: Res<GameFlow>,
    mut context: ResMut<InputContext>,
) {
    let next = context_for(*game_state.get(), flow.mode());
    if *context != next {
        *context = next;
    }
}

pub fn context_for(state: GameState, mode: FlowMode) -> InputContext {
    match (state, mode) {
        (GameState::Loading, _) => InputContext::Disabled,
        (GameState::Playing, FlowMode::Intro) => InputContext::Intro,
        (GameState::Playing, FlowMode::FreeRoam) => InputContext::Gameplay,
        (GameState::Playing, FlowMode::Dialogue) => InputContext::Dialogue,
        (GameState::Playing, FlowMode::Sleeping) => InputContext::Disabled,
        (GameState::Playing, FlowMode::Ended) => InputContext::Ending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_disables_input() {
        assert_eq!(
            context_for(GameState::Loading, FlowMode::FreeRoam),
            InputContext::Disabled
        );
    }

    #[test]
    fn test_context_follows_flow_mode() {
        assert_eq!(context_for(GameState::Playing, FlowMode::Intro), InputContext::Intro);
        assert_eq!(
            context_for(GameState::Playing, FlowMode::FreeRoam),
            InputContext::Gameplay
        );
        assert_eq!(
            context_for(GameState::Playing, FlowMode::Dialogue),
            InputContext::Dialogue
        );
        assert_eq!(
            context_for(GameState::Playing, FlowMode::Sleeping),
            InputContext::Disabled
        );
        assert_eq!(context_for(GameState::Playing, FlowMode::Ended), InputContext::Ending);
    }

    #[test]
    fn test_default_keybindings() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.move_up, KeyCode::KeyW);
        assert_eq!(bindings.interact, KeyCode::KeyE);
        assert_eq!(bindings.advance, KeyCode::Space);
    }
}
