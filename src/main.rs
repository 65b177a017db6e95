use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use duskfall::shared::*;
use duskfall::{calendar, data, flow, input, npcs, player, ui};

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Duskfall".into(),
                        resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                        present_mode: PresentMode::AutoVsync,
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        .insert_resource(ClearColor(Color::srgb(0.86, 0.74, 0.52)))
        // Game state
        .init_state::<GameState>()
        // Domain plugins
        .add_plugins(flow::FlowPlugin)
        .add_plugins(input::InputPlugin)
        .add_plugins(calendar::CalendarPlugin)
        .add_plugins(player::PlayerPlugin)
        .add_plugins(npcs::NpcPlugin)
        .add_plugins(ui::UiPlugin)
        // Data loading
        .add_plugins(data::DataPlugin)
        // Camera
        .add_systems(Startup, setup_camera)
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
