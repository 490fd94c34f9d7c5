use bevy::prelude::*;
use bevy_app::ScheduleRunnerPlugin;
use ocean::OceanConfig;
use std::time::Duration;

use crate::systems;

/// Frames per second of the headless run loop.
pub const TICKS_PER_SECOND: u64 = 60;

/// Shape of the simulated fleet.
#[derive(Resource, Debug, Clone)]
pub struct HarborSettings {
    pub frames: u64,
    pub bodies: usize,
    pub points_per_body: usize,
    pub drift: f32,
}

#[derive(Resource, Debug, Default)]
pub struct FrameCounter(pub u64);

pub fn build_app(config: &OceanConfig, settings: HarborSettings) -> App {
    let mut app = App::new();
    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / TICKS_PER_SECOND as f64,
        ))),
    );
    app.add_plugins(bevy::log::LogPlugin::default());

    info!(
        "Starting harbor: {} bodies of {} points, {} frames, {} sample slots",
        settings.bodies, settings.points_per_body, settings.frames, config.sampler.capacity
    );

    app.insert_resource(config.build_scheduler());
    app.insert_resource(settings);
    app.init_resource::<FrameCounter>();

    systems::register_systems(&mut app);

    app
}

pub fn init(config: OceanConfig, settings: HarborSettings) {
    build_app(&config, settings).run();
}
