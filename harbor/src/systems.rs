use bevy::prelude::*;
use ocean::{ConsumerId, FloatingBody, FrameScheduler, SamplingError};

use crate::init::{FrameCounter, HarborSettings};

/// Frames between two progress reports.
const REPORT_INTERVAL: u64 = 60;

pub fn register_systems(app: &mut App) {
    app.add_systems(Startup, spawn_bodies);

    // Consumers read the previous frame's results before queueing new points
    app.add_systems(Update, (apply_results, push_samples).chain());

    // The batch is launched once every consumer has pushed
    app.add_systems(Last, (dispatch_batch, report_progress).chain());
}

/// Square patch of `count` anchors centered on `center`.
pub fn hull_anchors(center: Vec3, count: usize) -> Vec<Vec3> {
    let side = (count as f32).sqrt().ceil().max(1.0) as usize;
    let offset = (side as f32 - 1.0) * 0.5;
    (0..count)
        .map(|i| {
            let x = (i % side) as f32 - offset;
            let z = (i / side) as f32 - offset;
            center + Vec3::new(x, 0.0, z)
        })
        .collect()
}

pub fn spawn_bodies(
    mut commands: Commands,
    mut scheduler: ResMut<FrameScheduler>,
    settings: Res<HarborSettings>,
) {
    let row = (settings.bodies as f32).sqrt().ceil().max(1.0) as usize;
    let spacing = (settings.points_per_body as f32).sqrt() + 4.0;

    for i in 0..settings.bodies {
        let center = Vec3::new(
            (i % row) as f32 * spacing,
            0.0,
            (i / row) as f32 * spacing,
        );
        let anchors = hull_anchors(center, settings.points_per_body);
        match FloatingBody::attach(&mut scheduler, ConsumerId(i as u64), anchors) {
            Ok(body) => {
                commands.spawn(body);
            }
            Err(err) => warn!("Body {} not spawned: {}", i, err),
        }
    }

    info!(
        "Spawned floating bodies using {}/{} sample slots",
        scheduler.occupied_count(),
        scheduler.capacity()
    );
}

pub fn apply_results(
    time: Res<Time>,
    mut scheduler: ResMut<FrameScheduler>,
    mut bodies: Query<&mut FloatingBody>,
) {
    for mut body in bodies.iter_mut() {
        if let Err(err) = body.pull_and_apply(&mut scheduler, time.delta_secs()) {
            warn!("Could not apply wave samples to body {}: {}", body.id(), err);
        }
    }
}

pub fn push_samples(
    time: Res<Time>,
    settings: Res<HarborSettings>,
    mut scheduler: ResMut<FrameScheduler>,
    mut bodies: Query<&mut FloatingBody>,
) {
    let offset = Vec3::new(settings.drift, 0.0, settings.drift * 0.5) * time.delta_secs();
    for mut body in bodies.iter_mut() {
        body.translate(offset);
        if let Err(err) = body.push(&mut scheduler) {
            warn!("Could not queue wave samples for body {}: {}", body.id(), err);
        }
    }
}

pub fn dispatch_batch(time: Res<Time>, mut scheduler: ResMut<FrameScheduler>) {
    match scheduler.dispatch(time.elapsed_secs()) {
        Ok(_) => {}
        Err(SamplingError::ConcurrentDispatchDropped { .. }) => {}
        Err(err) => error!("Wave batch dispatch failed: {}", err),
    }
}

pub fn report_progress(
    mut commands: Commands,
    mut counter: ResMut<FrameCounter>,
    settings: Res<HarborSettings>,
    mut scheduler: ResMut<FrameScheduler>,
    bodies: Query<(Entity, &FloatingBody)>,
    mut ev_app_exit: EventWriter<AppExit>,
) {
    counter.0 += 1;

    if counter.0 % REPORT_INTERVAL == 0 {
        let stats = scheduler.stats();
        let tilt = bodies
            .iter()
            .map(|(_, body)| body.mean_up().angle_between(Vec3::Y))
            .fold(0.0f32, f32::max);
        info!(
            "Frame {}: {} batches completed, {} dropped, {} points in {} tasks, max tilt {:.1} deg",
            counter.0,
            stats.frames_completed,
            stats.dispatches_dropped,
            stats.points_last_batch,
            stats.tasks_last_batch,
            tilt.to_degrees()
        );
    }

    if counter.0 < settings.frames {
        return;
    }

    for (entity, body) in bodies.iter() {
        if let Err(err) = scheduler.unregister(body.id()) {
            warn!("Could not release body {}: {}", body.id(), err);
        }
        commands.entity(entity).despawn();
    }
    scheduler.complete_if_pending();

    info!(
        "Harbor finished after {} frames ({} batches completed)",
        counter.0,
        scheduler.stats().frames_completed
    );
    ev_app_exit.write(AppExit::Success);
}
