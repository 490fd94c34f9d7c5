//! Consumer-side helper for bodies that ride the wave surface.
//!
//! A [`FloatingBody`] owns a set of local anchor points. Each frame it pushes
//! their world positions, and on the next frame it pulls the displaced surface
//! back, snaps the anchors onto it and eases its up vector toward the mean
//! surface normal.

use bevy::math::{Quat, Vec3};
use bevy_ecs::component::Component;

use crate::sampling::{ConsumerId, FrameScheduler, SampleRange, SamplingError};

#[derive(Component, Debug, Clone)]
pub struct FloatingBody {
    id: ConsumerId,
    anchors: Vec<Vec3>,
    ups: Vec<Vec3>,
    surface: Vec<Vec3>,
    normals: Vec<Vec3>,
}

impl FloatingBody {
    /// Registers `anchors.len()` sample slots for `id`.
    pub fn attach(
        scheduler: &mut FrameScheduler,
        id: ConsumerId,
        anchors: Vec<Vec3>,
    ) -> Result<Self, SamplingError> {
        scheduler.register(id, anchors.len())?;
        let count = anchors.len();
        Ok(Self {
            id,
            anchors,
            ups: vec![Vec3::Y; count],
            surface: vec![Vec3::ZERO; count],
            normals: vec![Vec3::Y; count],
        })
    }

    pub fn id(&self) -> ConsumerId {
        self.id
    }

    pub fn anchors(&self) -> &[Vec3] {
        &self.anchors
    }

    pub fn ups(&self) -> &[Vec3] {
        &self.ups
    }

    /// Moves every anchor by `offset`; heights are replaced on the next pull.
    pub fn translate(&mut self, offset: Vec3) {
        for anchor in &mut self.anchors {
            *anchor += offset;
        }
    }

    pub fn push(&self, scheduler: &mut FrameScheduler) -> Result<(), SamplingError> {
        scheduler.push_samples(self.id, &self.anchors)
    }

    /// Pulls the last batch's results and applies them to the anchors.
    ///
    /// Anchor heights are set to the surface height. Each up vector turns
    /// toward its surface normal by `blend` (clamped to `[0, 1]`), usually
    /// the frame's delta time.
    pub fn pull_and_apply(
        &mut self,
        scheduler: &mut FrameScheduler,
        blend: f32,
    ) -> Result<(), SamplingError> {
        scheduler.pull_results(self.id, &mut self.surface, Some(&mut self.normals[..]))?;

        if !scheduler.frame_state().is_first_frame {
            for ((anchor, up), (surface, normal)) in self
                .anchors
                .iter_mut()
                .zip(self.ups.iter_mut())
                .zip(self.surface.iter().zip(&self.normals))
            {
                anchor.y = surface.y;
                *up = blend_up(*up, *normal, blend);
            }
        }
        Ok(())
    }

    /// Average up vector of all anchors.
    pub fn mean_up(&self) -> Vec3 {
        self.ups
            .iter()
            .copied()
            .sum::<Vec3>()
            .normalize_or(Vec3::Y)
    }

    pub fn detach(self, scheduler: &mut FrameScheduler) -> Result<SampleRange, SamplingError> {
        scheduler.unregister(self.id)
    }
}

fn blend_up(current: Vec3, target: Vec3, blend: f32) -> Vec3 {
    let (Some(current), Some(target)) = (current.try_normalize(), target.try_normalize()) else {
        return current;
    };
    let rotation = Quat::from_rotation_arc(current, target);
    Quat::IDENTITY.slerp(rotation, blend.clamp(0.0, 1.0)) * current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SamplerConfig;
    use crate::water::{Wave, WaveField, WaveFieldConfig, WaveSet};

    fn scheduler() -> FrameScheduler {
        let field = WaveField::new(
            WaveSet::new(vec![
                Wave::new(0.5, 1.0, Vec3::new(1.0, 0.0, 0.0)),
                Wave::new(0.3, 1.2, Vec3::new(0.4, 0.0, 0.9)),
            ]),
            WaveFieldConfig::default(),
        );
        FrameScheduler::new(field, SamplerConfig::default().with_capacity(64))
    }

    fn hull() -> Vec<Vec3> {
        vec![
            Vec3::new(-1.0, 0.0, -2.0),
            Vec3::new(1.0, 0.0, -2.0),
            Vec3::new(-1.0, 0.0, 2.0),
            Vec3::new(1.0, 0.0, 2.0),
        ]
    }

    #[test]
    fn test_first_pull_leaves_anchors_untouched() {
        let mut scheduler = scheduler();
        let mut body = FloatingBody::attach(&mut scheduler, ConsumerId(1), hull()).unwrap();

        body.pull_and_apply(&mut scheduler, 1.0).unwrap();
        assert_eq!(body.anchors(), hull().as_slice());
        assert_eq!(body.ups(), &[Vec3::Y; 4]);
    }

    #[test]
    fn test_anchors_follow_surface_height() {
        let mut scheduler = scheduler();
        let mut body = FloatingBody::attach(&mut scheduler, ConsumerId(1), hull()).unwrap();

        body.push(&mut scheduler).unwrap();
        scheduler.dispatch(0.8).unwrap();
        body.pull_and_apply(&mut scheduler, 1.0).unwrap();

        for (anchor, original) in body.anchors().iter().zip(hull()) {
            let expected = scheduler.field().evaluate_point(original, 0.8);
            assert!((anchor.y - expected.position.y).abs() < 1e-5);
            assert_eq!(anchor.x, original.x);
            assert_eq!(anchor.z, original.z);
        }
        for (up, original) in body.ups().iter().zip(hull()) {
            let expected = scheduler.field().evaluate_point(original, 0.8).normal;
            assert!((*up - expected).length() < 1e-4, "{up:?} vs {expected:?}");
        }
    }

    #[test]
    fn test_blend_up_is_partial() {
        let target = Vec3::new(1.0, 1.0, 0.0).normalize();
        let half = blend_up(Vec3::Y, target, 0.5);
        let angle_to_target = half.angle_between(target);
        let angle_from_start = half.angle_between(Vec3::Y);
        assert!((angle_to_target - angle_from_start).abs() < 1e-4);
        assert!((half.length() - 1.0).abs() < 1e-5);

        assert!((blend_up(Vec3::Y, target, 0.0) - Vec3::Y).length() < 1e-6);
        assert!((blend_up(Vec3::Y, Vec3::ZERO, 0.5) - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_detach_frees_slots() {
        let mut scheduler = scheduler();
        let first = FloatingBody::attach(&mut scheduler, ConsumerId(1), hull()).unwrap();
        let second = FloatingBody::attach(&mut scheduler, ConsumerId(2), hull()).unwrap();
        assert_eq!(scheduler.occupied_count(), 8);

        assert_eq!(first.detach(&mut scheduler), Ok(SampleRange::new(0, 4)));
        assert_eq!(
            scheduler.registry().get(second.id()),
            Some(SampleRange::new(0, 4))
        );
        assert_eq!(scheduler.occupied_count(), 4);
    }

    #[test]
    fn test_translate_then_push_uses_new_positions() {
        let mut scheduler = scheduler();
        let mut body = FloatingBody::attach(&mut scheduler, ConsumerId(3), hull()).unwrap();
        body.translate(Vec3::new(5.0, 0.0, 0.0));
        body.push(&mut scheduler).unwrap();

        let range = scheduler.registry().get(body.id()).unwrap();
        assert_eq!(range.len(), 4);
        assert_eq!(body.anchors()[0], Vec3::new(4.0, 0.0, -2.0));
        assert!((body.mean_up() - Vec3::Y).length() < 1e-6);
    }
}
