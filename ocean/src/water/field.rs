//! Deep-water Gerstner wave field evaluation.
//!
//! The field is a pure function of the wave set, a horizontal position and
//! elapsed time. Per-wave constants are precomputed once, so evaluation is
//! allocation-free and safe to call from any number of threads.

use bevy::math::{Vec2, Vec3};
use bevy_log::warn;

use super::config::{AccumulationMode, Wave, WaveFieldConfig, WaveSet};

/// Displaced position and surface normal at one sample point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub position: Vec3,
    pub normal: Vec3,
}

impl Default for SurfaceSample {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            normal: Vec3::Y,
        }
    }
}

/// Precomputed constants for a single non-degenerate wave.
#[derive(Clone, Copy, Debug)]
struct WaveConstants {
    amplitude: f32,
    dir_x: f32,
    dir_z: f32,
    /// (direction.xz / len) * amplitude / tanh(len * depth)
    horizontal_x: f32,
    horizontal_z: f32,
    /// dispersion * phase_speed_scale
    omega: f32,
}

impl WaveConstants {
    /// Returns `None` for waves that would divide by zero.
    fn new(wave: &Wave, config: &WaveFieldConfig) -> Option<Self> {
        if wave.is_degenerate() {
            return None;
        }

        let len = wave.horizontal_length();
        let tanh = (len * config.depth).tanh();
        if !(tanh.is_finite() && tanh > f32::EPSILON) {
            return None;
        }

        let mut dispersion = (len * config.gravity * tanh).sqrt();
        if config.truncate_phase {
            dispersion = truncate_millis(dispersion);
        }

        let horizontal_scale = wave.amplitude / tanh / len;

        Some(Self {
            amplitude: wave.amplitude,
            dir_x: wave.direction.x,
            dir_z: wave.direction.z,
            horizontal_x: wave.direction.x * horizontal_scale,
            horizontal_z: wave.direction.z * horizontal_scale,
            omega: dispersion * wave.phase_speed_scale,
        })
    }
}

#[inline]
fn truncate_millis(value: f32) -> f32 {
    (value * 1000.0).trunc() / 1000.0
}

/// Immutable Gerstner wave field.
#[derive(Debug, Clone)]
pub struct WaveField {
    config: WaveFieldConfig,
    waves: WaveSet,
    constants: Vec<WaveConstants>,
}

impl WaveField {
    pub fn new(waves: WaveSet, config: WaveFieldConfig) -> Self {
        let constants: Vec<WaveConstants> = waves
            .iter()
            .filter_map(|wave| WaveConstants::new(wave, &config))
            .collect();

        let skipped = waves.len() - constants.len();
        if skipped > 0 {
            warn!(
                "{} of {} waves have no usable horizontal direction and are ignored",
                skipped,
                waves.len()
            );
        }

        Self {
            config,
            waves,
            constants,
        }
    }

    pub fn config(&self) -> &WaveFieldConfig {
        &self.config
    }

    pub fn waves(&self) -> &WaveSet {
        &self.waves
    }

    /// Number of waves that actually contribute to the surface.
    pub fn active_wave_count(&self) -> usize {
        self.constants.len()
    }

    /// Offset produced by one wave at `position` (x, z).
    #[inline]
    fn wave_offset(&self, wave: &WaveConstants, position: Vec2, time: f32) -> Vec3 {
        let mut theta = wave.dir_x * position.x + wave.dir_z * position.y - wave.omega * time;
        if self.config.truncate_phase {
            theta = truncate_millis(theta);
        }

        let (sin_theta, cos_theta) = theta.sin_cos();

        Vec3::new(
            -wave.horizontal_x * sin_theta,
            wave.amplitude * cos_theta,
            -wave.horizontal_z * sin_theta,
        )
    }

    /// Displaced surface position of the still-water point at `position` (x, z).
    pub fn displace(&self, position: Vec2, time: f32) -> Vec3 {
        let mut offset = Vec3::ZERO;

        for wave in &self.constants {
            let at = match self.config.accumulation {
                AccumulationMode::Independent => position,
                AccumulationMode::Cumulative => position + Vec2::new(offset.x, offset.z),
            };
            offset += self.wave_offset(wave, at, time);
        }

        Vec3::new(
            position.x + offset.x,
            self.config.base_level + offset.y,
            position.y + offset.z,
        )
    }

    /// Surface height at `position` (x, z).
    pub fn sample_height(&self, position: Vec2, time: f32) -> f32 {
        self.displace(position, time).y
    }

    /// Displaced position and finite-difference normal at `position` (x, z).
    pub fn evaluate(&self, position: Vec2, time: f32) -> SurfaceSample {
        let step = self.config.normal_step;
        let center = self.displace(position, time);
        let neighbor_x = self.displace(position + Vec2::new(step, 0.0), time);
        let neighbor_z = self.displace(position + Vec2::new(0.0, step), time);

        let normal = (neighbor_z - center)
            .normalize_or_zero()
            .cross((neighbor_x - center).normalize_or_zero())
            .normalize_or(Vec3::Y);

        SurfaceSample {
            position: center,
            normal,
        }
    }

    /// Surface normal at `position` (x, z).
    pub fn normal(&self, position: Vec2, time: f32) -> Vec3 {
        self.evaluate(position, time).normal
    }

    /// Evaluates a 3D sample point; only its x and z are read.
    #[inline]
    pub fn evaluate_point(&self, point: Vec3, time: f32) -> SurfaceSample {
        self.evaluate(Vec2::new(point.x, point.z), time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::water::config::WavePreset;

    fn unit_wave() -> Wave {
        Wave::new(1.0, 1.0, Vec3::X)
    }

    fn assert_close(a: Vec3, b: Vec3, tolerance: f32) {
        assert!(
            (a - b).abs().max_element() < tolerance,
            "expected {b:?}, got {a:?}"
        );
    }

    /// Fixed multi-wave fixture used to pin down the accumulation policy.
    fn swell_pair() -> WaveSet {
        WaveSet::new([
            Wave::new(0.6, 1.0, Vec3::new(0.5, 0.0, 0.2)),
            Wave::new(0.4, 1.3, Vec3::new(0.7, 0.0, 0.4)),
        ])
    }

    #[test]
    fn test_single_wave_crest_at_origin() {
        let field = WaveField::new(WaveSet::single(unit_wave()), WaveFieldConfig::default());
        let sample = field.evaluate(Vec2::ZERO, 0.0);
        assert_close(sample.position, Vec3::new(0.0, 1.0, 0.0), 1e-5);
    }

    #[test]
    fn test_single_wave_matches_closed_form() {
        let field = WaveField::new(WaveSet::single(unit_wave()), WaveFieldConfig::default());
        let position = Vec2::new(0.7, -2.0);
        let time = 1.3;

        let tanh = 10.0f32.tanh();
        let dispersion = (9.0 * tanh).sqrt();
        let theta = position.x - dispersion * time;
        let expected = Vec3::new(
            position.x - theta.sin() / tanh,
            theta.cos(),
            position.y,
        );

        assert_close(field.displace(position, time), expected, 1e-4);
    }

    #[test]
    fn test_degenerate_wave_leaves_point_untouched() {
        let waves = WaveSet::new([
            Wave::new(2.0, 1.0, Vec3::ZERO),
            Wave::new(1.0, 3.0, Vec3::new(0.0, 5.0, 0.0)),
        ]);
        let field = WaveField::new(waves, WaveFieldConfig::default().with_base_level(4.0));
        assert_eq!(field.active_wave_count(), 0);

        for (x, z, time) in [(0.0, 0.0, 0.0), (13.5, -7.25, 2.0), (-1e4, 3e3, 1e5)] {
            let sample = field.evaluate(Vec2::new(x, z), time);
            assert_eq!(sample.position, Vec3::new(x, 4.0, z));
            assert!(sample.normal.is_finite());
            assert_close(sample.normal, Vec3::Y, 1e-5);
        }
    }

    #[test]
    fn test_degenerate_wave_does_not_disturb_others() {
        let clean = WaveField::new(WaveSet::single(unit_wave()), WaveFieldConfig::default());
        let mixed = WaveField::new(
            WaveSet::new([Wave::new(5.0, 1.0, Vec3::ZERO), unit_wave()]),
            WaveFieldConfig::default(),
        );

        let position = Vec2::new(3.0, 1.0);
        assert_eq!(
            clean.evaluate(position, 0.8),
            mixed.evaluate(position, 0.8)
        );
    }

    #[test]
    fn test_single_wave_height_is_bounded_by_amplitude() {
        let amplitude = 0.75;
        let field = WaveField::new(
            WaveSet::single(Wave::new(amplitude, 1.4, Vec3::new(0.3, 0.0, -0.8))),
            WaveFieldConfig::default().with_base_level(2.0),
        );

        for step in 0..200 {
            let t = step as f32 * 0.137;
            let position = Vec2::new((step as f32 * 1.7).sin() * 40.0, step as f32 * 0.31);
            let height = field.sample_height(position, t);
            assert!(
                (height - 2.0).abs() <= amplitude + 1e-5,
                "height {height} exceeds amplitude at t={t}"
            );
        }
    }

    #[test]
    fn test_flat_water_normal_points_up() {
        let field = WaveField::new(WaveSet::default(), WaveFieldConfig::default());
        assert_close(field.normal(Vec2::new(5.0, 5.0), 1.0), Vec3::Y, 1e-6);
    }

    #[test]
    fn test_normal_is_normalized_and_upward() {
        let field = WaveField::new(WavePreset::Ocean.to_wave_set(), WaveFieldConfig::default());
        for i in 0..50 {
            let position = Vec2::new(i as f32 * 0.9, i as f32 * -1.3);
            let normal = field.normal(position, i as f32 * 0.2);
            assert!((normal.length() - 1.0).abs() < 1e-4);
            assert!(normal.y > 0.0, "normal {normal:?} points down");
        }
    }

    #[test]
    fn test_zero_normal_step_falls_back_to_up() {
        let field = WaveField::new(
            WaveSet::single(unit_wave()),
            WaveFieldConfig::default().with_normal_step(0.0),
        );
        assert_eq!(field.normal(Vec2::new(0.3, 0.4), 0.5), Vec3::Y);
    }

    #[test]
    fn test_accumulation_modes_agree_for_one_wave() {
        let waves = WaveSet::single(Wave::new(0.8, 1.0, Vec3::new(0.4, 0.0, 0.3)));
        let independent = WaveField::new(waves.clone(), WaveFieldConfig::default());
        let cumulative = WaveField::new(
            waves,
            WaveFieldConfig::default().with_accumulation(AccumulationMode::Cumulative),
        );

        let position = Vec2::new(2.5, -1.0);
        assert_eq!(
            independent.displace(position, 0.6),
            cumulative.displace(position, 0.6)
        );
    }

    #[test]
    fn test_independent_accumulation_sums_waves_at_original_point() {
        let waves = swell_pair();
        let position = Vec2::new(1.5, 2.0);
        let time = 0.9;

        let combined = WaveField::new(waves.clone(), WaveFieldConfig::default());
        let mut expected = Vec3::new(position.x, 0.0, position.y);
        for wave in waves.iter() {
            let alone = WaveField::new(WaveSet::single(*wave), WaveFieldConfig::default());
            expected += alone.displace(position, time) - Vec3::new(position.x, 0.0, position.y);
        }

        assert_close(combined.displace(position, time), expected, 1e-5);
    }

    #[test]
    fn test_cumulative_accumulation_feeds_forward() {
        let waves = swell_pair();
        let position = Vec2::new(1.5, 2.0);
        let time = 0.9;
        let config = WaveFieldConfig::default().with_accumulation(AccumulationMode::Cumulative);

        let first = WaveField::new(WaveSet::single(waves.waves()[0]), config);
        let second = WaveField::new(WaveSet::single(waves.waves()[1]), config);

        let after_first = first.displace(position, time);
        let shifted = Vec2::new(after_first.x, after_first.z);
        let after_second = second.displace(shifted, time);

        let expected = Vec3::new(after_second.x, after_first.y + after_second.y, after_second.z);
        let combined = WaveField::new(waves, config);

        assert_close(combined.displace(position, time), expected, 1e-5);
    }

    #[test]
    fn test_accumulation_modes_differ_for_swell_pair() {
        let independent = WaveField::new(swell_pair(), WaveFieldConfig::default());
        let cumulative = WaveField::new(
            swell_pair(),
            WaveFieldConfig::default().with_accumulation(AccumulationMode::Cumulative),
        );

        let position = Vec2::new(1.5, 2.0);
        let a = independent.displace(position, 0.9);
        let b = cumulative.displace(position, 0.9);
        assert!((a - b).length() > 1e-3, "{a:?} vs {b:?}");
    }

    #[test]
    fn test_truncated_phase_keeps_crest_at_origin() {
        let config = WaveFieldConfig {
            truncate_phase: true,
            ..Default::default()
        };
        let field = WaveField::new(WaveSet::single(unit_wave()), config);
        let sample = field.evaluate(Vec2::ZERO, 0.0);
        assert_close(sample.position, Vec3::new(0.0, 1.0, 0.0), 1e-5);
    }

    #[test]
    fn test_height_varies_with_time() {
        let field = WaveField::new(WavePreset::Ocean.to_wave_set(), WaveFieldConfig::default());
        let h1 = field.sample_height(Vec2::ZERO, 0.0);
        let h2 = field.sample_height(Vec2::ZERO, 1.0);
        assert!((h1 - h2).abs() > 0.001, "Height should vary with time");
    }

    #[test]
    fn test_evaluate_point_ignores_input_height() {
        let field = WaveField::new(WavePreset::Lake.to_wave_set(), WaveFieldConfig::default());
        assert_eq!(
            field.evaluate_point(Vec3::new(2.0, 100.0, 3.0), 0.4),
            field.evaluate(Vec2::new(2.0, 3.0), 0.4)
        );
    }
}
