//! Wave parameters shared by the CPU wave field and the material that renders it.
//!
//! A [`WaveSet`] is built once from the water material's uniforms (or a
//! [`WavePreset`]) and stays read-only for the lifetime of the simulation.

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::{
    DEFAULT_BASE_LEVEL, DEFAULT_GRAVITY, DEFAULT_NORMAL_STEP, DEFAULT_WATER_DEPTH,
};

/// One traveling plane wave.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    /// Vertical displacement scale
    pub amplitude: f32,
    /// Multiplies the dispersion frequency against elapsed time.
    /// Mirrors the per-wave time scale the water shader applies.
    pub phase_speed_scale: f32,
    /// Travel direction; its horizontal length is the wave number.
    /// The y component is ignored.
    pub direction: Vec3,
}

impl Wave {
    pub const fn new(amplitude: f32, phase_speed_scale: f32, direction: Vec3) -> Self {
        Self {
            amplitude,
            phase_speed_scale,
            direction,
        }
    }

    /// Length of the (x, z) part of the direction.
    #[inline]
    pub fn horizontal_length(&self) -> f32 {
        (self.direction.x * self.direction.x + self.direction.z * self.direction.z).sqrt()
    }

    /// A wave with no horizontal direction has no defined travel and contributes nothing.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        let len = self.horizontal_length();
        !(len.is_finite() && len > f32::EPSILON)
    }
}

/// Ordered set of waves. Order only affects floating-point summation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaveSet {
    waves: Vec<Wave>,
}

impl WaveSet {
    pub fn new(waves: impl Into<Vec<Wave>>) -> Self {
        Self {
            waves: waves.into(),
        }
    }

    pub fn single(wave: Wave) -> Self {
        Self { waves: vec![wave] }
    }

    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    pub fn iter(&self) -> impl Iterator<Item = &Wave> {
        self.waves.iter()
    }

    pub fn len(&self) -> usize {
        self.waves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Number of waves that will be filtered out of evaluation.
    pub fn degenerate_count(&self) -> usize {
        self.waves.iter().filter(|wave| wave.is_degenerate()).count()
    }
}

impl FromIterator<Wave> for WaveSet {
    fn from_iter<I: IntoIterator<Item = Wave>>(iter: I) -> Self {
        Self {
            waves: iter.into_iter().collect(),
        }
    }
}

/// How the horizontal displacement of several waves is combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccumulationMode {
    /// Every wave is evaluated at the original horizontal point and the
    /// contributions are summed.
    #[default]
    Independent,
    /// Each wave is evaluated at the point already displaced by the waves
    /// before it, in set order.
    Cumulative,
}

/// Tunable constants of the wave field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveFieldConfig {
    /// Idealized water depth used by the dispersion relation
    pub depth: f32,
    /// Gravity used by the dispersion relation
    pub gravity: f32,
    /// Horizontal offset of the finite-difference neighbors used for normals
    pub normal_step: f32,
    /// Still-water height that vertical displacement is added to
    pub base_level: f32,
    pub accumulation: AccumulationMode,
    /// Truncate frequency and phase to three decimals like the water shader does.
    pub truncate_phase: bool,
}

impl Default for WaveFieldConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_WATER_DEPTH,
            gravity: DEFAULT_GRAVITY,
            normal_step: DEFAULT_NORMAL_STEP,
            base_level: DEFAULT_BASE_LEVEL,
            accumulation: AccumulationMode::default(),
            truncate_phase: false,
        }
    }
}

impl WaveFieldConfig {
    pub fn with_base_level(mut self, base_level: f32) -> Self {
        self.base_level = base_level;
        self
    }

    pub fn with_accumulation(mut self, accumulation: AccumulationMode) -> Self {
        self.accumulation = accumulation;
        self
    }

    pub fn with_normal_step(mut self, normal_step: f32) -> Self {
        self.normal_step = normal_step;
        self
    }
}

/// Preset wave sets for different kinds of water.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WavePreset {
    /// Completely still water (no waves)
    Still,
    /// Calm water with a single gentle swell
    Calm,
    /// Lake with two short waves
    Lake,
    /// Standard four-wave ocean
    #[default]
    Ocean,
    /// Stormy ocean with large waves
    Storm,
}

impl WavePreset {
    pub fn to_wave_set(self) -> WaveSet {
        match self {
            WavePreset::Still => WaveSet::default(),
            WavePreset::Calm => WaveSet::single(Wave::new(0.1, 1.0, Vec3::new(0.4, 0.0, 0.1))),
            WavePreset::Lake => WaveSet::new([
                Wave::new(0.15, 0.8, Vec3::new(0.8, 0.0, 0.0)),
                Wave::new(0.08, 1.0, Vec3::new(0.4, 0.0, 1.3)),
            ]),
            WavePreset::Ocean => WaveSet::new([
                Wave::new(0.5, 1.0, Vec3::new(0.35, 0.0, 0.1)),
                Wave::new(0.3, 1.2, Vec3::new(-0.2, 0.0, 0.45)),
                Wave::new(0.15, 0.9, Vec3::new(0.6, 0.0, -0.5)),
                Wave::new(0.08, 1.4, Vec3::new(-0.9, 0.0, -0.4)),
            ]),
            WavePreset::Storm => WaveSet::new([
                Wave::new(1.6, 1.0, Vec3::new(0.2, 0.0, 0.05)),
                Wave::new(0.9, 1.1, Vec3::new(-0.15, 0.0, 0.3)),
                Wave::new(0.5, 1.3, Vec3::new(0.45, 0.0, -0.45)),
                Wave::new(0.25, 1.5, Vec3::new(-0.8, 0.0, -0.3)),
            ]),
        }
    }
}

impl FromStr for WavePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "still" => Ok(WavePreset::Still),
            "calm" => Ok(WavePreset::Calm),
            "lake" => Ok(WavePreset::Lake),
            "ocean" => Ok(WavePreset::Ocean),
            "storm" => Ok(WavePreset::Storm),
            other => Err(format!(
                "unknown wave preset '{other}' (expected still, calm, lake, ocean or storm)"
            )),
        }
    }
}
