//! Gerstner wave field shared by floating-object sampling and the water material.
//!
//! The water material and the CPU field are fed the same [`WaveSet`], so
//! objects placed from CPU samples ride the surface that is drawn.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 WaveSet (read-only snapshot)              │
//! │  - amplitude, phase speed scale, direction per wave       │
//! └──────────────────────────┬───────────────────────────────┘
//!                            │
//!            ┌───────────────┴───────────────┐
//!            ▼                               ▼
//!    ┌───────────────┐               ┌───────────────┐
//!    │   WaveField   │               │ Water shader  │
//!    │  (field.rs)   │               │  (external)   │
//!    │               │               │               │
//!    │ - Positions   │               │ - Vertex anim │
//!    │ - Normals     │               │ - Normals     │
//!    └───────────────┘               └───────────────┘
//! ```

pub mod config;
pub mod field;

pub use config::{AccumulationMode, Wave, WaveFieldConfig, WavePreset, WaveSet};
pub use field::{SurfaceSample, WaveField};
