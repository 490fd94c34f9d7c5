/// Idealized deep-water depth fed to the dispersion relation.
pub const DEFAULT_WATER_DEPTH: f32 = 10.0;
/// Tuned to match the water shader, not physical gravity.
pub const DEFAULT_GRAVITY: f32 = 9.0;
/// Horizontal step of the finite-difference normal estimate.
pub const DEFAULT_NORMAL_STEP: f32 = 1.0;
pub const DEFAULT_BASE_LEVEL: f32 = 0.0;
/// Sample points shared by every consumer (130 x 130 grid).
pub const DEFAULT_SAMPLE_CAPACITY: usize = 16_900;
/// Points evaluated by one task of the per-frame batch.
pub const DEFAULT_POINTS_PER_TASK: usize = 256;
/// Completion polls before falling back to a blocking wait.
pub const DEFAULT_SPIN_BEFORE_BLOCK: u32 = 64;
