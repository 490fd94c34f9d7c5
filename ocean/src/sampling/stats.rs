use serde::Serialize;

/// Running counters of the frame scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FrameStats {
    pub frames_dispatched: u64,
    pub frames_completed: u64,
    /// Dispatches refused because the previous batch was still in flight
    pub dispatches_dropped: u64,
    /// Points covered by the most recently completed batch
    pub points_last_batch: usize,
    /// Tasks the most recently completed batch was split into
    pub tasks_last_batch: usize,
}

/// Snapshot of the scheduler's lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameState {
    pub in_flight: bool,
    /// True until the first batch is dispatched
    pub is_first_frame: bool,
    /// Live extent of the sample buffer
    pub occupied_count: usize,
}
