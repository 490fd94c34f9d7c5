//! One batched, parallel wave-field evaluation per frame.
//!
//! Consumers push their sample points, the frame driver calls [`FrameScheduler::dispatch`]
//! once, and consumers later pull displaced positions and normals. The batch is
//! split into tasks on the `AsyncComputeTaskPool`, each covering a disjoint chunk
//! of the occupied slots; the tasks only read the shared inputs and the wave
//! field, so they need no synchronization between them.
//!
//! Anything that touches the buffers completes the in-flight batch first, so a
//! push for frame N+1 never races the batch still reading frame N.

use bevy::math::Vec3;
use bevy::tasks::{block_on, AsyncComputeTaskPool, Task, TaskPool};
use bevy_ecs::resource::Resource;
use bevy_log::{debug, warn};
use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::buffer::SampleBuffer;
use super::error::SamplingError;
use super::registry::{ConsumerId, SampleRange, SampleRegistry};
use super::stats::{FrameState, FrameStats};
use crate::config::{DispatchPolicy, SamplerConfig};
use crate::water::WaveField;

/// Sleep bounds between completion polls of `complete_with_timeout`.
const MIN_POLL_BACKOFF: Duration = Duration::from_micros(50);
const MAX_POLL_BACKOFF: Duration = Duration::from_millis(2);

#[inline]
fn next_poll_backoff(current: Duration) -> Duration {
    (current * 2).min(MAX_POLL_BACKOFF)
}

/// Output of one task of a batch.
struct ChunkResult {
    start: usize,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
}

struct PendingBatch {
    frame: u64,
    points: usize,
    tasks: Vec<Task<ChunkResult>>,
}

impl PendingBatch {
    fn is_finished(&self) -> bool {
        self.tasks.iter().all(Task::is_finished)
    }
}

enum BatchState {
    Idle,
    Dispatched(PendingBatch),
}

/// Evaluates the slots of `chunk` that fall inside `valid`.
///
/// Slots outside `valid` are skipped, never zero-filled.
fn evaluate_chunk(
    field: &WaveField,
    inputs: &[Vec3],
    chunk: Range<usize>,
    valid: Range<usize>,
    time: f32,
) -> ChunkResult {
    let start = chunk.start.max(valid.start);
    let end = chunk.end.min(valid.end).max(start);

    let mut positions = Vec::with_capacity(end - start);
    let mut normals = Vec::with_capacity(end - start);
    for point in &inputs[start..end] {
        let sample = field.evaluate_point(*point, time);
        positions.push(sample.position);
        normals.push(sample.normal);
    }

    ChunkResult {
        start,
        positions,
        normals,
    }
}

/// Owner of the sample registry, the shared buffers and the per-frame batch.
#[derive(Resource)]
pub struct FrameScheduler {
    field: Arc<WaveField>,
    config: SamplerConfig,
    registry: SampleRegistry,
    buffer: SampleBuffer,
    state: BatchState,
    first_frame: bool,
    stats: FrameStats,
}

impl FrameScheduler {
    pub fn new(field: WaveField, config: SamplerConfig) -> Self {
        Self {
            field: Arc::new(field),
            registry: SampleRegistry::new(config.capacity),
            buffer: SampleBuffer::new(config.capacity),
            config,
            state: BatchState::Idle,
            first_frame: true,
            stats: FrameStats::default(),
        }
    }

    pub fn field(&self) -> &WaveField {
        &self.field
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn registry(&self) -> &SampleRegistry {
        &self.registry
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn capacity(&self) -> usize {
        self.registry.capacity()
    }

    pub fn occupied_count(&self) -> usize {
        self.registry.occupied()
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, BatchState::Dispatched(_))
    }

    pub fn frame_state(&self) -> FrameState {
        FrameState {
            in_flight: self.is_in_flight(),
            is_first_frame: self.first_frame,
            occupied_count: self.registry.occupied(),
        }
    }

    /// Reserves `count` slots for `id`. See [`SampleRegistry::register`].
    ///
    /// Safe while a batch is in flight: new slots lie past the extent the
    /// batch captured.
    pub fn register(&mut self, id: ConsumerId, count: usize) -> Result<SampleRange, SamplingError> {
        let result = self.registry.register(id, count);
        if let Err(SamplingError::CapacityExceeded {
            requested,
            available,
        }) = &result
        {
            warn!(
                "Sample consumer {} left unserved: needs {} points, {} available",
                id, requested, available
            );
        }
        result
    }

    /// Releases the slots of `id` and compacts the buffer.
    ///
    /// Consumers above the released range are moved down together with their
    /// last inputs and results.
    pub fn unregister(&mut self, id: ConsumerId) -> Result<SampleRange, SamplingError> {
        self.complete_if_pending();

        let occupied = self.registry.occupied();
        let removed = self.registry.unregister(id)?;
        self.buffer.compact(removed, occupied);
        Ok(removed)
    }

    /// Copies the consumer's current sample points into its slots.
    pub fn push_samples(&mut self, id: ConsumerId, samples: &[Vec3]) -> Result<(), SamplingError> {
        self.complete_if_pending();

        let range = self.checked_range(id, samples.len())?;
        self.buffer.write_inputs(range, samples);
        Ok(())
    }

    /// Copies the consumer's latest results out, completing the batch first.
    ///
    /// Before the first dispatch this returns the default-initialized outputs.
    pub fn pull_results(
        &mut self,
        id: ConsumerId,
        out_positions: &mut [Vec3],
        out_normals: Option<&mut [Vec3]>,
    ) -> Result<(), SamplingError> {
        self.complete_if_pending();

        let range = self.checked_range(id, out_positions.len())?;
        if let Some(normals) = &out_normals {
            self.checked_range(id, normals.len())?;
        }
        self.buffer.read_outputs(range, out_positions, out_normals);
        Ok(())
    }

    fn checked_range(&self, id: ConsumerId, len: usize) -> Result<SampleRange, SamplingError> {
        let range = self.registry.range_of(id)?;
        if range.len() != len {
            return Err(SamplingError::LengthMismatch {
                consumer: id,
                expected: range.len(),
                actual: len,
            });
        }
        Ok(range)
    }

    /// Launches the frame's batch over every occupied slot.
    ///
    /// Returns the frame number of the new batch. While a batch is still in
    /// flight the behavior follows [`SamplerConfig::dispatch_policy`].
    pub fn dispatch(&mut self, time: f32) -> Result<u64, SamplingError> {
        if let BatchState::Dispatched(batch) = &self.state {
            let in_flight = batch.frame;
            match self.config.dispatch_policy {
                DispatchPolicy::Drop => {
                    self.stats.dispatches_dropped += 1;
                    warn!(
                        "Dropping wave batch dispatch: frame {} still in flight ({} dropped so far)",
                        in_flight, self.stats.dispatches_dropped
                    );
                    return Err(SamplingError::ConcurrentDispatchDropped { in_flight });
                }
                DispatchPolicy::Block => self.complete_if_pending(),
            }
        }

        let occupied = self.registry.occupied();
        let inputs = self.buffer.share_inputs();
        let chunk_size = self.config.points_per_task.max(1);
        let pool = AsyncComputeTaskPool::get_or_init(TaskPool::new);

        let tasks: Vec<Task<ChunkResult>> = (0..occupied)
            .step_by(chunk_size)
            .map(|start| {
                let chunk = start..(start + chunk_size).min(occupied);
                let field = Arc::clone(&self.field);
                let inputs = Arc::clone(&inputs);
                pool.spawn(async move { evaluate_chunk(&field, &inputs, chunk, 0..occupied, time) })
            })
            .collect();

        self.stats.frames_dispatched += 1;
        let frame = self.stats.frames_dispatched;
        debug!(
            "Dispatched wave batch for frame {}: {} points in {} tasks",
            frame,
            occupied,
            tasks.len()
        );

        self.state = BatchState::Dispatched(PendingBatch {
            frame,
            points: occupied,
            tasks,
        });
        self.first_frame = false;

        Ok(frame)
    }

    /// Blocks until the in-flight batch has finished and stores its results.
    ///
    /// A no-op when nothing is in flight, including before the first dispatch.
    pub fn complete_if_pending(&mut self) {
        let BatchState::Dispatched(batch) = std::mem::replace(&mut self.state, BatchState::Idle)
        else {
            return;
        };

        for _ in 0..self.config.spin_before_block {
            if batch.is_finished() {
                break;
            }
            std::hint::spin_loop();
        }

        self.finish(batch);
    }

    /// Stores the results if the in-flight batch is done, without blocking.
    ///
    /// Returns true when no batch is in flight afterwards.
    pub fn try_complete(&mut self) -> bool {
        match &self.state {
            BatchState::Idle => true,
            BatchState::Dispatched(batch) if batch.is_finished() => {
                self.complete_if_pending();
                true
            }
            BatchState::Dispatched(_) => false,
        }
    }

    /// Like [`complete_if_pending`](Self::complete_if_pending) but gives up after
    /// `timeout`, leaving the batch in flight.
    pub fn complete_with_timeout(&mut self, timeout: Duration) -> Result<(), SamplingError> {
        let deadline = Instant::now() + timeout;
        let mut backoff = MIN_POLL_BACKOFF;

        loop {
            if self.try_complete() {
                return Ok(());
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep(backoff.min(deadline - now));
            backoff = next_poll_backoff(backoff);
        }

        let frame = match &self.state {
            BatchState::Dispatched(batch) => batch.frame,
            BatchState::Idle => return Ok(()),
        };
        warn!("Wave batch for frame {} still running after {:?}", frame, timeout);
        Err(SamplingError::BatchTimedOut {
            frame,
            waited: timeout,
        })
    }

    fn finish(&mut self, batch: PendingBatch) {
        let task_count = batch.tasks.len();
        for task in batch.tasks {
            let chunk = block_on(task);
            self.buffer
                .store_outputs(chunk.start, &chunk.positions, &chunk.normals);
        }

        self.stats.frames_completed += 1;
        self.stats.points_last_batch = batch.points;
        self.stats.tasks_last_batch = task_count;
    }
}
