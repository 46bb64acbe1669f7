use std::time::Instant;

use crate::foundation::core::ColumnRange;
use crate::foundation::error::SlicecastResult;
use crate::memory::arena::FrameArena;
use crate::scene::FrameState;
use crate::scene::timings::PassTimings;
use crate::stages::{StageFactory, StageKind, StageSet};
use crate::target::canvas::{Canvas, PixelFormat, Viewport};
use crate::target::drawers::{PixelDrawers, drawers_for};
use crate::worker::clip::ClipBands;
use crate::worker::queue::{DrawCommand, DrawQueue};

/// All mutable state one worker needs to rasterize its column range.
///
/// Exclusively owned by one worker for the lifetime of a frame: the
/// orchestrator lends each worker's state to exactly one pipeline task, so no
/// lock guards any of it. Between [`reset`](Self::reset) and the drain, only
/// that worker's stages touch the arena, clip bands, and queue.
pub struct WorkerState {
    index: usize,
    main_worker: bool,
    range: ColumnRange,
    arena: FrameArena,
    clip: ClipBands,
    queue: DrawQueue,
    timings: PassTimings,
}

impl WorkerState {
    fn new(index: usize, main_worker: bool, max_width: u32, max_arena_bytes: usize) -> Self {
        Self {
            index,
            main_worker,
            range: ColumnRange::empty_at(0),
            arena: FrameArena::new(max_arena_bytes),
            clip: ClipBands::new(max_width),
            queue: DrawQueue::default(),
            timings: PassTimings::default(),
        }
    }

    /// Position of this worker in the orchestrator's drain order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Return `true` for the worker that runs on the calling thread.
    pub fn is_main(&self) -> bool {
        self.main_worker
    }

    /// The column range assigned for the current frame.
    pub fn range(&self) -> ColumnRange {
        self.range
    }

    /// The worker's scratch arena.
    pub fn arena(&self) -> &FrameArena {
        &self.arena
    }

    /// Mutable access to the scratch arena.
    pub fn arena_mut(&mut self) -> &mut FrameArena {
        &mut self.arena
    }

    /// The worker's clip-height bands.
    pub fn clip(&self) -> &ClipBands {
        &self.clip
    }

    /// Mutable access to the clip-height bands.
    pub fn clip_mut(&mut self) -> &mut ClipBands {
        &mut self.clip
    }

    /// Number of draw commands queued so far this frame.
    pub fn queued_commands(&self) -> usize {
        self.queue.len()
    }

    /// Append a deferred draw command to this worker's queue.
    pub fn push_command(&mut self, command: Box<dyn DrawCommand>) {
        self.queue.push(command);
    }

    /// Pass timing accumulators for the current frame.
    pub fn timings(&self) -> &PassTimings {
        &self.timings
    }

    /// The pixel-writing primitives for `format`; read-only dispatch.
    pub fn drawers(&self, format: PixelFormat) -> &'static dyn PixelDrawers {
        drawers_for(format)
    }

    fn reset(&mut self, range: ColumnRange) {
        self.range = range;
        self.arena.reset();
        self.clip.mark_unopened();
        self.queue.clear();
        self.timings.reset();
    }
}

/// One worker: its mutable state plus its per-worker pipeline stage handles.
///
/// Contexts are created when the orchestrator is initialized, persist across
/// frames and screen resizes, and are dropped at teardown.
pub struct WorkerContext {
    state: WorkerState,
    stages: StageSet,
}

impl WorkerContext {
    pub(crate) fn new(
        index: usize,
        main_worker: bool,
        max_width: u32,
        max_arena_bytes: usize,
        factory: &dyn StageFactory,
    ) -> Self {
        Self {
            state: WorkerState::new(index, main_worker, max_width, max_arena_bytes),
            stages: factory.build_stages(index, main_worker),
        }
    }

    /// Read access to the worker's state, for diagnostics and overlays.
    pub fn state(&self) -> &WorkerState {
        &self.state
    }

    /// Assign the frame's column range and drop all per-frame state.
    ///
    /// Idempotent: calling it twice before the pipeline runs leaks nothing.
    pub(crate) fn reset(&mut self, range: ColumnRange) {
        self.state.reset(range);
    }

    /// Run the fixed stage sequence over this worker's column range.
    ///
    /// An empty range short-circuits every stage as a no-op.
    pub(crate) fn run_pipeline(&mut self, frame: &FrameState) -> SlicecastResult<()> {
        if self.state.range.is_empty() {
            return Ok(());
        }
        for kind in StageKind::SEQUENCE {
            let started = Instant::now();
            self.stages.get_mut(kind).run(&mut self.state, frame)?;
            self.state.timings.record(kind, started.elapsed());
        }
        tracing::trace!(
            worker = self.state.index,
            commands = self.state.queue.len(),
            arena_bytes = self.state.arena.used_bytes(),
            "worker pipeline complete"
        );
        Ok(())
    }

    /// Execute this worker's queued commands against the destination, then
    /// clear the queue. Called by the orchestrator in worker-index order.
    pub(crate) fn drain_queue(
        &mut self,
        canvas: &mut Canvas,
        viewport: Viewport,
    ) -> SlicecastResult<u64> {
        self.state.queue.execute_all(canvas, viewport)
    }

    /// Reallocate width-dependent buffers after a screen resize.
    pub(crate) fn screen_resized(&mut self, max_width: u32) {
        self.state.clip.reallocate(max_width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::DefaultStages;

    fn context(index: usize) -> WorkerContext {
        WorkerContext::new(index, index == 0, 64, 1 << 16, &DefaultStages)
    }

    #[test]
    fn reset_clears_all_per_frame_state() {
        let mut ctx = context(0);
        ctx.state.arena.alloc(100).unwrap();
        ctx.state.queue.push(Box::new(crate::worker::queue::FillColumns {
            columns: ColumnRange::new(0, 1).unwrap(),
            color: crate::target::canvas::Color(1),
        }));

        let range = ColumnRange::new(4, 8).unwrap();
        ctx.reset(range);
        ctx.reset(range); // idempotent

        assert_eq!(ctx.state.range(), range);
        assert_eq!(ctx.state.arena().used_bytes(), 0);
        assert_eq!(ctx.state.queued_commands(), 0);
        assert!(ctx.state.clip().opened().is_empty());
    }

    #[test]
    fn empty_range_short_circuits_the_pipeline() {
        let mut ctx = context(3);
        ctx.reset(ColumnRange::empty_at(5));

        let frame = crate::scene::FrameState::for_tests(8, 8);
        ctx.run_pipeline(&frame).unwrap();

        // No stage ran: the clip bands were never opened.
        assert!(ctx.state.clip().opened().is_empty());
        assert_eq!(ctx.state.queued_commands(), 0);
    }

    #[test]
    fn drawer_dispatch_follows_the_destination_format() {
        let ctx = context(0);
        assert_eq!(
            ctx.state().drawers(PixelFormat::Truecolor).format(),
            PixelFormat::Truecolor
        );
        assert_eq!(
            ctx.state().drawers(PixelFormat::Palettized).format(),
            PixelFormat::Palettized
        );
    }

    #[test]
    fn pipeline_opens_clip_bands_over_the_range() {
        let mut ctx = context(0);
        let range = ColumnRange::new(2, 6).unwrap();
        ctx.reset(range);

        let frame = crate::scene::FrameState::for_tests(8, 16);
        ctx.run_pipeline(&frame).unwrap();

        assert_eq!(ctx.state.clip().opened(), range);
        assert_eq!(ctx.state.clip().bottom(2), 16);
    }
}
