use std::time::Instant;

use tracing::{debug, trace};

use crate::foundation::core::{Viewpoint, ViewTransform};
use crate::foundation::error::{SlicecastError, SlicecastResult};
use crate::scene::FrameState;
use crate::scene::slice::slice_columns;
use crate::scene::timings::FrameTimings;
use crate::stages::StageFactory;
use crate::target::canvas::{Canvas, Color, Viewport};
use crate::target::drawers::drawers_for;
use crate::worker::context::WorkerContext;

/// Configuration for a [`SceneRenderer`].
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SceneOpts {
    /// Explicit worker count. `None` uses the host's available parallelism.
    pub workers: Option<usize>,
    /// Maximum supported screen width; bounds clip-band capacity.
    pub max_width: u32,
    /// Hard cap on each worker's scratch arena, in bytes.
    pub max_arena_bytes: usize,
    /// Initial frame-clear color.
    pub clear_color: Color,
    /// Skip the line-mapping debug behavior in the pipeline.
    pub suppress_line_mapping: bool,
}

impl Default for SceneOpts {
    fn default() -> Self {
        Self {
            workers: None,
            max_width: 3840,
            max_arena_bytes: 64 << 20,
            clear_color: Color(0),
            suppress_line_mapping: false,
        }
    }
}

impl SceneOpts {
    /// Parse options from a JSON document; missing fields take defaults.
    pub fn from_json_str(json: &str) -> SlicecastResult<Self> {
        let opts: SceneOpts =
            serde_json::from_str(json).map_err(|e| SlicecastError::serde(e.to_string()))?;
        opts.validate()?;
        Ok(opts)
    }

    fn validate(&self) -> SlicecastResult<()> {
        if let Some(n) = self.workers
            && n == 0
        {
            return Err(SlicecastError::validation(
                "scene 'workers' must be >= 1 when set",
            ));
        }
        if self.max_width == 0 {
            return Err(SlicecastError::validation("scene 'max_width' must be > 0"));
        }
        if self.max_arena_bytes == 0 {
            return Err(SlicecastError::validation(
                "scene 'max_arena_bytes' must be > 0",
            ));
        }
        Ok(())
    }
}

/// Aggregated statistics for one rendered frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameStats {
    /// Workers that received a non-empty column range.
    pub workers_used: usize,
    /// Draw commands executed during the drain phase.
    pub commands_executed: u64,
    /// Columns rendered (the viewport width).
    pub columns: u32,
    /// Frame-wide timing counters for this frame.
    pub timings: FrameTimings,
}

/// Internal per-frame drive state; asserted in debug builds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DriveState {
    Idle,
    Sliced,
    Pipelining,
    Draining,
}

/// The scene orchestrator: slices frames into column ranges, drives every
/// worker through the fixed pipeline sequence, and drains the resulting draw
/// commands into the destination in worker order.
///
/// # Drive loop
///
/// Each [`render_view`](Self::render_view) call runs three phases:
///
/// 1. **Slice** — column ranges are computed ([`slice_columns`]) and each
///    worker context is reset with its range.
/// 2. **Parallel pipeline** — every worker runs the fixed stage sequence over
///    its own range; the main worker (index 0) runs on the calling thread,
///    the rest on the renderer's worker pool. Workers share only the
///    immutable [`FrameState`] snapshot.
/// 3. **Drain** — after a full barrier, each worker's queue is executed into
///    the destination in worker-index order. Deterministic drain order keeps
///    instrumentation and backends with global side effects reproducible.
///
/// A second in-flight frame on the same renderer is statically impossible:
/// `render_view` borrows the renderer and the destination mutably.
///
/// [`slice_columns`]: crate::slice_columns
pub struct SceneRenderer {
    workers: Vec<WorkerContext>,
    pool: Option<rayon::ThreadPool>,
    opts: SceneOpts,
    clear_color: Color,
    timings: FrameTimings,
    frame_serial: u64,
    state: DriveState,
}

impl SceneRenderer {
    /// Construct the renderer: resolve the worker count, build every worker
    /// context and its stage handles, and build the worker thread pool.
    ///
    /// Worker count is `opts.workers` when set, otherwise the host's
    /// available parallelism; always at least one (the main worker).
    pub fn new(opts: SceneOpts, factory: &dyn StageFactory) -> SlicecastResult<Self> {
        opts.validate()?;
        let count = resolve_worker_count(opts.workers);

        let mut workers = Vec::with_capacity(count);
        for index in 0..count {
            workers.push(WorkerContext::new(
                index,
                index == 0,
                opts.max_width,
                opts.max_arena_bytes,
                factory,
            ));
        }
        let pool = build_worker_pool(count)?;

        debug!(
            workers = count,
            max_width = opts.max_width,
            "scene renderer initialized"
        );
        Ok(Self {
            workers,
            pool,
            clear_color: opts.clear_color,
            opts,
            timings: FrameTimings::default(),
            frame_serial: 0,
            state: DriveState::Idle,
        })
    }

    /// Number of worker contexts (fixed at construction).
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// The main worker's context, for diagnostics and overlays that need
    /// single-threaded access to frame state after rendering completes.
    pub fn main_worker(&self) -> &WorkerContext {
        &self.workers[0]
    }

    /// Frame-wide timing counters for the most recent frame.
    pub fn timings(&self) -> FrameTimings {
        self.timings
    }

    /// Whether stages skip the line-mapping debug behavior.
    pub fn suppress_line_mapping(&self) -> bool {
        self.opts.suppress_line_mapping
    }

    /// Update the frame-clear color; takes effect starting the next frame.
    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    /// Reallocate width-dependent buffers in every worker context.
    ///
    /// Worker count and identity are preserved. Legal only between frames,
    /// which the `&mut self` receiver enforces.
    pub fn screen_resized(&mut self, width: u32, height: u32) -> SlicecastResult<()> {
        debug_assert_eq!(self.state, DriveState::Idle);
        if width == 0 || height == 0 {
            return Err(SlicecastError::validation(
                "screen_resized dimensions must be non-zero",
            ));
        }
        if width > self.opts.max_width {
            return Err(SlicecastError::validation(format!(
                "screen width {width} exceeds configured max_width {}",
                self.opts.max_width
            )));
        }
        for worker in &mut self.workers {
            worker.screen_resized(self.opts.max_width);
        }
        debug!(width, height, "screen resized");
        Ok(())
    }

    /// Render a frame from `viewpoint` over the whole destination canvas.
    ///
    /// Clears the destination, establishes the view parameters, then runs the
    /// three-phase drive loop. Returns per-frame statistics.
    pub fn render_view(
        &mut self,
        viewpoint: &Viewpoint,
        canvas: &mut Canvas,
    ) -> SlicecastResult<FrameStats> {
        let viewport = Viewport::full(canvas);
        let suppress = self.opts.suppress_line_mapping;
        self.render_actor_view(viewpoint, canvas, viewport, suppress)
    }

    /// Render a view from an arbitrary actor's perspective into a sub-region
    /// of an off-screen canvas, bypassing the primary display surface.
    #[allow(clippy::too_many_arguments)]
    pub fn render_view_to_canvas(
        &mut self,
        actor_view: &Viewpoint,
        canvas: &mut Canvas,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        suppress_line_mapping: bool,
    ) -> SlicecastResult<FrameStats> {
        let viewport = Viewport {
            x,
            y,
            width,
            height,
        };
        self.render_actor_view(actor_view, canvas, viewport, suppress_line_mapping)
    }

    fn render_actor_view(
        &mut self,
        viewpoint: &Viewpoint,
        canvas: &mut Canvas,
        viewport: Viewport,
        suppress_line_mapping: bool,
    ) -> SlicecastResult<FrameStats> {
        if viewport.width == 0 || viewport.height == 0 {
            return Err(SlicecastError::validation(
                "render viewport must be non-empty",
            ));
        }
        if !viewport.fits(canvas) {
            return Err(SlicecastError::validation(
                "render viewport must lie within the destination canvas",
            ));
        }
        if viewport.width > self.opts.max_width {
            return Err(SlicecastError::validation(format!(
                "render viewport width {} exceeds configured max_width {}",
                viewport.width, self.opts.max_width
            )));
        }

        let result = self.drive(viewpoint, canvas, viewport, suppress_line_mapping);
        self.state = DriveState::Idle;
        result
    }

    fn drive(
        &mut self,
        viewpoint: &Viewpoint,
        canvas: &mut Canvas,
        viewport: Viewport,
        suppress_line_mapping: bool,
    ) -> SlicecastResult<FrameStats> {
        debug_assert_eq!(self.state, DriveState::Idle);
        let frame_started = Instant::now();
        self.frame_serial += 1;

        // Once-only frame setup, owned by the main worker's (calling) thread:
        // frame-wide counters reset and view transform established before any
        // worker runs.
        self.timings = FrameTimings::default();
        let frame = FrameState {
            viewpoint: *viewpoint,
            view: ViewTransform::establish(viewpoint, viewport.width, viewport.height),
            viewport,
            format: canvas.format(),
            clear_color: self.clear_color,
            suppress_line_mapping,
            frame_serial: self.frame_serial,
        };

        drawers_for(canvas.format()).fill_rect(canvas, viewport, self.clear_color);

        // Phase 1: slice.
        self.state = DriveState::Sliced;
        let ranges = slice_columns(viewport.width, self.workers.len());
        for (worker, range) in self.workers.iter_mut().zip(&ranges) {
            worker.reset(*range);
        }

        // Phase 2: parallel pipeline. The scope end is the barrier; no drain
        // happens until every worker has reported.
        self.state = DriveState::Pipelining;
        let mut main_result: SlicecastResult<()> = Ok(());
        let mut rest_results: Vec<SlicecastResult<()>> = Vec::new();
        {
            let (main, rest) = self.workers.split_at_mut(1);
            rest_results.resize_with(rest.len(), || Ok(()));
            match self.pool.as_ref() {
                Some(pool) => pool.in_place_scope(|scope| {
                    for (worker, slot) in rest.iter_mut().zip(rest_results.iter_mut()) {
                        let frame = &frame;
                        scope.spawn(move |_| *slot = worker.run_pipeline(frame));
                    }
                    main_result = main[0].run_pipeline(&frame);
                }),
                None => {
                    main_result = main[0].run_pipeline(&frame);
                    for (worker, slot) in rest.iter_mut().zip(rest_results.iter_mut()) {
                        *slot = worker.run_pipeline(&frame);
                    }
                }
            }
        }

        // Any failure aborts the whole frame: the first error in worker order
        // wins and nothing reaches the drain phase.
        main_result?;
        for result in rest_results {
            result?;
        }

        // Phase 3: serialized drain, strict worker-index order.
        self.state = DriveState::Draining;
        let mut commands_executed = 0u64;
        for worker in &mut self.workers {
            self.timings.passes.merge(worker.state().timings());
            commands_executed += worker.drain_queue(canvas, viewport)?;
        }
        self.timings.frame = frame_started.elapsed();

        let stats = FrameStats {
            workers_used: ranges.iter().filter(|r| !r.is_empty()).count(),
            commands_executed,
            columns: viewport.width,
            timings: self.timings,
        };
        trace!(
            frame = self.frame_serial,
            workers = stats.workers_used,
            commands = commands_executed,
            "frame drained"
        );
        Ok(stats)
    }
}

impl Drop for SceneRenderer {
    fn drop(&mut self) {
        debug!(workers = self.workers.len(), "scene renderer released");
    }
}

fn resolve_worker_count(requested: Option<usize>) -> usize {
    requested.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    })
}

fn build_worker_pool(workers: usize) -> SlicecastResult<Option<rayon::ThreadPool>> {
    if workers <= 1 {
        return Ok(None);
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers - 1)
        .build()
        .map(Some)
        .map_err(|e| SlicecastError::resource(format!("failed to build worker thread pool: {e}")))
}
