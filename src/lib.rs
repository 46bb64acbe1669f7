//! slicecast is the parallel execution core of a software 3D scene rasterizer.
//!
//! It partitions a video frame into vertical column ranges, runs an
//! independent rendering pipeline per range on its own worker context, and
//! recombines the resulting draw commands into a single framebuffer in
//! deterministic order.
//!
//! # Frame overview
//!
//! 1. **Slice**: the destination width is tiled into per-worker
//!    [`ColumnRange`]s ([`slice_columns`]) and each [`WorkerContext`] is reset
//!    with its range.
//! 2. **Pipeline**: every worker runs the fixed [`StageKind::SEQUENCE`] over
//!    its own range — the main worker on the calling thread, the rest on a
//!    dedicated worker pool — writing into its private [`FrameArena`] and
//!    [`DrawQueue`].
//! 3. **Drain**: after a full barrier, the [`SceneRenderer`] executes every
//!    worker's queued commands into the destination [`Canvas`] in strict
//!    worker-index order.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate; per-worker exclusive
//!   ownership is expressed through disjoint `&mut` borrows, never locks.
//! - **Deterministic-by-default**: identical inputs produce byte-identical
//!   framebuffers, independent of the worker count.
//! - **No per-frame allocation churn**: scratch memory comes from a growable,
//!   resettable arena that is reused across frames.
//!
//! The rasterizing passes themselves (walls, planes, sprites, portals) are
//! external collaborators: implement [`RenderStage`] for each and supply them
//! through a [`StageFactory`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
mod memory;
mod scene;
mod stages;
mod target;
mod worker;

pub use foundation::core::{ColumnRange, ViewTransform, Viewpoint};
pub use foundation::error::{SlicecastError, SlicecastResult};
pub use memory::arena::{ArenaRange, ArenaStats, FrameArena};
pub use scene::FrameState;
pub use scene::renderer::{FrameStats, SceneOpts, SceneRenderer};
pub use scene::slice::{SliceTable, slice_columns};
pub use scene::timings::{FrameTimings, PassTimings};
pub use stages::{DefaultStages, RenderStage, StageFactory, StageKind, StageSet};
pub use target::canvas::{Canvas, Color, PixelFormat, Viewport};
pub use target::drawers::{PalDrawers, PixelDrawers, TruecolorDrawers, drawers_for};
pub use worker::clip::ClipBands;
pub use worker::context::{WorkerContext, WorkerState};
pub use worker::queue::{DrawCommand, DrawQueue, FillColumns};
