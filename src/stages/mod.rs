//! The fixed per-worker pipeline stage sequence and its extension seam.
//!
//! The rasterizing passes proper (wall scanning, plane filling, sprite
//! drawing) are external collaborators: the surrounding engine implements
//! [`RenderStage`] for each and supplies them through a [`StageFactory`].
//! This module pins down what the orchestrator guarantees them: a closed,
//! ordered sequence, one live handle per stage per worker, and exclusive
//! access to that worker's state while running.

use crate::foundation::error::SlicecastResult;
use crate::scene::FrameState;
use crate::worker::context::WorkerState;

/// Identifies one stage of the fixed per-worker pipeline sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// Clip-segment setup: opens the clip bands over the worker's range.
    ClipSetup,
    /// 3D-floor clip pass.
    Clip3DFloors,
    /// Opaque wall pass.
    Opaque,
    /// Plane/horizon pass.
    Planes,
    /// Masked/translucent surface pass.
    Translucent,
    /// Sprite pass.
    Sprites,
    /// Player-sprite pass.
    PlayerSprites,
    /// Portal resolution.
    Portals,
}

impl StageKind {
    /// The fixed execution order. Stage N for any worker never depends on
    /// stage N's output from a different worker; within one worker, later
    /// stages may consume what earlier stages produced.
    pub const SEQUENCE: [StageKind; 8] = [
        StageKind::ClipSetup,
        StageKind::Clip3DFloors,
        StageKind::Opaque,
        StageKind::Planes,
        StageKind::Translucent,
        StageKind::Sprites,
        StageKind::PlayerSprites,
        StageKind::Portals,
    ];

    /// Stable lowercase name, used in trace output.
    pub fn name(self) -> &'static str {
        match self {
            StageKind::ClipSetup => "clip_setup",
            StageKind::Clip3DFloors => "clip_3d_floors",
            StageKind::Opaque => "opaque",
            StageKind::Planes => "planes",
            StageKind::Translucent => "translucent",
            StageKind::Sprites => "sprites",
            StageKind::PlayerSprites => "player_sprites",
            StageKind::Portals => "portals",
        }
    }
}

/// One pipeline stage, owned by one worker and reused across frames.
///
/// A stage executes strictly within its worker's column range. It may
/// allocate from the worker's arena and append to the worker's draw queue; it
/// never touches another worker's state (the `&mut WorkerState` borrow makes
/// that impossible). Per-frame internal state is the stage's own concern —
/// reset it at the top of `run`, not from the context.
pub trait RenderStage: Send {
    /// Execute the stage over the worker's column range.
    fn run(&mut self, state: &mut WorkerState, frame: &FrameState) -> SlicecastResult<()>;
}

/// The per-worker set of stage handles, one live instance per [`StageKind`].
///
/// Constructed once per worker at renderer initialization and reused across
/// frames and screen resizes.
pub struct StageSet {
    /// Clip-segment setup handle.
    pub clip_setup: Box<dyn RenderStage>,
    /// 3D-floor clipper handle.
    pub clip_3d_floors: Box<dyn RenderStage>,
    /// Opaque pass handle.
    pub opaque: Box<dyn RenderStage>,
    /// Plane list handle.
    pub planes: Box<dyn RenderStage>,
    /// Translucent pass handle.
    pub translucent: Box<dyn RenderStage>,
    /// Sprite list handle.
    pub sprites: Box<dyn RenderStage>,
    /// Player-sprite renderer handle.
    pub player_sprites: Box<dyn RenderStage>,
    /// Portal stack handle.
    pub portals: Box<dyn RenderStage>,
}

impl StageSet {
    /// The handle for `kind`.
    pub fn get_mut(&mut self, kind: StageKind) -> &mut dyn RenderStage {
        match kind {
            StageKind::ClipSetup => self.clip_setup.as_mut(),
            StageKind::Clip3DFloors => self.clip_3d_floors.as_mut(),
            StageKind::Opaque => self.opaque.as_mut(),
            StageKind::Planes => self.planes.as_mut(),
            StageKind::Translucent => self.translucent.as_mut(),
            StageKind::Sprites => self.sprites.as_mut(),
            StageKind::PlayerSprites => self.player_sprites.as_mut(),
            StageKind::Portals => self.portals.as_mut(),
        }
    }

    /// The built-in minimal set: clip setup opens the bands, every rasterizing
    /// pass slot is inert until the engine supplies its own.
    pub fn builtin() -> Self {
        Self {
            clip_setup: Box::new(ClipSetupStage),
            clip_3d_floors: Box::new(InertStage),
            opaque: Box::new(InertStage),
            planes: Box::new(InertStage),
            translucent: Box::new(InertStage),
            sprites: Box::new(InertStage),
            player_sprites: Box::new(InertStage),
            portals: Box::new(InertStage),
        }
    }
}

/// Builds one [`StageSet`] per worker at renderer construction time.
pub trait StageFactory {
    /// Build the stage handles for the worker with the given identity.
    fn build_stages(&self, worker_index: usize, main_worker: bool) -> StageSet;
}

/// Factory producing [`StageSet::builtin`] for every worker.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultStages;

impl StageFactory for DefaultStages {
    fn build_stages(&self, _worker_index: usize, _main_worker: bool) -> StageSet {
        StageSet::builtin()
    }
}

/// Opens the worker's clip bands over its column range for the new frame.
struct ClipSetupStage;

impl RenderStage for ClipSetupStage {
    fn run(&mut self, state: &mut WorkerState, frame: &FrameState) -> SlicecastResult<()> {
        let range = state.range();
        state.clip_mut().open_range(range, frame.viewport.height);
        Ok(())
    }
}

/// Placeholder for an externally supplied rasterizing pass.
struct InertStage;

impl RenderStage for InertStage {
    fn run(&mut self, _state: &mut WorkerState, _frame: &FrameState) -> SlicecastResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_starts_with_clip_setup_and_ends_with_portals() {
        assert_eq!(StageKind::SEQUENCE[0], StageKind::ClipSetup);
        assert_eq!(StageKind::SEQUENCE[7], StageKind::Portals);
        assert_eq!(StageKind::SEQUENCE.len(), 8);
    }

    #[test]
    fn get_mut_addresses_every_slot() {
        let mut set = StageSet::builtin();
        for kind in StageKind::SEQUENCE {
            // Each slot must resolve without panicking.
            let _ = set.get_mut(kind);
        }
    }
}
