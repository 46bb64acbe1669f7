use std::time::Duration;

use crate::stages::StageKind;

/// Wall-clock accumulators for one worker's pass execution.
///
/// Each worker owns a private instance during the parallel phase; the
/// orchestrator merges them into the frame-wide [`FrameTimings`] during the
/// serialized drain phase, so no counter is ever shared between threads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassTimings {
    /// Time spent in the opaque wall pass.
    pub wall: Duration,
    /// Time spent in the plane/horizon pass.
    pub plane: Duration,
    /// Time spent in the masked passes (translucent, sprites, player sprites).
    pub masked: Duration,
    /// Time spent in clip bookkeeping (clip setup, 3D floors, portals).
    pub wall_scan: Duration,
}

impl PassTimings {
    pub(crate) fn record(&mut self, kind: StageKind, elapsed: Duration) {
        let bucket = match kind {
            StageKind::Opaque => &mut self.wall,
            StageKind::Planes => &mut self.plane,
            StageKind::Translucent | StageKind::Sprites | StageKind::PlayerSprites => {
                &mut self.masked
            }
            StageKind::ClipSetup | StageKind::Clip3DFloors | StageKind::Portals => {
                &mut self.wall_scan
            }
        };
        *bucket = bucket.saturating_add(elapsed);
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn merge(&mut self, other: &PassTimings) {
        self.wall = self.wall.saturating_add(other.wall);
        self.plane = self.plane.saturating_add(other.plane);
        self.masked = self.masked.saturating_add(other.masked);
        self.wall_scan = self.wall_scan.saturating_add(other.wall_scan);
    }
}

/// Frame-wide timing counters, reset at the start of every frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameTimings {
    /// Wall-clock duration of the whole drive loop.
    pub frame: Duration,
    /// Pass counters accumulated across all workers.
    pub passes: PassTimings,
}
