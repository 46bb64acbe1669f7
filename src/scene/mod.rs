pub(crate) mod renderer;
pub(crate) mod slice;
pub(crate) mod timings;

use crate::foundation::core::{Viewpoint, ViewTransform};
use crate::target::canvas::{Color, PixelFormat, Viewport};

/// Immutable per-frame snapshot shared by every worker.
///
/// Established exactly once per frame on the calling thread before the
/// parallel phase; workers and stages read it through a shared reference and
/// never mutate it.
#[derive(Clone, Copy, Debug)]
pub struct FrameState {
    /// The viewpoint this frame renders from.
    pub viewpoint: Viewpoint,
    /// View values derived once from the viewpoint and viewport.
    pub view: ViewTransform,
    /// Destination sub-rectangle the frame renders into.
    pub viewport: Viewport,
    /// Destination pixel format.
    pub format: PixelFormat,
    /// Color the destination was cleared to.
    pub clear_color: Color,
    /// When set, stages skip the line-mapping debug behavior.
    pub suppress_line_mapping: bool,
    /// Monotonic frame counter, for diagnostics.
    pub frame_serial: u64,
}

#[cfg(test)]
impl FrameState {
    pub(crate) fn for_tests(width: u32, height: u32) -> Self {
        let viewpoint = Viewpoint::default();
        Self {
            viewpoint,
            view: ViewTransform::establish(&viewpoint, width, height),
            viewport: Viewport {
                x: 0,
                y: 0,
                width,
                height,
            },
            format: PixelFormat::Palettized,
            clear_color: Color(0),
            suppress_line_mapping: false,
            frame_serial: 1,
        }
    }
}
