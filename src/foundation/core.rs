use crate::foundation::error::{SlicecastError, SlicecastResult};

/// Half-open span of framebuffer columns `[x1, x2)`.
///
/// Column indices are local to the destination viewport. A worker owns exactly
/// one range per frame; ranges across workers tile the viewport width with no
/// gap or overlap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ColumnRange {
    /// Inclusive first column.
    pub x1: u32,
    /// Exclusive last column.
    pub x2: u32, // exclusive
}

impl ColumnRange {
    /// Create a validated range with `x1 <= x2`.
    pub fn new(x1: u32, x2: u32) -> SlicecastResult<Self> {
        if x1 > x2 {
            return Err(SlicecastError::validation("ColumnRange x1 must be <= x2"));
        }
        Ok(Self { x1, x2 })
    }

    /// The empty range `[x, x)`.
    pub fn empty_at(x: u32) -> Self {
        Self { x1: x, x2: x }
    }

    /// Number of columns contained in the range.
    pub fn len(self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    /// Return `true` when the range has no columns.
    pub fn is_empty(self) -> bool {
        self.x1 == self.x2
    }

    /// Return `true` when `x` is inside `[x1, x2)`.
    pub fn contains(self, x: u32) -> bool {
        self.x1 <= x && x < self.x2
    }
}

/// Observer position and orientation for one frame.
///
/// Read-only during a frame; the renderer snapshots it into [`FrameState`]
/// before the parallel phase begins.
///
/// [`FrameState`]: crate::FrameState
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewpoint {
    /// World-space position.
    pub pos: [f64; 3],
    /// Yaw angle in radians.
    pub angle: f64,
    /// Horizontal field of view in radians, must be in `(0, pi)`.
    pub fov: f64,
}

impl Default for Viewpoint {
    fn default() -> Self {
        Self {
            pos: [0.0; 3],
            angle: 0.0,
            fov: std::f64::consts::FRAC_PI_2,
        }
    }
}

/// Per-frame values derived from the viewpoint and viewport dimensions.
///
/// Established exactly once per frame on the calling thread, before any worker
/// runs; workers read it through the shared frame snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    /// Sine of the view yaw angle.
    pub sin_angle: f64,
    /// Cosine of the view yaw angle.
    pub cos_angle: f64,
    /// Focal length in pixels for the viewport width and field of view.
    pub focal: f64,
    /// Horizontal projection center in viewport columns.
    pub center_x: f64,
    /// Vertical projection center in viewport rows.
    pub center_y: f64,
}

impl ViewTransform {
    /// Derive the transform for a viewpoint over a `width x height` viewport.
    pub fn establish(viewpoint: &Viewpoint, width: u32, height: u32) -> Self {
        let half_width = f64::from(width) * 0.5;
        let half_fov = (viewpoint.fov * 0.5).clamp(f64::EPSILON, std::f64::consts::FRAC_PI_2);
        Self {
            sin_angle: viewpoint.angle.sin(),
            cos_angle: viewpoint.angle.cos(),
            focal: half_width / half_fov.tan(),
            center_x: half_width,
            center_y: f64::from(height) * 0.5,
        }
    }
}
