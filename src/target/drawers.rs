use crate::foundation::core::ColumnRange;
use crate::target::canvas::{Canvas, Color, PixelFormat, Viewport};

/// Format-specific pixel-writing primitives.
///
/// One stateless implementation exists per [`PixelFormat`]; workers and draw
/// commands dispatch through [`drawers_for`] read-only. The format-dependent
/// rasterization internals live behind this trait so the orchestration core
/// stays format-agnostic.
pub trait PixelDrawers: Send + Sync {
    /// The pixel format these primitives write.
    fn format(&self) -> PixelFormat;

    /// Fill a rectangle with a solid color, clamped to the canvas bounds.
    fn fill_rect(&self, canvas: &mut Canvas, rect: Viewport, color: Color);

    /// Fill the full-height column span `columns` (viewport-local) of `viewport`.
    fn fill_columns(
        &self,
        canvas: &mut Canvas,
        viewport: Viewport,
        columns: ColumnRange,
        color: Color,
    ) {
        let rect = Viewport {
            x: viewport.x.saturating_add(columns.x1),
            y: viewport.y,
            width: columns.len(),
            height: viewport.height,
        };
        self.fill_rect(canvas, rect, color);
    }
}

/// Clamped pixel-row bounds for a rect on a canvas, in pixels.
fn clamp_rect(canvas: &Canvas, rect: Viewport) -> (u32, u32, u32, u32) {
    let x0 = rect.x.min(canvas.width());
    let x1 = rect.x.saturating_add(rect.width).min(canvas.width());
    let y0 = rect.y.min(canvas.height());
    let y1 = rect.y.saturating_add(rect.height).min(canvas.height());
    (x0, x1, y0, y1)
}

/// Drawing primitives for 32-bit RGBA destinations.
#[derive(Clone, Copy, Debug, Default)]
pub struct TruecolorDrawers;

impl PixelDrawers for TruecolorDrawers {
    fn format(&self) -> PixelFormat {
        PixelFormat::Truecolor
    }

    fn fill_rect(&self, canvas: &mut Canvas, rect: Viewport, color: Color) {
        let rgba = color.to_rgba8();
        let (x0, x1, y0, y1) = clamp_rect(canvas, rect);
        for y in y0..y1 {
            let row = canvas.row_mut(y);
            for px in row[x0 as usize * 4..x1 as usize * 4].chunks_exact_mut(4) {
                px.copy_from_slice(&rgba);
            }
        }
    }
}

/// Drawing primitives for 8-bit palettized destinations.
#[derive(Clone, Copy, Debug, Default)]
pub struct PalDrawers;

impl PixelDrawers for PalDrawers {
    fn format(&self) -> PixelFormat {
        PixelFormat::Palettized
    }

    fn fill_rect(&self, canvas: &mut Canvas, rect: Viewport, color: Color) {
        let index = color.palette_index();
        let (x0, x1, y0, y1) = clamp_rect(canvas, rect);
        for y in y0..y1 {
            let row = canvas.row_mut(y);
            row[x0 as usize..x1 as usize].fill(index);
        }
    }
}

static TRUECOLOR: TruecolorDrawers = TruecolorDrawers;
static PAL: PalDrawers = PalDrawers;

/// The drawer set for a destination format.
pub fn drawers_for(format: PixelFormat) -> &'static dyn PixelDrawers {
    match format {
        PixelFormat::Truecolor => &TRUECOLOR,
        PixelFormat::Palettized => &PAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truecolor_fill_rect_writes_packed_rgba() {
        let mut canvas = Canvas::new(4, 4, PixelFormat::Truecolor).unwrap();
        drawers_for(PixelFormat::Truecolor).fill_rect(
            &mut canvas,
            Viewport {
                x: 1,
                y: 1,
                width: 2,
                height: 2,
            },
            Color::rgba(1, 2, 3, 4),
        );
        // Inside the rect.
        assert_eq!(&canvas.data()[(4 + 1) * 4..(4 + 2) * 4], &[1, 2, 3, 4]);
        // Outside the rect stays untouched.
        assert_eq!(&canvas.data()[..4], &[0, 0, 0, 0]);
    }

    #[test]
    fn pal_fill_clamps_to_canvas_bounds() {
        let mut canvas = Canvas::new(4, 4, PixelFormat::Palettized).unwrap();
        drawers_for(PixelFormat::Palettized).fill_rect(
            &mut canvas,
            Viewport {
                x: 2,
                y: 2,
                width: 100,
                height: 100,
            },
            Color(0x07),
        );
        assert_eq!(canvas.data()[2 * 4 + 2], 7);
        assert_eq!(canvas.data()[2 * 4 + 3], 7);
        assert_eq!(canvas.data()[2 * 4 + 1], 0);
    }

    #[test]
    fn fill_columns_offsets_into_viewport() {
        let mut canvas = Canvas::new(8, 2, PixelFormat::Palettized).unwrap();
        let viewport = Viewport {
            x: 4,
            y: 0,
            width: 4,
            height: 2,
        };
        drawers_for(PixelFormat::Palettized).fill_columns(
            &mut canvas,
            viewport,
            ColumnRange::new(1, 3).unwrap(),
            Color(9),
        );
        let row: Vec<u8> = canvas.data()[..8].to_vec();
        assert_eq!(row, vec![0, 0, 0, 0, 0, 9, 9, 0]);
    }
}
