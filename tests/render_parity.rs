mod render_parity {
    use slicecast::{
        Canvas, Color, ColumnRange, FillColumns, FrameState, PixelFormat, RenderStage, SceneOpts,
        SceneRenderer, SlicecastResult, StageFactory, StageSet, Viewpoint, WorkerState,
    };

    /// Deterministic per-column shade, independent of slicing.
    fn shade(x: u32) -> u8 {
        ((x * 7 + 13) % 251) as u8
    }

    /// Opaque pass standing in for a wall scanner: stages per-column shades in
    /// the scratch arena, then emits one fill command per column of the
    /// worker's range.
    struct GradientOpaque;

    impl RenderStage for GradientOpaque {
        fn run(&mut self, state: &mut WorkerState, _frame: &FrameState) -> SlicecastResult<()> {
            let range = state.range();
            let block = state.arena_mut().alloc(range.len() as usize)?;
            for (i, x) in (range.x1..range.x2).enumerate() {
                state.arena_mut().get_mut(block)[i] = shade(x);
            }
            for x in range.x1..range.x2 {
                let value = state.arena().get(block)[(x - range.x1) as usize];
                state.push_command(Box::new(FillColumns {
                    columns: ColumnRange::new(x, x + 1)?,
                    color: Color(u32::from(value)),
                }));
            }
            Ok(())
        }
    }

    struct GradientStages;

    impl StageFactory for GradientStages {
        fn build_stages(&self, _worker_index: usize, _main_worker: bool) -> StageSet {
            let mut set = StageSet::builtin();
            set.opaque = Box::new(GradientOpaque);
            set
        }
    }

    fn renderer(workers: usize) -> SceneRenderer {
        let opts = SceneOpts {
            workers: Some(workers),
            max_width: 256,
            ..SceneOpts::default()
        };
        SceneRenderer::new(opts, &GradientStages).unwrap()
    }

    fn render_once(workers: usize, format: PixelFormat) -> Canvas {
        let mut r = renderer(workers);
        let mut canvas = Canvas::new(64, 16, format).unwrap();
        r.render_view(&Viewpoint::default(), &mut canvas).unwrap();
        canvas
    }

    #[test]
    fn worker_count_does_not_change_pixels() {
        let single = render_once(1, PixelFormat::Palettized);
        for workers in [2, 3, 4, 7] {
            let sliced = render_once(workers, PixelFormat::Palettized);
            assert_eq!(
                single.data(),
                sliced.data(),
                "palettized output must match for {workers} workers"
            );
            assert_eq!(single.fingerprint(), sliced.fingerprint());
        }
    }

    #[test]
    fn worker_count_does_not_change_truecolor_pixels() {
        let single = render_once(1, PixelFormat::Truecolor);
        let sliced = render_once(4, PixelFormat::Truecolor);
        assert_eq!(single.data(), sliced.data());
    }

    #[test]
    fn repeated_frames_are_byte_identical() {
        let mut r = renderer(4);
        let viewpoint = Viewpoint::default();

        let mut first = Canvas::new(64, 16, PixelFormat::Palettized).unwrap();
        r.render_view(&viewpoint, &mut first).unwrap();
        let mut second = Canvas::new(64, 16, PixelFormat::Palettized).unwrap();
        r.render_view(&viewpoint, &mut second).unwrap();

        assert_eq!(first.data(), second.data());
    }

    #[test]
    fn command_count_matches_columns_even_with_excess_workers() {
        let mut r = renderer(8);
        let mut canvas = Canvas::new(5, 4, PixelFormat::Palettized).unwrap();
        let stats = r.render_view(&Viewpoint::default(), &mut canvas).unwrap();

        // One fill command per column; the three empty-range workers
        // contribute none.
        assert_eq!(stats.commands_executed, 5);
        assert_eq!(stats.workers_used, 5);
        for x in 0..5u32 {
            assert_eq!(canvas.data()[x as usize], shade(x));
        }
    }

    #[test]
    fn clear_color_change_applies_to_the_next_frame_only() {
        let opts = SceneOpts {
            workers: Some(2),
            max_width: 256,
            clear_color: Color(1),
            ..SceneOpts::default()
        };
        let mut r = SceneRenderer::new(opts, &slicecast::DefaultStages).unwrap();

        let mut first = Canvas::new(8, 2, PixelFormat::Palettized).unwrap();
        r.render_view(&Viewpoint::default(), &mut first).unwrap();
        let first_pixels = first.data().to_vec();

        r.set_clear_color(Color(9));
        let mut second = Canvas::new(8, 2, PixelFormat::Palettized).unwrap();
        r.render_view(&Viewpoint::default(), &mut second).unwrap();

        assert!(first_pixels.iter().all(|&b| b == 1));
        assert!(second.data().iter().all(|&b| b == 9));
        // The already-drained first frame is untouched.
        assert_eq!(first.data(), first_pixels.as_slice());
    }

    #[test]
    fn render_view_to_canvas_stays_inside_the_viewport() {
        let mut r = renderer(3);
        let mut canvas = Canvas::new(16, 8, PixelFormat::Palettized).unwrap();
        let stats = r
            .render_view_to_canvas(&Viewpoint::default(), &mut canvas, 4, 2, 8, 4, true)
            .unwrap();
        assert_eq!(stats.columns, 8);

        for y in 0..8u32 {
            for x in 0..16u32 {
                let px = canvas.data()[(y * 16 + x) as usize];
                let inside = (4..12).contains(&x) && (2..6).contains(&y);
                if inside {
                    assert_eq!(px, shade(x - 4), "inside pixel ({x},{y})");
                } else {
                    assert_eq!(px, 0, "outside pixel ({x},{y}) must stay untouched");
                }
            }
        }
    }
}
