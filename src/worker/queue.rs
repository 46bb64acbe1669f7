use crate::foundation::core::ColumnRange;
use crate::foundation::error::{SlicecastError, SlicecastResult};
use crate::target::canvas::{Canvas, Color, Viewport};
use crate::target::drawers::drawers_for;

/// A deferred draw operation produced by a pipeline stage.
///
/// Commands are appended on a worker's thread during the parallel phase and
/// executed on the calling thread during the serialized drain phase, in
/// worker-index order.
pub trait DrawCommand: Send {
    /// Execute the command against the destination surface.
    fn execute(&self, canvas: &mut Canvas, viewport: Viewport) -> SlicecastResult<()>;

    /// Short name used in trace output and drain-failure errors.
    fn debug_name(&self) -> &'static str {
        "draw"
    }
}

/// Append-only per-worker queue of deferred draw commands.
///
/// Owned exclusively by one worker during the parallel phase; the
/// orchestrator drains it during the serialized drain phase and clears it for
/// the next frame.
#[derive(Default)]
pub struct DrawQueue {
    commands: Vec<Box<dyn DrawCommand>>,
}

impl DrawQueue {
    /// Append a command.
    pub fn push(&mut self, command: Box<dyn DrawCommand>) {
        self.commands.push(command);
    }

    /// Number of queued commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Return `true` when no commands are queued.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop all queued commands without executing them.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Execute every queued command in append order, then clear the queue.
    ///
    /// Returns the number of commands executed. A failing command aborts the
    /// drain; the queue is still cleared so the next frame starts clean.
    pub(crate) fn execute_all(
        &mut self,
        canvas: &mut Canvas,
        viewport: Viewport,
    ) -> SlicecastResult<u64> {
        let mut executed = 0u64;
        let result = self.commands.iter().try_for_each(|command| {
            command.execute(canvas, viewport).map_err(|e| {
                SlicecastError::stage(format!(
                    "draw command '{}' failed: {e}",
                    command.debug_name()
                ))
            })?;
            executed += 1;
            Ok(())
        });
        self.commands.clear();
        result.map(|()| executed)
    }
}

/// Solid fill of a full-height column span; the built-in reference command.
#[derive(Clone, Copy, Debug)]
pub struct FillColumns {
    /// Viewport-local column span to fill.
    pub columns: ColumnRange,
    /// Fill color, interpreted per destination format.
    pub color: Color,
}

impl DrawCommand for FillColumns {
    fn execute(&self, canvas: &mut Canvas, viewport: Viewport) -> SlicecastResult<()> {
        drawers_for(canvas.format()).fill_columns(canvas, viewport, self.columns, self.color);
        Ok(())
    }

    fn debug_name(&self) -> &'static str {
        "fill_columns"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::canvas::PixelFormat;

    #[test]
    fn queue_executes_in_append_order_and_clears() {
        let mut canvas = Canvas::new(4, 1, PixelFormat::Palettized).unwrap();
        let viewport = Viewport::full(&canvas);

        let mut queue = DrawQueue::default();
        queue.push(Box::new(FillColumns {
            columns: ColumnRange::new(0, 4).unwrap(),
            color: Color(1),
        }));
        queue.push(Box::new(FillColumns {
            columns: ColumnRange::new(1, 3).unwrap(),
            color: Color(2),
        }));

        let executed = queue.execute_all(&mut canvas, viewport).unwrap();
        assert_eq!(executed, 2);
        assert!(queue.is_empty());
        // Later commands overwrite earlier ones.
        assert_eq!(canvas.data(), &[1, 2, 2, 1]);
    }

    #[test]
    fn failing_command_reports_debug_name_and_clears_queue() {
        struct Broken;
        impl DrawCommand for Broken {
            fn execute(&self, _: &mut Canvas, _: Viewport) -> SlicecastResult<()> {
                Err(SlicecastError::stage("no target"))
            }
            fn debug_name(&self) -> &'static str {
                "broken"
            }
        }

        let mut canvas = Canvas::new(2, 1, PixelFormat::Palettized).unwrap();
        let viewport = Viewport::full(&canvas);
        let mut queue = DrawQueue::default();
        queue.push(Box::new(Broken));

        let err = queue.execute_all(&mut canvas, viewport).unwrap_err();
        assert!(err.to_string().contains("broken"));
        assert!(queue.is_empty());
    }
}
