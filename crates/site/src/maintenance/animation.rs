//! Frame loop for the ink trail.
//!
//! An [`InkTrail`] owns a tokio task that feeds pointer and resize input into a
//! [`ParticleField`] and paints a frame roughly every 16 ms. The task and its
//! input channel live exactly as long as the handle: dropping it aborts the
//! loop, so nothing keeps ticking after the overlay is gone.

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::ink::ParticleField;
use super::surface::{Canvas, Viewport};

/// Target frame spacing (about 60 fps).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Input routed to the running trail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrailInput {
    PointerMoved { x: f64, y: f64 },
    Resized(Viewport),
}

/// Handle to a running ink-trail loop.
#[derive(Debug)]
pub struct InkTrail {
    input: mpsc::UnboundedSender<TrailInput>,
    task: JoinHandle<()>,
}

impl InkTrail {
    /// Start the loop on the current tokio runtime.
    #[must_use]
    pub fn start(mut canvas: Box<dyn Canvas>, viewport: Viewport) -> Self {
        let (input, mut rx) = mpsc::unbounded_channel();
        let rng = StdRng::from_rng(&mut rand::rng());

        let task = tokio::spawn(async move {
            let mut field = ParticleField::new(viewport, rng);
            canvas.resize(viewport);

            let mut frames = tokio::time::interval(FRAME_INTERVAL);
            frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    event = rx.recv() => match event {
                        Some(TrailInput::PointerMoved { x, y }) => field.pointer_moved(x, y),
                        Some(TrailInput::Resized(next)) => {
                            field.resize(next);
                            canvas.resize(next);
                        }
                        None => break,
                    },
                    _ = frames.tick() => {
                        field.step();
                        field.draw(&mut *canvas);
                    }
                }
            }

            debug!("Ink trail input closed");
        });

        Self { input, task }
    }

    /// Forward input to the loop. Returns `false` if the loop has stopped.
    pub fn send(&self, input: TrailInput) -> bool {
        self.input.send(input).is_ok()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for InkTrail {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maintenance::surface::{HeadlessDocument, Surface};

    #[tokio::test(start_paused = true)]
    async fn test_draws_frames_while_running() {
        let doc = HeadlessDocument::new(Viewport::new(800, 600));
        let trail = InkTrail::start(doc.canvas(), doc.viewport());

        tokio::time::sleep(FRAME_INTERVAL * 10).await;

        assert!(trail.is_running());
        assert!(doc.frames_drawn() >= 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pointer_input_reaches_canvas() {
        let doc = HeadlessDocument::new(Viewport::new(800, 600));
        let trail = InkTrail::start(doc.canvas(), doc.viewport());

        for i in 0..30 {
            assert!(trail.send(TrailInput::PointerMoved {
                x: f64::from(i),
                y: 100.0
            }));
        }
        tokio::time::sleep(FRAME_INTERVAL * 3).await;

        assert!(doc.circles_drawn() > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_the_loop() {
        let doc = HeadlessDocument::new(Viewport::new(800, 600));
        let trail = InkTrail::start(doc.canvas(), doc.viewport());
        tokio::time::sleep(FRAME_INTERVAL * 4).await;

        drop(trail);
        tokio::task::yield_now().await;
        let frames = doc.frames_drawn();
        tokio::time::sleep(FRAME_INTERVAL * 20).await;

        assert_eq!(doc.frames_drawn(), frames);
    }
}
