use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::links::{pairwise_links, Link};
use crate::physics::{FieldSettings, Particle, ParticleField, Position};

/// The single in-flight frame request. Owning it is what "running" means:
/// `render_frame` consumes it and re-arms it, `stop`/`resize` drop it, so a
/// cancelled loop can never produce another frame until restarted.
#[derive(Debug)]
struct FrameRequest;

/// Everything the renderer needs to draw one frame.
pub struct Frame<'a> {
    pub particles: &'a [Particle],
    pub links: Vec<Link>,
    pub extent: Vector2<f32>,
}

/// Owns the render loop state: the particle field, the pointer input, and the
/// pending-frame token.
///
/// Input handlers write the pointer, the frame loop reads it; both run on the
/// event loop thread, so a frame always sees a complete pointer update.
/// Resizing cancels the pending frame before rebuilding the field, which is
/// what keeps a mid-resize frame from reading a half-built store or leaving
/// two loops running.
pub struct FrameDriver {
    field: ParticleField,
    pointer: Option<Position>,
    pending: Option<FrameRequest>,
    rng: StdRng,
}

impl FrameDriver {
    pub fn new(settings: FieldSettings, width: f32, height: f32) -> Self {
        Self::with_rng(settings, width, height, StdRng::from_entropy())
    }

    pub fn with_rng(settings: FieldSettings, width: f32, height: f32, mut rng: StdRng) -> Self {
        let mut field = ParticleField::new(settings);
        field.reseed(width, height, &mut rng);
        Self {
            field,
            pointer: None,
            pending: None,
            rng,
        }
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn pointer(&self) -> Option<Position> {
        self.pointer
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Arms the frame loop. Idempotent: a running loop keeps its one token.
    pub fn start(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(FrameRequest);
        }
    }

    /// Cancels the pending frame, if any.
    pub fn stop(&mut self) {
        self.pending = None;
    }

    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.pointer = Some(Position::new(x, y));
    }

    pub fn clear_pointer(&mut self) {
        self.pointer = None;
    }

    /// Cancel, rebuild the field for the new surface, resume if we were
    /// running. The old population is discarded wholesale.
    pub fn resize(&mut self, width: f32, height: f32) {
        let was_running = self.pending.take().is_some();
        self.field.reseed(width, height, &mut self.rng);
        log::info!(
            "reseeded field at {}x{} with {} particles",
            width,
            height,
            self.field.len()
        );
        if was_running {
            self.start();
        }
    }

    /// Produces the next frame, or `None` when the loop is stopped.
    ///
    /// Consumes the pending token, advances every particle against the latest
    /// pointer state, computes the proximity links, then re-arms the token —
    /// the loop perpetuates itself from inside the frame it just finished.
    pub fn render_frame(&mut self) -> Option<Frame<'_>> {
        self.pending.take()?;
        self.field.advance(self.pointer);
        let settings = self.field.settings();
        let links = pairwise_links(
            self.field.particles(),
            settings.connect_distance,
            settings.link_alpha,
        );
        self.pending = Some(FrameRequest);
        Some(Frame {
            particles: self.field.particles(),
            links,
            extent: self.field.extent(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver(width: f32, height: f32) -> FrameDriver {
        FrameDriver::with_rng(
            FieldSettings::default(),
            width,
            height,
            StdRng::seed_from_u64(42),
        )
    }

    #[test]
    fn starts_stopped_and_yields_no_frame() {
        let mut driver = driver(1024.0, 768.0);
        assert!(!driver.is_running());
        assert!(driver.render_frame().is_none());
    }

    #[test]
    fn start_arms_a_single_self_renewing_token() {
        let mut driver = driver(1024.0, 768.0);
        driver.start();
        driver.start();
        assert!(driver.is_running());
        assert!(driver.render_frame().is_some());
        // The frame re-armed itself.
        assert!(driver.is_running());
        assert!(driver.render_frame().is_some());
    }

    #[test]
    fn stop_cancels_the_pending_frame() {
        let mut driver = driver(1024.0, 768.0);
        driver.start();
        driver.stop();
        assert!(!driver.is_running());
        assert!(driver.render_frame().is_none());
    }

    #[test]
    fn resize_swaps_population_and_discards_state() {
        let mut driver = driver(1024.0, 768.0);
        driver.start();
        assert_eq!(driver.field().len(), 80);
        let before: Vec<Position> = driver.field().particles().iter().map(|p| p.position).collect();

        driver.resize(500.0, 700.0);
        assert_eq!(driver.field().len(), 40);
        assert!(driver.is_running(), "resize resumes a running loop");
        let carried = driver
            .field()
            .particles()
            .iter()
            .filter(|p| before.contains(&p.position))
            .count();
        assert_eq!(carried, 0);
    }

    #[test]
    fn resize_while_stopped_stays_stopped() {
        let mut driver = driver(1024.0, 768.0);
        driver.resize(500.0, 700.0);
        assert!(!driver.is_running());
        assert!(driver.render_frame().is_none());
    }

    #[test]
    fn frame_carries_particles_links_and_extent() {
        let mut driver = driver(1024.0, 768.0);
        driver.start();
        let frame = driver.render_frame().unwrap();
        assert_eq!(frame.particles.len(), 80);
        assert_eq!(frame.extent, Vector2::new(1024.0, 768.0));
        for link in &frame.links {
            let distance = (link.a - link.b).norm();
            assert!(distance < 140.0);
            assert!(link.opacity > 0.0 && link.opacity <= 0.15);
        }
    }

    #[test]
    fn pointer_state_reaches_the_stepper() {
        let mut driver = driver(1024.0, 768.0);
        driver.start();
        driver.set_pointer(512.0, 384.0);
        assert_eq!(driver.pointer(), Some(Position::new(512.0, 384.0)));

        // Hold the pointer long enough and every particle it can reach
        // brightens; clear it and the whole field decays back to the floor.
        for _ in 0..200 {
            driver.render_frame().unwrap();
        }
        driver.clear_pointer();
        assert_eq!(driver.pointer(), None);
        for _ in 0..200 {
            driver.render_frame().unwrap();
        }
        let settings = driver.field().settings().clone();
        for particle in driver.field().particles() {
            assert!((particle.opacity - settings.opacity_min).abs() <= 1e-4);
        }
    }
}
