//! Ink-trail particle field.
//!
//! Pure simulation: pointer input spawns particles, [`ParticleField::step`]
//! advances one frame, [`ParticleField::draw`] paints onto a [`Canvas`]. The
//! frame loop that drives it lives in [`super::animation`].

use rand::Rng;

use super::surface::{Canvas, Viewport};

/// Hard cap on live particles. Spawning stops at the cap; nothing is evicted.
pub const MAX_PARTICLES: usize = 150;

/// Particles are spawned on every `SPAWN_EVERY`th pointer event.
pub const SPAWN_EVERY: u64 = 3;

/// Particles spawned per qualifying pointer event.
pub const SPAWN_BATCH: usize = 2;

/// Downward acceleration added to `vy` each frame.
pub const GRAVITY: f64 = 0.1;

/// Multiplicative size decay per frame.
pub const SIZE_DECAY: f64 = 0.95;

/// Max offset from the pointer along each axis.
const SPREAD: f64 = 30.0;

/// Translucent fill painted before each frame, leaving a trail.
pub const TRAIL_FADE: Rgba = Rgba::new(4, 70, 168, 0.05);

/// An RGB colour with alpha in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    #[must_use]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    #[must_use]
    pub const fn with_alpha(self, a: f64) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }
}

/// The eight particle colours.
pub const PALETTE: [Rgba; 8] = [
    Rgba::opaque(0xff, 0x6b, 0x35),
    Rgba::opaque(0x04, 0x56, 0xa8),
    Rgba::opaque(0x7c, 0x4d, 0xff),
    Rgba::opaque(0x10, 0xb9, 0x81),
    Rgba::opaque(0xff, 0xd7, 0x00),
    Rgba::opaque(0xff, 0x14, 0x93),
    Rgba::opaque(0x00, 0xd4, 0xff),
    Rgba::opaque(0xff, 0x69, 0xb4),
];

/// One blob of ink.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub life: f64,
    pub decay: f64,
    pub size: f64,
    pub color: Rgba,
}

impl Particle {
    fn spawn(x: f64, y: f64, rng: &mut impl Rng) -> Self {
        Self {
            x: x + rng.random_range(-SPREAD..SPREAD),
            y: y + rng.random_range(-SPREAD..SPREAD),
            vx: rng.random_range(-3.0..3.0),
            vy: rng.random_range(-5.0..1.0),
            life: 1.0,
            decay: rng.random_range(0.015..0.04),
            size: rng.random_range(8.0..33.0),
            color: PALETTE[rng.random_range(0..PALETTE.len())],
        }
    }

    fn update(&mut self) {
        self.vy += GRAVITY;
        self.x += self.vx;
        self.y += self.vy;
        self.life -= self.decay;
        self.size *= SIZE_DECAY;
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// All live particles plus the pointer state that spawns them.
#[derive(Debug)]
pub struct ParticleField<R> {
    particles: Vec<Particle>,
    pointer_events: u64,
    pointer: (f64, f64),
    viewport: Viewport,
    rng: R,
}

impl<R: Rng> ParticleField<R> {
    /// Create an empty field with the pointer at the viewport centre.
    pub fn new(viewport: Viewport, rng: R) -> Self {
        Self {
            particles: Vec::with_capacity(MAX_PARTICLES),
            pointer_events: 0,
            pointer: viewport.center(),
            viewport,
            rng,
        }
    }

    /// Record a pointer move, spawning a batch on every third event.
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        self.pointer = (x, y);
        self.pointer_events += 1;

        if self.pointer_events % SPAWN_EVERY != 0 {
            return;
        }
        for _ in 0..SPAWN_BATCH {
            if self.particles.len() >= MAX_PARTICLES {
                break;
            }
            let particle = Particle::spawn(x, y, &mut self.rng);
            self.particles.push(particle);
        }
    }

    /// Advance one frame and drop every particle whose life ran out.
    pub fn step(&mut self) {
        for particle in &mut self.particles {
            particle.update();
        }
        self.particles.retain(Particle::is_alive);
    }

    /// Paint the trail fade and every live particle.
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.fade(TRAIL_FADE);
        for p in &self.particles {
            canvas.fill_circle(p.x, p.y, p.size, p.color.with_alpha(p.life * 0.5));
        }
    }

    /// Re-bind to a new viewport. Existing particles are kept.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub const fn pointer(&self) -> (f64, f64) {
        self.pointer
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn field() -> ParticleField<StdRng> {
        ParticleField::new(Viewport::new(800, 600), StdRng::seed_from_u64(7))
    }

    #[derive(Default)]
    struct Recorder {
        fades: Vec<Rgba>,
        circles: usize,
    }

    impl Canvas for Recorder {
        fn resize(&mut self, _viewport: Viewport) {}

        fn fade(&mut self, color: Rgba) {
            self.fades.push(color);
        }

        fn fill_circle(&mut self, _x: f64, _y: f64, _radius: f64, _color: Rgba) {
            self.circles += 1;
        }
    }

    #[test]
    fn test_spawns_on_every_third_move() {
        let mut field = field();
        field.pointer_moved(10.0, 10.0);
        field.pointer_moved(11.0, 10.0);
        assert!(field.is_empty());

        field.pointer_moved(12.0, 10.0);
        assert_eq!(field.len(), SPAWN_BATCH);

        for _ in 0..3 {
            field.pointer_moved(13.0, 10.0);
        }
        assert_eq!(field.len(), SPAWN_BATCH * 2);
    }

    #[test]
    fn test_particles_spawn_near_pointer() {
        let mut field = field();
        for _ in 0..30 {
            field.pointer_moved(400.0, 300.0);
        }
        for p in field.particles() {
            assert!((p.x - 400.0).abs() <= SPREAD);
            assert!((p.y - 300.0).abs() <= SPREAD);
            assert!((0.015..0.04).contains(&p.decay));
            assert!((8.0..33.0).contains(&p.size));
            assert!(PALETTE.contains(&p.color));
        }
    }

    #[test]
    fn test_count_never_exceeds_cap() {
        let mut field = field();
        for i in 0..2_000 {
            field.pointer_moved(f64::from(i % 800), 300.0);
            assert!(field.len() <= MAX_PARTICLES);
        }
        assert_eq!(field.len(), MAX_PARTICLES);
    }

    #[test]
    fn test_dead_particles_removed_on_next_step() {
        let mut field = field();
        for _ in 0..3 {
            field.pointer_moved(0.0, 0.0);
        }
        field.particles[0].life = 0.01;
        field.particles[0].decay = 0.02;

        field.step();

        assert_eq!(field.len(), SPAWN_BATCH - 1);
        assert!(field.particles().iter().all(Particle::is_alive));
    }

    #[test]
    fn test_everything_dies_eventually() {
        let mut field = field();
        for _ in 0..30 {
            field.pointer_moved(100.0, 100.0);
        }
        // Slowest decay is 0.015/frame, so 67 frames is enough.
        for _ in 0..67 {
            field.step();
        }
        assert!(field.is_empty());
    }

    #[test]
    fn test_gravity_applied_before_integration() {
        let mut particle = Particle {
            x: 0.0,
            y: 0.0,
            vx: 1.0,
            vy: 0.0,
            life: 1.0,
            decay: 0.02,
            size: 10.0,
            color: PALETTE[0],
        };
        particle.update();

        assert!((particle.vy - GRAVITY).abs() < f64::EPSILON);
        assert!((particle.y - GRAVITY).abs() < f64::EPSILON);
        assert!((particle.x - 1.0).abs() < f64::EPSILON);
        assert!((particle.size - 9.5).abs() < 1e-9);
        assert!((particle.life - 0.98).abs() < 1e-9);
    }

    #[test]
    fn test_resize_keeps_particles() {
        let mut field = field();
        for _ in 0..6 {
            field.pointer_moved(50.0, 50.0);
        }
        let before = field.particles().to_vec();

        field.resize(Viewport::new(1920, 1080));

        assert_eq!(field.viewport(), Viewport::new(1920, 1080));
        assert_eq!(field.particles(), before.as_slice());
    }

    #[test]
    fn test_draw_fades_then_paints_each_particle() {
        let mut field = field();
        for _ in 0..3 {
            field.pointer_moved(50.0, 50.0);
        }
        let mut canvas = Recorder::default();

        field.draw(&mut canvas);

        assert_eq!(canvas.fades, vec![TRAIL_FADE]);
        assert_eq!(canvas.circles, SPAWN_BATCH);
    }
}
