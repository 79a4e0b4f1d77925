use nalgebra::Vector2;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub type Position = Vector2<f32>;
pub type Velocity = Vector2<f32>;

#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Position,
    pub velocity: Velocity,
    pub size: f32,
    pub opacity: f32,
}

impl Particle {
    /// Fresh particle somewhere on the surface, drifting slowly in a random
    /// direction, starting in the dim part of the opacity range.
    pub fn random(rng: &mut impl Rng, extent: Vector2<f32>, settings: &FieldSettings) -> Self {
        Self {
            position: Position::new(rng.gen_range(0.0..extent.x), rng.gen_range(0.0..extent.y)),
            velocity: Velocity::new(
                (rng.gen::<f32>() - 0.5) * settings.drift_speed,
                (rng.gen::<f32>() - 0.5) * settings.drift_speed,
            ),
            size: rng.gen_range(settings.size_min..settings.size_max),
            opacity: rng.gen_range(settings.seed_opacity_min..settings.seed_opacity_max),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
    /// Population below the breakpoint width.
    pub mobile_count: usize,
    /// Population at or above the breakpoint width.
    pub desktop_count: usize,
    /// Surface width (logical pixels) separating the two populations.
    pub mobile_breakpoint: f32,
    /// Maximum distance at which two particles are linked.
    pub connect_distance: f32,
    /// Peak stroke opacity of a link at distance zero.
    pub link_alpha: f32,
    /// Radius of the pointer's influence.
    pub pointer_radius: f32,
    /// Gain of the displacement toward the pointer.
    pub attraction_gain: f32,
    /// Per-frame opacity increase while inside the pointer radius.
    pub opacity_raise: f32,
    /// Per-frame opacity decrease otherwise.
    pub opacity_decay: f32,
    pub opacity_min: f32,
    pub opacity_max: f32,
    /// Width of the uniform velocity range, centered on zero.
    pub drift_speed: f32,
    pub size_min: f32,
    pub size_max: f32,
    pub seed_opacity_min: f32,
    pub seed_opacity_max: f32,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            mobile_count: 40,
            desktop_count: 80,
            mobile_breakpoint: 768.0,
            connect_distance: 140.0,
            link_alpha: 0.15,
            pointer_radius: 180.0,
            attraction_gain: 0.015,
            opacity_raise: 0.02,
            opacity_decay: 0.005,
            opacity_min: 0.1,
            opacity_max: 0.8,
            drift_speed: 0.6,
            size_min: 1.0,
            size_max: 3.5,
            seed_opacity_min: 0.1,
            seed_opacity_max: 0.5,
        }
    }
}

/// Advances one particle by one frame.
///
/// Position always moves by the particle's own velocity. A pointer within
/// `pointer_radius` additionally pulls the particle toward itself with a
/// strength that falls off linearly with distance, and brightens it; a far or
/// absent pointer lets the particle fade back toward `opacity_min`. Both axes
/// then wrap modulo the surface extent, so coordinates stay in `[0, extent)`
/// and an overshoot past the edge reappears the same amount past the
/// opposite one.
pub fn step_particle(
    settings: &FieldSettings,
    particle: &mut Particle,
    pointer: Option<Position>,
    extent: Vector2<f32>,
) {
    particle.position += particle.velocity;

    let mut near_pointer = false;
    if let Some(pointer) = pointer {
        let delta = pointer - particle.position;
        let distance = delta.norm();
        if distance < settings.pointer_radius {
            let pull = (settings.pointer_radius - distance) / settings.pointer_radius;
            particle.position += delta * (pull * settings.attraction_gain);
            particle.opacity = (particle.opacity + settings.opacity_raise).min(settings.opacity_max);
            near_pointer = true;
        }
    }
    if !near_pointer {
        particle.opacity = (particle.opacity - settings.opacity_decay).max(settings.opacity_min);
    }

    particle.position.x = wrap(particle.position.x, extent.x);
    particle.position.y = wrap(particle.position.y, extent.y);
}

// rem_euclid can round a tiny negative input up to `extent` itself, which
// would break the [0, extent) invariant; fold that case back to the origin.
fn wrap(value: f32, extent: f32) -> f32 {
    let wrapped = value.rem_euclid(extent);
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

/// The live particle population plus the surface it lives on.
///
/// The population is fixed between reseeds; a reseed discards every particle
/// and rebuilds the store from scratch for the new extent.
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    extent: Vector2<f32>,
    settings: FieldSettings,
}

impl ParticleField {
    pub fn new(settings: FieldSettings) -> Self {
        Self {
            particles: Vec::new(),
            extent: Vector2::new(0.0, 0.0),
            settings,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn extent(&self) -> Vector2<f32> {
        self.extent
    }

    pub fn settings(&self) -> &FieldSettings {
        &self.settings
    }

    /// Population for a given surface width: the mobile count below the
    /// breakpoint, the desktop count at or above it.
    pub fn population_for(&self, width: f32) -> usize {
        if width < self.settings.mobile_breakpoint {
            self.settings.mobile_count
        } else {
            self.settings.desktop_count
        }
    }

    /// Rebuilds the whole store for a new surface size. Nothing carries over
    /// from the previous population.
    pub fn reseed(&mut self, width: f32, height: f32, rng: &mut impl Rng) {
        self.particles.clear();
        self.extent = Vector2::new(width, height);
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let count = self.population_for(width);
        self.particles
            .extend((0..count).map(|_| Particle::random(rng, self.extent, &self.settings)));
    }

    /// Steps every particle against the current pointer state.
    pub fn advance(&mut self, pointer: Option<Position>) {
        for particle in &mut self.particles {
            step_particle(&self.settings, particle, pointer, self.extent);
        }
    }
}
