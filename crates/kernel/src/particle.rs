//! Particle state and per-tick caches.

use std::sync::OnceLock;

use glam::DVec3;

/// A single fluid particle.
///
/// Plain physics record: the renderer addresses particles by their index in
/// the owning [`Fluid`](crate::Fluid) and only ever reads `position`.
///
/// Everything evaluated during a tick (neighbor search, distances, kernels)
/// reads `shadow_position`, a copy of `position` frozen by
/// [`Particle::begin_tick`]. The density and neighbor caches are `OnceLock`s
/// so they can be filled lazily through a shared reference, including from
/// worker threads, and are guaranteed to be computed at most once per tick.
#[derive(Debug, Clone)]
pub struct Particle {
    /// Authoritative position, written only by integration.
    pub position: DVec3,
    /// Velocity, written only by integration.
    pub velocity: DVec3,
    /// Particle mass.
    pub mass: f64,
    shadow_position: DVec3,
    density: OnceLock<f64>,
    neighbors: OnceLock<Vec<usize>>,
}

impl Particle {
    /// Create a particle at rest.
    pub fn new(position: DVec3, mass: f64) -> Self {
        Self::with_velocity(position, DVec3::ZERO, mass)
    }

    /// Create a particle with an initial velocity.
    pub fn with_velocity(position: DVec3, velocity: DVec3, mass: f64) -> Self {
        Self {
            position,
            velocity,
            mass,
            shadow_position: position,
            density: OnceLock::new(),
            neighbors: OnceLock::new(),
        }
    }

    /// Position frozen at the start of the current tick.
    #[inline]
    pub fn shadow_position(&self) -> DVec3 {
        self.shadow_position
    }

    /// Snapshot `position` and drop last tick's caches.
    pub fn begin_tick(&mut self) {
        self.shadow_position = self.position;
        self.density.take();
        self.neighbors.take();
    }

    /// Density cached this tick, if it has been evaluated.
    pub fn cached_density(&self) -> Option<f64> {
        self.density.get().copied()
    }

    /// Neighbor list cached this tick, if it has been evaluated.
    pub fn cached_neighbors(&self) -> Option<&[usize]> {
        self.neighbors.get().map(Vec::as_slice)
    }

    pub(crate) fn density_or_init(&self, f: impl FnOnce() -> f64) -> f64 {
        *self.density.get_or_init(f)
    }

    pub(crate) fn neighbors_or_init(&self, f: impl FnOnce() -> Vec<usize>) -> &[usize] {
        self.neighbors.get_or_init(f)
    }

    /// Shadow-position distance to another particle.
    #[inline]
    pub fn distance_to(&self, other: &Particle) -> f64 {
        self.shadow_position.distance(other.shadow_position)
    }

    /// Kinetic energy `m |v|^2 / 2`.
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.length_squared()
    }
}
