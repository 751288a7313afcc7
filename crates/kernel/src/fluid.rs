//! The fluid: particle arena, voxel grid and the per-tick pipeline.

use glam::DVec3;
use rayon::prelude::*;

use crate::boundary::DomainBounds;
use crate::force::ExternalForce;
use crate::integrate::integrate;
use crate::neighbor::VoxelGrid;
use crate::params::{require_positive, FluidParams, ParamError};
use crate::particle::Particle;
use crate::smoothing::SmoothingKernels;
use crate::sph::SphContext;
use crate::{FluidMetrics, SimulationKernel};

/// A body of fluid and everything needed to advance it.
///
/// A tick runs in two phases:
///
/// 1. [`begin_tick`](Self::begin_tick) freezes every particle's position into
///    its shadow, clears the density and neighbor caches and rebuilds the
///    voxel grid.
/// 2. [`integrate_all`](Self::integrate_all) evaluates every acceleration
///    against that frozen state, then commits each particle's new velocity
///    and position.
///
/// Because no state is committed until all accelerations are known, the
/// result does not depend on particle order or on whether the acceleration
/// phase ran in parallel.
pub struct Fluid {
    particles: Vec<Particle>,
    grid: VoxelGrid,
    kernels: SmoothingKernels,
    params: FluidParams,
    bounds: DomainBounds,
    external_force: Box<dyn ExternalForce>,
    tick: u64,
    time: f64,
    boundary_contacts: usize,
}

impl std::fmt::Debug for Fluid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fluid")
            .field("particles", &self.particles.len())
            .field("params", &self.params)
            .field("bounds", &self.bounds)
            .field("tick", &self.tick)
            .field("time", &self.time)
            .finish_non_exhaustive()
    }
}

impl Fluid {
    /// Build a fluid from seeded particles.
    ///
    /// Validates the parameters, the domain and every particle mass, then
    /// prepares the first tick so the query accessors are usable before the
    /// first [`step`](Self::step).
    pub fn new(
        particles: Vec<Particle>,
        params: FluidParams,
        bounds: DomainBounds,
        external_force: impl ExternalForce + 'static,
    ) -> Result<Self, ParamError> {
        params.validate()?;
        bounds.validate()?;
        for p in &particles {
            require_positive("mass", p.mass)?;
        }

        let mut fluid = Self {
            grid: VoxelGrid::new(params.voxel_edge_length, params.smoothing_radius),
            kernels: SmoothingKernels::new(params.smoothing_radius),
            particles,
            params,
            bounds,
            external_force: Box::new(external_force),
            tick: 0,
            time: 0.0,
            boundary_contacts: 0,
        };
        fluid.begin_tick();

        tracing::debug!(
            particles = fluid.particles.len(),
            voxels = fluid.grid.len(),
            reach = fluid.grid.reach(),
            "fluid created"
        );
        Ok(fluid)
    }

    /// Borrow everything the SPH operators need for the current tick.
    pub fn context(&self) -> SphContext<'_> {
        SphContext {
            particles: &self.particles,
            grid: &self.grid,
            kernels: &self.kernels,
            params: &self.params,
            external_force: self.external_force.as_ref(),
        }
    }

    /// Snapshot positions, clear caches and rebuild the grid.
    pub fn begin_tick(&mut self) {
        for p in &mut self.particles {
            p.begin_tick();
        }
        self.grid
            .rebuild(self.particles.iter().map(Particle::shadow_position));
    }

    /// Acceleration of every particle against the current tick's snapshot.
    fn accelerations(&self, accumulated_time: f64) -> Vec<DVec3> {
        let ctx = self.context();
        let n = self.particles.len();
        if self.params.parallel {
            (0..n)
                .into_par_iter()
                .map(|i| ctx.acceleration(i, accumulated_time))
                .collect()
        } else {
            (0..n).map(|i| ctx.acceleration(i, accumulated_time)).collect()
        }
    }

    /// Evaluate all accelerations, then integrate and commit every particle.
    ///
    /// `time_delta` is the wall-clock frame delta. Integration always uses
    /// the fixed substep from [`FluidParams`].
    pub fn integrate_all(&mut self, accumulated_time: f64, time_delta: f64) {
        let accelerations = self.accelerations(accumulated_time);

        let substep = self.params.fixed_substep;
        let max_speed = self.params.max_speed;
        let mut contacts = 0;
        for (particle, acceleration) in self.particles.iter_mut().zip(accelerations) {
            let outcome = integrate(particle, acceleration, substep, max_speed, &self.bounds);
            if outcome.reflection.any() {
                contacts += 1;
            }
            outcome.apply(particle);
        }

        self.boundary_contacts = contacts;
        self.tick += 1;
        self.time = accumulated_time;
        tracing::trace!(
            tick = self.tick,
            time = accumulated_time,
            dt = time_delta,
            contacts,
            "tick complete"
        );
    }

    /// Advance one tick.
    pub fn step(&mut self, accumulated_time: f64, time_delta: f64) {
        self.begin_tick();
        self.integrate_all(accumulated_time, time_delta);
    }

    // -- per-particle queries for the current tick --------------------------

    /// See [`SphContext::neighborhood`].
    pub fn neighborhood(&self, i: usize) -> &[usize] {
        self.context().neighborhood(i)
    }

    /// See [`SphContext::density`].
    pub fn density(&self, i: usize) -> f64 {
        self.context().density(i)
    }

    /// See [`SphContext::pressure`].
    pub fn pressure(&self, i: usize) -> f64 {
        self.context().pressure(i)
    }

    /// See [`SphContext::pressure_gradient_force`].
    pub fn pressure_gradient_force(&self, i: usize) -> DVec3 {
        self.context().pressure_gradient_force(i)
    }

    /// See [`SphContext::viscous_force`].
    pub fn viscous_force(&self, i: usize) -> DVec3 {
        self.context().viscous_force(i)
    }

    /// See [`SphContext::external_force`].
    pub fn external_force(&self, i: usize, time: f64) -> DVec3 {
        self.context().external_force(i, time)
    }

    /// See [`SphContext::acceleration`].
    pub fn acceleration(&self, i: usize, time: f64) -> DVec3 {
        self.context().acceleration(i, time)
    }

    // -- read-only views -----------------------------------------------------

    /// Committed positions in particle order.
    pub fn positions(&self) -> impl ExactSizeIterator<Item = DVec3> + '_ {
        self.particles.iter().map(|p| p.position)
    }

    /// All particles.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Particle `i`, if it exists.
    pub fn particle(&self, i: usize) -> Option<&Particle> {
        self.particles.get(i)
    }

    /// Mutable access to particle `i`.
    ///
    /// Position edits only take effect for physics at the next
    /// [`begin_tick`](Self::begin_tick).
    pub fn particle_mut(&mut self, i: usize) -> Option<&mut Particle> {
        self.particles.get_mut(i)
    }

    /// Model constants.
    pub fn params(&self) -> &FluidParams {
        &self.params
    }

    /// Domain walls.
    pub fn bounds(&self) -> &DomainBounds {
        &self.bounds
    }

    /// Voxel grid of the current tick.
    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    /// Number of completed ticks.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Accumulated time passed to the last completed tick.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Snapshot of conservation and diagnostic quantities.
    pub fn metrics(&self) -> FluidMetrics {
        let ctx = self.context();
        let rest = self.params.rest_density;

        let mut metrics = FluidMetrics {
            particle_count: self.particles.len(),
            boundary_contacts: self.boundary_contacts,
            ..FluidMetrics::default()
        };
        for (i, p) in self.particles.iter().enumerate() {
            metrics.total_mass += p.mass;
            metrics.kinetic_energy += p.kinetic_energy();
            metrics.momentum += p.velocity * p.mass;
            metrics.max_speed = metrics.max_speed.max(p.velocity.length());
            let deviation = (ctx.density(i) - rest).abs() / rest;
            metrics.max_density_deviation = metrics.max_density_deviation.max(deviation);
        }
        metrics
    }
}

impl SimulationKernel for Fluid {
    fn step(&mut self, accumulated_time: f64, time_delta: f64) {
        Fluid::step(self, accumulated_time, time_delta);
    }

    fn particles(&self) -> &[Particle] {
        &self.particles
    }

    fn metrics(&self) -> FluidMetrics {
        Fluid::metrics(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::force::Gravity;

    fn pair() -> Vec<Particle> {
        vec![
            Particle::new(DVec3::ZERO, 1.0),
            Particle::new(DVec3::new(0.5, 0.0, 0.0), 1.0),
        ]
    }

    #[test]
    fn new_rejects_invalid_params() {
        let params = FluidParams { fixed_substep: 0.0, ..Default::default() };
        let err = Fluid::new(pair(), params, DomainBounds::default(), Gravity::default()).unwrap_err();
        assert_eq!(err, ParamError::NotPositive { name: "fixed_substep", value: 0.0 });
    }

    #[test]
    fn new_rejects_massless_particle() {
        let particles = vec![Particle::new(DVec3::ZERO, 0.0)];
        let err = Fluid::new(particles, FluidParams::default(), DomainBounds::default(), Gravity::default())
            .unwrap_err();
        assert!(matches!(err, ParamError::NotPositive { name: "mass", .. }));
    }

    #[test]
    fn new_fluid_is_ready_for_queries() {
        let fluid = Fluid::new(pair(), FluidParams::default(), DomainBounds::default(), Gravity::zero()).unwrap();
        assert_eq!(fluid.tick(), 0);
        assert_eq!(fluid.grid().len(), 2);
        assert_eq!(fluid.neighborhood(0), &[1]);
        assert!(fluid.density(0) > 0.0);
    }

    #[test]
    fn empty_fluid_steps() {
        let mut fluid =
            Fluid::new(Vec::new(), FluidParams::default(), DomainBounds::default(), Gravity::default()).unwrap();
        fluid.step(0.0, 0.016);
        assert_eq!(fluid.tick(), 1);
        assert_eq!(fluid.metrics().particle_count, 0);
    }

    #[test]
    fn step_records_tick_and_time() {
        let mut fluid = Fluid::new(pair(), FluidParams::default(), DomainBounds::default(), Gravity::default()).unwrap();
        fluid.step(0.0, 0.016);
        fluid.step(0.016, 0.016);
        assert_eq!(fluid.tick(), 2);
        assert_eq!(fluid.time(), 0.016);
    }

    #[test]
    fn gravity_moves_particle_on_second_tick() {
        let particles = vec![Particle::new(DVec3::ZERO, 1.0)];
        let params = FluidParams { max_speed: None, ..Default::default() };
        let mut fluid = Fluid::new(particles, params, DomainBounds::default(), Gravity::uniform(DVec3::new(0.0, -1.0, 0.0)))
            .unwrap();

        fluid.step(0.0, 0.01);
        // Semi-implicit: first tick only changes velocity.
        assert_eq!(fluid.particles()[0].position, DVec3::ZERO);
        assert!((fluid.particles()[0].velocity.y + 0.01).abs() < 1.0e-12);

        fluid.step(0.01, 0.01);
        assert!(fluid.particles()[0].position.y < 0.0);
    }

    #[test]
    fn metrics_sum_over_particles() {
        let particles = vec![
            Particle::with_velocity(DVec3::ZERO, DVec3::new(1.0, 0.0, 0.0), 2.0),
            Particle::with_velocity(DVec3::new(5.0, 0.0, 0.0), DVec3::new(0.0, -3.0, 0.0), 1.0),
        ];
        let fluid = Fluid::new(particles, FluidParams::default(), DomainBounds::default(), Gravity::zero()).unwrap();
        let m = fluid.metrics();
        assert_eq!(m.particle_count, 2);
        assert_eq!(m.total_mass, 3.0);
        assert_eq!(m.kinetic_energy, 1.0 + 4.5);
        assert_eq!(m.momentum, DVec3::new(2.0, -3.0, 0.0));
        assert_eq!(m.max_speed, 3.0);
        assert_eq!(m.boundary_contacts, 0);
        assert!(m.max_density_deviation.is_finite());
    }

    #[test]
    fn boundary_contacts_are_counted() {
        let particles = vec![Particle::with_velocity(
            DVec3::new(0.0, -9.999, 0.0),
            DVec3::new(0.0, -1.0, 0.0),
            1.0,
        )];
        let mut fluid = Fluid::new(particles, FluidParams::default(), DomainBounds::default(), Gravity::zero()).unwrap();
        fluid.step(0.0, 0.01);
        assert_eq!(fluid.metrics().boundary_contacts, 1);
        assert_eq!(fluid.particles()[0].position.y, -9.999);
        assert!(fluid.particles()[0].velocity.y > 0.0);
    }

    #[test]
    fn usable_through_trait_object() {
        let fluid = Fluid::new(pair(), FluidParams::default(), DomainBounds::default(), Gravity::default()).unwrap();
        let mut kernel: Box<dyn SimulationKernel> = Box::new(fluid);
        kernel.step(0.0, 0.016);
        assert_eq!(kernel.particle_count(), 2);
        assert_eq!(kernel.metrics().total_mass, 2.0);
    }
}
