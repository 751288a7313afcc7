//! Scaling test: step throughput against particle count, serial and parallel.
//!
//! Run with: cargo bench -p sph_kernel --bench scaling

use std::time::Instant;

use glam::DVec3;
use sph_kernel::{DomainBounds, Fluid, FluidParams, Gravity, Particle};

/// Cube of roughly `target_count` particles at half the smoothing radius.
fn create_particle_cube(target_count: usize, parallel: bool) -> Fluid {
    let n_per_axis = (target_count as f64).cbrt().ceil() as usize;
    let spacing = 0.5;
    let offset = DVec3::splat(-0.5 * spacing * n_per_axis as f64);

    let mut particles = Vec::with_capacity(n_per_axis.pow(3));
    for ix in 0..n_per_axis {
        for iy in 0..n_per_axis {
            for iz in 0..n_per_axis {
                let p = DVec3::new(ix as f64, iy as f64, iz as f64) * spacing + offset;
                particles.push(Particle::new(p, 1.0));
            }
        }
    }

    let params = FluidParams { parallel, ..Default::default() };
    let bounds = DomainBounds::unbounded();
    Fluid::new(particles, params, bounds, Gravity::default()).expect("valid benchmark setup")
}

fn main() {
    println!("=== CPU Scaling Test ===\n");

    // (target particles, steps) -- fewer steps at larger counts
    let configs = [(1_000, 50), (4_000, 20), (8_000, 10), (27_000, 4)];

    println!(
        "{:>10} {:>10} {:>10} {:>12} {:>12}",
        "Particles", "Steps", "Mode", "steps/s", "ms/step"
    );

    for &(n, steps) in &configs {
        for parallel in [false, true] {
            let mut fluid = create_particle_cube(n, parallel);
            let actual_n = fluid.particles().len();
            let dt = 1.0 / 60.0;

            // Warmup
            for frame in 0..2 {
                fluid.step(frame as f64 * dt, dt);
            }

            let start = Instant::now();
            for frame in 0..steps {
                fluid.step(frame as f64 * dt, dt);
            }
            let elapsed = start.elapsed().as_secs_f64();
            let sps = steps as f64 / elapsed;
            let ms_per_step = elapsed * 1000.0 / steps as f64;
            let mode = if parallel { "parallel" } else { "serial" };

            println!(
                "{:>10} {:>10} {:>10} {:>12.1} {:>12.2}",
                actual_n, steps, mode, sps, ms_per_step
            );
        }
    }
}
