//! Floor reflection scenario.
//!
//! A single particle falls under gravity onto a floor at y = -10 with
//! restitution 0.6. On the tick where its projected position would cross the
//! floor, the committed position must equal the position at the start of the
//! tick and the committed vertical velocity must be -0.6 times the
//! pre-reflection velocity.

use glam::DVec3;
use sph_kernel::{clamp_speed, AxisBounds, DomainBounds, Fluid, FluidParams, Gravity, Particle};

const FLOOR: f64 = -10.0;
const RESTITUTION: f64 = 0.6;

fn falling_particle(start_height: f64) -> Fluid {
    let bounds = DomainBounds {
        x: AxisBounds::closed(-10.0, 10.0, 0.9),
        y: AxisBounds::floor(FLOOR, RESTITUTION),
        z: AxisBounds::closed(-10.0, 10.0, 0.9),
    };
    let particles = vec![Particle::new(DVec3::new(0.0, start_height, 0.0), 1.0)];
    Fluid::new(particles, FluidParams::default(), bounds, Gravity::default()).unwrap()
}

#[test]
fn floor_reflects_and_holds_position() {
    let mut fluid = falling_particle(-9.0);
    let dt = 0.016;
    let substep = fluid.params().fixed_substep;
    let max_speed = fluid.params().max_speed;

    let mut bounces = 0;
    for frame in 0..2000 {
        let time = frame as f64 * dt;
        fluid.begin_tick();

        let before = fluid.particles()[0].clone();
        let acceleration = fluid.acceleration(0, time);
        let new_velocity = clamp_speed(before.velocity + acceleration * substep, max_speed);
        let projected = before.position + before.velocity * substep;

        fluid.integrate_all(time, dt);
        let after = &fluid.particles()[0];

        if projected.y < FLOOR {
            bounces += 1;
            assert_eq!(
                after.position, before.position,
                "frame {frame}: position moved through the floor"
            );
            let expected = -RESTITUTION * new_velocity.y;
            assert!(
                (after.velocity.y - expected).abs() < 1.0e-12,
                "frame {frame}: vy={}, expected={expected}",
                after.velocity.y
            );
        } else {
            assert_eq!(after.position, projected, "frame {frame}");
        }
        assert!(after.position.y >= FLOOR, "frame {frame}: y={}", after.position.y);
    }

    assert!(bounces > 0, "particle never reached the floor");
}

#[test]
fn bounce_loses_energy() {
    let mut fluid = falling_particle(-9.5);
    let dt = 0.016;

    // Fall until the first contact.
    let mut frame = 0;
    let impact_speed = loop {
        let speed = fluid.particles()[0].velocity.y.abs();
        fluid.step(frame as f64 * dt, dt);
        frame += 1;
        if fluid.metrics().boundary_contacts == 1 {
            break speed;
        }
        assert!(frame < 1000, "no contact");
    };

    let rebound = fluid.particles()[0].velocity.y;
    assert!(rebound > 0.0, "rebound should point up, got {rebound}");
    assert!(rebound < impact_speed, "rebound={rebound}, impact={impact_speed}");
}
