//! Reference test framework for SPH fluid simulation validation
//!
//! A reference test loads a scenario configuration, drives the fluid through
//! the frame clock for a number of frames and validates the final state
//! against physical expectations.


use glam::DVec3;
use sph_kernel::{FluidMetrics, Particle};
use sph_orchestrator::{create_simulation, BoundsSink, ConfigError};

/// Expected result criteria for a reference test
#[derive(Debug, Clone, Default)]
pub struct ExpectedResult {
    /// Particle position bounds validation
    pub position_bounds: Option<PositionBoundsCheck>,
    /// Every position and velocity must be finite
    pub finite_state: bool,
    /// Speed cap validation
    pub speed: Option<SpeedCheck>,
    /// Mass conservation validation
    pub conservation: Option<ConservationCheck>,
    /// The fluid must fall under gravity
    pub descent: Option<DescentCheck>,
    /// No particle may ever go below the floor
    pub floor: Option<FloorCheck>,
}

/// Check that particles remain within specified bounds
#[derive(Debug, Clone)]
pub struct PositionBoundsCheck {
    /// Minimum allowed position [x, y, z]
    pub min: [f64; 3],
    /// Maximum allowed position [x, y, z]
    pub max: [f64; 3],
}

/// Check that no particle exceeds a speed
#[derive(Debug, Clone)]
pub struct SpeedCheck {
    /// Largest allowed speed
    pub max_speed: f64,
}

/// Check total mass against the seeded mass
#[derive(Debug, Clone)]
pub struct ConservationCheck {
    /// Mass seeded at start
    pub expected_mass: f64,
    /// Maximum allowed relative error (0.0 to 1.0)
    pub max_mass_error: f64,
}

/// Check that the centroid moved down
#[derive(Debug, Clone)]
pub struct DescentCheck {
    /// Minimum drop of the centroid's y coordinate
    pub min_drop: f64,
}

/// Check the lowest y seen during the whole run
#[derive(Debug, Clone)]
pub struct FloorCheck {
    /// Floor y position
    pub floor_y: f64,
}

/// Result of running a reference test
#[derive(Debug)]
pub struct TestResult {
    /// Test name
    pub name: String,
    /// Whether test passed
    pub passed: bool,
    /// Individual check results
    pub checks: Vec<CheckResult>,
    /// Final fluid metrics
    pub metrics: FluidMetrics,
    /// Number of frames executed
    pub frames: u64,
    /// Accumulated frame time (seconds)
    pub sim_time: f64,
}

/// Result of an individual validation check
#[derive(Debug)]
pub struct CheckResult {
    /// Check name
    pub name: String,
    /// Whether check passed
    pub passed: bool,
    /// Detail message
    pub message: Option<String>,
}

impl CheckResult {
    fn pass(name: &str, message: Option<String>) -> Self {
        Self { name: name.to_string(), passed: true, message }
    }

    fn fail(name: &str, message: String) -> Self {
        Self { name: name.to_string(), passed: false, message: Some(message) }
    }
}

/// A reference test case
pub struct ReferenceTest {
    /// Test name
    pub name: String,
    /// Path to configuration file
    pub config_path: String,
    /// Frames to run; the configuration's frame count when `None`
    pub frames: Option<u64>,
    /// Expected results to validate
    pub expected: ExpectedResult,
}

impl ReferenceTest {
    /// Run the reference test and return results
    pub fn run(&self) -> Result<TestResult, ConfigError> {
        tracing::info!("Running reference test: {}", self.name);

        let (config, mut clock) = create_simulation(&self.config_path)?;
        let frames = self.frames.unwrap_or(config.frames);
        let initial_centroid = centroid(clock.kernel().particles());

        tracing::info!("Running {} frames...", frames);
        let mut sink = BoundsSink::default();
        let metrics = clock.run(frames, config.frame_interval, &mut sink);
        tracing::info!(
            "Simulation complete: {} frames, {:.3}s accumulated, {} ticks",
            frames,
            clock.accumulated_time(),
            clock.kernel().tick()
        );

        let particles = clock.kernel().particles();
        let mut checks = Vec::new();

        if let Some(ref bounds) = self.expected.position_bounds {
            checks.push(validate_position_bounds(particles, bounds));
        }
        if self.expected.finite_state {
            checks.push(validate_finite_state(particles));
        }
        if let Some(ref speed) = self.expected.speed {
            checks.push(validate_speed(&metrics, speed));
        }
        if let Some(ref conservation) = self.expected.conservation {
            checks.push(validate_conservation(&metrics, conservation));
        }
        if let Some(ref descent) = self.expected.descent {
            checks.push(validate_descent(initial_centroid, centroid(particles), descent));
        }
        if let Some(ref floor) = self.expected.floor {
            checks.push(validate_floor(sink.lowest, floor));
        }

        Ok(TestResult {
            name: self.name.clone(),
            passed: checks.iter().all(|c| c.passed),
            checks,
            metrics,
            frames,
            sim_time: clock.accumulated_time(),
        })
    }
}

fn centroid(particles: &[Particle]) -> DVec3 {
    if particles.is_empty() {
        return DVec3::ZERO;
    }
    particles.iter().map(|p| p.position).sum::<DVec3>() / particles.len() as f64
}

/// Validate that particles remain within specified bounds
fn validate_position_bounds(particles: &[Particle], bounds: &PositionBoundsCheck) -> CheckResult {
    let min = DVec3::from(bounds.min);
    let max = DVec3::from(bounds.max);

    let mut violations = 0;
    let mut max_violation = 0.0_f64;
    for p in particles {
        let below = (min - p.position).max(DVec3::ZERO);
        let above = (p.position - max).max(DVec3::ZERO);
        let worst = below.max_element().max(above.max_element());
        if worst > 0.0 {
            violations += 1;
            max_violation = max_violation.max(worst);
        }
    }

    if violations == 0 {
        CheckResult::pass("Position Bounds", None)
    } else {
        CheckResult::fail(
            "Position Bounds",
            format!("{violations} particles out of bounds (max violation: {max_violation:.6})"),
        )
    }
}

/// Validate that no position or velocity is NaN or infinite
fn validate_finite_state(particles: &[Particle]) -> CheckResult {
    let bad = particles
        .iter()
        .filter(|p| !p.position.is_finite() || !p.velocity.is_finite())
        .count();
    if bad == 0 {
        CheckResult::pass("Finite State", Some(format!("{} particles", particles.len())))
    } else {
        CheckResult::fail("Finite State", format!("{bad} particles with non-finite state"))
    }
}

/// Validate the speed cap
fn validate_speed(metrics: &FluidMetrics, check: &SpeedCheck) -> CheckResult {
    let message = format!("Max speed: {:.4} (limit: {:.4})", metrics.max_speed, check.max_speed);
    if metrics.max_speed <= check.max_speed * (1.0 + 1e-9) {
        CheckResult::pass("Speed Cap", Some(message))
    } else {
        CheckResult::fail("Speed Cap", message)
    }
}

/// Validate mass conservation
fn validate_conservation(metrics: &FluidMetrics, check: &ConservationCheck) -> CheckResult {
    let error = (metrics.total_mass - check.expected_mass).abs() / check.expected_mass.abs().max(1e-12);
    if error <= check.max_mass_error {
        CheckResult::pass(
            "Conservation",
            Some(format!("Mass: {:.6} (error: {:.3}%)", metrics.total_mass, error * 100.0)),
        )
    } else {
        CheckResult::fail(
            "Conservation",
            format!(
                "Mass: {:.6}, expected {:.6} (error: {:.3}%, limit: {:.3}%)",
                metrics.total_mass,
                check.expected_mass,
                error * 100.0,
                check.max_mass_error * 100.0
            ),
        )
    }
}

/// Validate that the fluid moved down under gravity
fn validate_descent(initial: DVec3, last: DVec3, check: &DescentCheck) -> CheckResult {
    let drop = initial.y - last.y;
    let message = format!(
        "Centroid y: {:.4} -> {:.4} (drop {:.4}, required {:.4})",
        initial.y, last.y, drop, check.min_drop
    );
    if drop >= check.min_drop {
        CheckResult::pass("Descent", Some(message))
    } else {
        CheckResult::fail("Descent", message)
    }
}

/// Validate that no frame ever showed a particle below the floor
fn validate_floor(lowest: Option<f64>, check: &FloorCheck) -> CheckResult {
    match lowest {
        Some(y) if y >= check.floor_y => {
            CheckResult::pass("Floor", Some(format!("Lowest y: {y:.6} (floor: {:.6})", check.floor_y)))
        }
        Some(y) => CheckResult::fail("Floor", format!("Lowest y: {y:.6} is below floor {:.6}", check.floor_y)),
        None => CheckResult::fail("Floor", "No frames recorded".to_string()),
    }
}

impl TestResult {
    /// Print a summary of the test result
    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(80));
        println!("Test: {}", self.name);
        println!("{}", "=".repeat(80));
        println!("Status: {}", if self.passed { "PASSED" } else { "FAILED" });
        println!("Frames: {}", self.frames);
        println!("Accumulated time: {:.3} s", self.sim_time);
        println!("\nMetrics:");
        println!("  Particles: {}", self.metrics.particle_count);
        println!("  Total mass: {:.6}", self.metrics.total_mass);
        println!("  Kinetic energy: {:.6}", self.metrics.kinetic_energy);
        println!("  Momentum: {:?}", self.metrics.momentum.to_array());
        println!("  Max density deviation: {:.2}%", self.metrics.max_density_deviation * 100.0);
        println!("  Max speed: {:.4}", self.metrics.max_speed);
        println!("  Wall contacts (last tick): {}", self.metrics.boundary_contacts);
        println!("\nValidation Checks:");
        for check in &self.checks {
            let status = if check.passed { "PASS" } else { "FAIL" };
            print!("  [{}] {}", status, check.name);
            if let Some(ref msg) = check.message {
                print!(" - {}", msg);
            }
            println!();
        }
        println!("{}", "=".repeat(80));
    }
}
