//! Reference test binary entry point
//!
//! Runs every reference scenario and exits non-zero if any check fails.
//! Paths are relative to the repository root; set `RUST_LOG` to change the
//! log level (default `info`).

use sph_reference_tests::{
    ConservationCheck, DescentCheck, ExpectedResult, FloorCheck, PositionBoundsCheck, ReferenceTest, SpeedCheck,
    TestResult,
};
use tracing_subscriber::EnvFilter;

/// Walls of the default domain, with headroom above the open top.
fn domain_bounds() -> PositionBoundsCheck {
    PositionBoundsCheck {
        min: [-10.0, -10.0, -10.0],
        max: [10.0, 100.0, 10.0],
    }
}

/// Dam break
///
/// A 10x5x10 block released above the floor must fall, stay inside the
/// walls, respect the speed cap and keep its mass.
fn dam_break_test() -> ReferenceTest {
    ReferenceTest {
        name: "Dam Break".to_string(),
        config_path: "configs/dam-break.json".to_string(),
        frames: None,
        expected: ExpectedResult {
            position_bounds: Some(domain_bounds()),
            finite_state: true,
            speed: Some(SpeedCheck { max_speed: 10.0 }),
            conservation: Some(ConservationCheck {
                expected_mass: 500.0,
                max_mass_error: 1e-12,
            }),
            descent: Some(DescentCheck { min_drop: 2.0 }),
            floor: Some(FloorCheck { floor_y: -10.0 }),
        },
    }
}

/// Single drop
///
/// One isolated particle falls onto the floor and bounces without
/// tunnelling through it.
fn single_drop_test() -> ReferenceTest {
    ReferenceTest {
        name: "Single Drop".to_string(),
        config_path: "configs/single-drop.json".to_string(),
        frames: None,
        expected: ExpectedResult {
            position_bounds: Some(domain_bounds()),
            finite_state: true,
            speed: Some(SpeedCheck { max_speed: 10.0 }),
            conservation: None,
            descent: Some(DescentCheck { min_drop: 5.0 }),
            floor: Some(FloorCheck { floor_y: -10.0 }),
        },
    }
}

/// Parallel block
///
/// Same checks with the acceleration phase on the thread pool.
fn parallel_block_test() -> ReferenceTest {
    ReferenceTest {
        name: "Parallel Block".to_string(),
        config_path: "configs/parallel-block.json".to_string(),
        frames: None,
        expected: ExpectedResult {
            position_bounds: Some(domain_bounds()),
            finite_state: true,
            speed: Some(SpeedCheck { max_speed: 8.0 }),
            conservation: Some(ConservationCheck {
                expected_mass: 256.0,
                max_mass_error: 1e-12,
            }),
            descent: None,
            floor: Some(FloorCheck { floor_y: -10.0 }),
        },
    }
}

/// Get all reference tests
fn all_tests() -> Vec<ReferenceTest> {
    vec![dam_break_test(), single_drop_test(), parallel_block_test()]
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    tracing::info!("SPH Reference Test Suite");
    tracing::info!("========================");

    let tests = all_tests();
    tracing::info!("Found {} reference tests", tests.len());

    let mut results: Vec<TestResult> = Vec::new();
    let mut passed_count = 0;
    let mut failed_count = 0;

    for test in tests {
        match test.run() {
            Ok(result) => {
                if result.passed {
                    passed_count += 1;
                } else {
                    failed_count += 1;
                }
                result.print_summary();
                results.push(result);
            }
            Err(e) => {
                tracing::error!("Test {} could not run: {}", test.name, e);
                failed_count += 1;
            }
        }
    }

    println!("\n{}", "=".repeat(80));
    println!("OVERALL SUMMARY");
    println!("{}", "=".repeat(80));
    println!("Total tests: {}", passed_count + failed_count);
    println!("Passed: {}", passed_count);
    println!("Failed: {}", failed_count);
    println!("{}", "=".repeat(80));

    if failed_count > 0 {
        std::process::exit(1);
    }
}
