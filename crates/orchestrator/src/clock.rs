//! Frame clock and renderer seam
//!
//! The clock owns the simulation and drives it one frame at a time. Each
//! frame it hands the kernel the accumulated time *before* the frame together
//! with the frame delta, then lets a [`FrameSink`] read the particles.

use glam::DVec3;
use sph_kernel::{FluidMetrics, Particle, SimulationKernel};

/// Consumer of particle state after every frame (a renderer, a recorder).
///
/// Sinks only read; particle identity is the index into `particles`.
pub trait FrameSink {
    /// Called once per frame after the step completed.
    fn frame(&mut self, frame: u64, particles: &[Particle]);
}

/// Sink that discards every frame.
impl FrameSink for () {
    fn frame(&mut self, _frame: u64, _particles: &[Particle]) {}
}

/// Drives a [`SimulationKernel`] from frame timestamps.
#[derive(Debug)]
pub struct FrameClock<K> {
    kernel: K,
    accumulated_time: f64,
    frame: u64,
}

impl<K: SimulationKernel> FrameClock<K> {
    /// Create a clock at time zero.
    pub fn new(kernel: K) -> Self {
        Self {
            kernel,
            accumulated_time: 0.0,
            frame: 0,
        }
    }

    /// Step the kernel for a frame stamped `now` (seconds).
    ///
    /// The kernel sees the previous accumulated time and `now - previous`.
    /// Timestamps that go backwards produce a zero delta and leave the
    /// accumulated time where it was.
    pub fn advance(&mut self, now: f64) {
        let previous = self.accumulated_time;
        let delta = now - previous;
        if delta >= 0.0 {
            self.kernel.step(previous, delta);
            self.accumulated_time = now;
        } else {
            tracing::warn!(now, previous, "non-monotonic frame timestamp, clamping delta to 0");
            self.kernel.step(previous, 0.0);
        }
        self.frame += 1;
    }

    /// Advance and hand the resulting particles to `sink`.
    pub fn tick(&mut self, now: f64, sink: &mut impl FrameSink) {
        self.advance(now);
        sink.frame(self.frame, self.kernel.particles());
    }

    /// Run `frames` frames spaced `interval` seconds apart.
    pub fn run(&mut self, frames: u64, interval: f64, sink: &mut impl FrameSink) -> FluidMetrics {
        let start = self.accumulated_time;
        let report_every = (frames / 10).max(1);
        for n in 1..=frames {
            self.tick(start + n as f64 * interval, sink);
            if n % report_every == 0 {
                let metrics = self.kernel.metrics();
                tracing::debug!(
                    frame = self.frame,
                    time = self.accumulated_time,
                    kinetic_energy = metrics.kinetic_energy,
                    max_speed = metrics.max_speed,
                    contacts = metrics.boundary_contacts,
                    "progress"
                );
            }
        }
        self.kernel.metrics()
    }

    /// Accumulated time after the last frame.
    pub fn accumulated_time(&self) -> f64 {
        self.accumulated_time
    }

    /// Frames stepped so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// The driven kernel.
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Mutable access to the driven kernel.
    pub fn kernel_mut(&mut self) -> &mut K {
        &mut self.kernel
    }

    /// Stop the clock and take the kernel back.
    pub fn into_kernel(self) -> K {
        self.kernel
    }
}

/// Headless sink tracking the bounding box and centroid of the fluid.
#[derive(Debug, Clone, Default)]
pub struct BoundsSink {
    /// Smallest coordinates seen in the last frame
    pub min: DVec3,
    /// Largest coordinates seen in the last frame
    pub max: DVec3,
    /// Mean position in the last frame
    pub centroid: DVec3,
    /// Frames received
    pub frames: u64,
    /// Lowest y reached across all frames
    pub lowest: Option<f64>,
}

impl FrameSink for BoundsSink {
    fn frame(&mut self, frame: u64, particles: &[Particle]) {
        self.frames += 1;
        if particles.is_empty() {
            return;
        }

        let mut min = DVec3::splat(f64::INFINITY);
        let mut max = DVec3::splat(f64::NEG_INFINITY);
        let mut sum = DVec3::ZERO;
        for p in particles {
            min = min.min(p.position);
            max = max.max(p.position);
            sum += p.position;
        }
        self.min = min;
        self.max = max;
        self.centroid = sum / particles.len() as f64;
        self.lowest = Some(self.lowest.map_or(min.y, |y| y.min(min.y)));

        tracing::trace!(frame, ?min, ?max, centroid = ?self.centroid, "frame bounds");
    }
}
