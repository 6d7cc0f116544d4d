#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure pacing system that converts elapsed frame time into step commands.

use std::time::Duration;

use maze_carver_core::{Command, Event, GenerationMode};

/// Default number of steps a single tick may request.
pub const DEFAULT_MAX_STEPS_PER_TICK: u32 = 64;

/// Configuration parameters controlling how fast carving advances.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PacingConfig {
    step_interval: Duration,
    max_steps_per_tick: u32,
}

impl PacingConfig {
    /// Creates a configuration emitting one step per `step_interval`, never
    /// more than `max_steps_per_tick` at once.
    #[must_use]
    pub const fn new(step_interval: Duration, max_steps_per_tick: u32) -> Self {
        Self {
            step_interval,
            max_steps_per_tick,
        }
    }

    /// Time that must elapse between consecutive steps.
    #[must_use]
    pub const fn step_interval(&self) -> Duration {
        self.step_interval
    }

    /// Upper bound on the steps requested by a single tick.
    #[must_use]
    pub const fn max_steps_per_tick(&self) -> u32 {
        self.max_steps_per_tick
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self::new(Duration::ZERO, DEFAULT_MAX_STEPS_PER_TICK)
    }
}

/// Pacing system that emits [`Command::Step`] while carving is running.
#[derive(Debug, Clone)]
pub struct Pacer {
    config: PacingConfig,
    mode: GenerationMode,
    accumulator: Duration,
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(PacingConfig::default())
    }
}

impl Pacer {
    /// Creates a pacer that starts out in input mode.
    #[must_use]
    pub const fn new(config: PacingConfig) -> Self {
        Self {
            config,
            mode: GenerationMode::Input,
            accumulator: Duration::ZERO,
        }
    }

    /// Generation mode most recently observed through events.
    #[must_use]
    pub const fn mode(&self) -> GenerationMode {
        self.mode
    }

    /// Consumes engine events and the elapsed frame time to emit step commands.
    ///
    /// Leftover time beyond the per-tick cap is discarded so a long stall
    /// does not turn into a burst of steps on later ticks.
    pub fn handle(&mut self, events: &[Event], dt: Duration, out: &mut Vec<Command>) {
        for event in events {
            if let Event::ModeChanged { mode } = event {
                self.mode = *mode;
            }
        }

        if self.mode != GenerationMode::Running {
            self.accumulator = Duration::ZERO;
            return;
        }

        let steps = self.resolve_steps(dt);
        out.extend((0..steps).map(|_| Command::Step));
    }

    fn resolve_steps(&mut self, dt: Duration) -> u32 {
        let cap = self.config.max_steps_per_tick;
        if self.config.step_interval.is_zero() {
            return cap;
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        let mut steps = 0;
        while self.accumulator >= self.config.step_interval {
            if steps == cap {
                self.accumulator = Duration::ZERO;
                break;
            }
            self.accumulator -= self.config.step_interval;
            steps += 1;
        }
        steps
    }
}
