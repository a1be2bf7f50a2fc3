#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pacing system that advances running cascades one transition at a time.

use std::time::Duration;

use match3_core::{CascadePhase, Command, Event};

/// Configuration parameters required to construct the cascade driver.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    step_interval: Duration,
}

impl Config {
    /// Creates a configuration that waits `step_interval` between transitions.
    ///
    /// A zero interval requests one transition per call to
    /// [`CascadeDriver::handle`], regardless of elapsed time.
    #[must_use]
    pub const fn new(step_interval: Duration) -> Self {
        Self { step_interval }
    }

    /// Configuration that steps without waiting for the clock.
    #[must_use]
    pub const fn immediate() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Time between two cascade transitions.
    #[must_use]
    pub const fn step_interval(&self) -> Duration {
        self.step_interval
    }
}

/// Pure system that converts elapsed time into `StepCascade` commands.
#[derive(Debug)]
pub struct CascadeDriver {
    step_interval: Duration,
    accumulator: Duration,
    phase: CascadePhase,
}

impl CascadeDriver {
    /// Creates a new driver using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            step_interval: config.step_interval,
            accumulator: Duration::ZERO,
            phase: CascadePhase::Idle,
        }
    }

    /// Consumes world events and emits the cascade steps that are due.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::CascadePhaseChanged { phase } => {
                    self.phase = *phase;
                    if phase.is_idle() {
                        self.accumulator = Duration::ZERO;
                        accumulated = Duration::ZERO;
                    }
                }
                Event::TimeAdvanced { dt } if !self.phase.is_idle() => {
                    accumulated = accumulated.saturating_add(*dt);
                }
                _ => {}
            }
        }

        if self.phase.is_idle() {
            return;
        }

        if self.step_interval.is_zero() {
            out.push(Command::StepCascade);
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        for _ in 0..self.resolve_due_steps() {
            out.push(Command::StepCascade);
        }
    }

    fn resolve_due_steps(&mut self) -> usize {
        let mut steps = 0;
        while self.accumulator >= self.step_interval {
            self.accumulator -= self.step_interval;
            steps += 1;
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_steps_keep_the_remainder() {
        let mut driver = CascadeDriver::new(Config::new(Duration::from_millis(100)));
        driver.accumulator = Duration::from_millis(250);
        assert_eq!(driver.resolve_due_steps(), 2);
        assert_eq!(driver.accumulator, Duration::from_millis(50));
    }

    #[test]
    fn idle_phase_discards_accumulated_time() {
        let mut driver = CascadeDriver::new(Config::new(Duration::from_millis(100)));
        let mut commands = Vec::new();
        driver.handle(
            &[
                Event::CascadePhaseChanged {
                    phase: CascadePhase::Resolving,
                },
                Event::TimeAdvanced {
                    dt: Duration::from_millis(50),
                },
                Event::CascadePhaseChanged {
                    phase: CascadePhase::Idle,
                },
            ],
            &mut commands,
        );
        assert!(commands.is_empty());
        assert_eq!(driver.accumulator, Duration::ZERO);
    }
}
