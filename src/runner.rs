//! This module drives a `TuringMachine` over time. A `Runner` executes steps in ticks, either
//! one step per tick or a batch of steps per tick at full speed, and renders once per tick.
//! `Runner::run` is a complete scheduling loop; interactive front ends can call
//! `Runner::tick` from their own event loop instead and wait the returned delay.

use crate::machine::TuringMachine;
use crate::render::{Renderer, Snapshot};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Status shown while a run is in progress.
pub const STATUS_RUNNING: &str = "Running...";
/// Status shown after a run was paused.
pub const STATUS_PAUSED: &str = "Paused; run or step to resume.";

/// How many steps a tick executes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speed {
    /// One step per tick.
    #[default]
    Normal,
    /// A batch of steps per tick, with a shorter interval between ticks.
    Full,
}

/// Timing parameters of the run loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Maximum number of steps per tick at full speed.
    pub batch_size: usize,
    /// Delay between ticks at normal speed, in milliseconds.
    pub normal_interval_ms: u64,
    /// Delay between ticks at full speed, in milliseconds.
    pub full_interval_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            batch_size: 25,
            normal_interval_ms: 50,
            full_interval_ms: 10,
        }
    }
}

/// The result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The machine can continue; the next tick is due after this delay.
    Continue(Duration),
    /// The machine halted during this tick.
    Halted,
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Halted,
    /// The cancellation token was triggered. The machine can be resumed.
    Paused,
}

/// A cooperative stop request shared between a runner and whoever wants to pause it.
///
/// The token is only checked between ticks, so a full-speed batch in progress
/// always completes first.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that the run stops before its next tick.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clears a previous request so the next run can proceed.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Schedules steps of a machine.
#[derive(Debug, Clone, Default)]
pub struct Runner {
    config: RunConfig,
    speed: Speed,
    token: CancellationToken,
}

impl Runner {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            speed: Speed::default(),
            token: CancellationToken::new(),
        }
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn set_speed(&mut self, speed: Speed) {
        self.speed = speed;
    }

    pub fn toggle_speed(&mut self) {
        self.speed = match self.speed {
            Speed::Normal => Speed::Full,
            Speed::Full => Speed::Normal,
        };
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Returns a handle that pauses this runner when cancelled.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Executes one tick and renders the result once.
    ///
    /// At normal speed the tick is a single step. At full speed it is up to
    /// `batch_size` steps, ending early as soon as the machine halts.
    pub fn tick<R: Renderer + ?Sized>(&self, machine: &mut TuringMachine, renderer: &mut R) -> Tick {
        let (steps, interval) = match self.speed {
            Speed::Normal => (1, self.config.normal_interval_ms),
            Speed::Full => (self.config.batch_size.max(1), self.config.full_interval_ms),
        };

        let mut halted = false;
        for _ in 0..steps {
            if !machine.step().is_continue() {
                halted = true;
                break;
            }
        }

        renderer.render(&Snapshot::capture(machine));

        if halted {
            Tick::Halted
        } else {
            Tick::Continue(Duration::from_millis(interval))
        }
    }

    /// Runs the machine until it halts or the cancellation token is triggered.
    ///
    /// The token is checked before every tick. Calling `run` again after a
    /// pause (and after resetting the token) resumes from the current machine
    /// state.
    pub fn run<R: Renderer + ?Sized>(
        &self,
        machine: &mut TuringMachine,
        renderer: &mut R,
    ) -> RunOutcome {
        machine.set_status(STATUS_RUNNING);
        debug!(speed = ?self.speed, step = machine.step_count(), "run started");

        loop {
            if self.token.is_cancelled() {
                machine.set_status(STATUS_PAUSED);
                renderer.render(&Snapshot::capture(machine));
                debug!(step = machine.step_count(), "run paused");
                return RunOutcome::Paused;
            }

            match self.tick(machine, renderer) {
                Tick::Continue(delay) => {
                    if !delay.is_zero() {
                        thread::sleep(delay);
                    }
                }
                Tick::Halted => {
                    debug!(step = machine.step_count(), "run halted");
                    return RunOutcome::Halted;
                }
            }
        }
    }
}

/// Which control requests are valid for the current machine and run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub step: bool,
    pub run: bool,
    pub stop: bool,
    pub reset: bool,
    pub speed: bool,
}

impl Controls {
    /// While running only a stop is accepted. Once halted, only a reset (or a
    /// speed change) makes sense.
    pub fn for_machine(machine: &TuringMachine, running: bool) -> Self {
        if running {
            return Self {
                step: false,
                run: false,
                stop: true,
                reset: false,
                speed: false,
            };
        }

        let idle = !machine.is_halted();
        Self {
            step: idle,
            run: idle,
            stop: false,
            reset: true,
            speed: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTER: &str = "0 1 1 r 0\n0 _ _ * halt";

    fn instant(batch_size: usize) -> Runner {
        Runner::new(RunConfig {
            batch_size,
            normal_interval_ms: 0,
            full_interval_ms: 0,
        })
    }

    /// Cancels the token after a given number of renders.
    struct PauseAfter {
        renders: usize,
        limit: usize,
        token: CancellationToken,
        snapshots: Vec<Snapshot>,
    }

    impl Renderer for PauseAfter {
        fn render(&mut self, snapshot: &Snapshot) {
            self.renders += 1;
            self.snapshots.push(snapshot.clone());
            if self.renders == self.limit {
                self.token.cancel();
            }
        }
    }

    #[test]
    fn test_default_config() {
        let config = RunConfig::default();

        assert_eq!(config.batch_size, 25);
        assert_eq!(config.normal_interval_ms, 50);
        assert_eq!(config.full_interval_ms, 10);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: RunConfig = serde_json::from_str(r#"{"batch_size": 5}"#).unwrap();

        assert_eq!(config.batch_size, 5);
        assert_eq!(config.normal_interval_ms, 50);
    }

    #[test]
    fn test_normal_tick_is_one_step() {
        let runner = Runner::new(RunConfig::default());
        let mut machine = TuringMachine::new(COUNTER, "111");
        let mut sink: Vec<Snapshot> = Vec::new();

        let tick = runner.tick(&mut machine, &mut sink);

        assert_eq!(tick, Tick::Continue(Duration::from_millis(50)));
        assert_eq!(machine.step_count(), 1);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_full_speed_tick_is_a_batch() {
        let mut runner = Runner::new(RunConfig::default());
        runner.set_speed(Speed::Full);
        let mut machine = TuringMachine::new(COUNTER, &"1".repeat(100));
        let mut sink: Vec<Snapshot> = Vec::new();

        let tick = runner.tick(&mut machine, &mut sink);

        assert_eq!(tick, Tick::Continue(Duration::from_millis(10)));
        assert_eq!(machine.step_count(), 25);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].step_count, 25);
    }

    #[test]
    fn test_full_speed_batch_stops_on_halt() {
        let mut runner = Runner::new(RunConfig::default());
        runner.set_speed(Speed::Full);
        let mut machine = TuringMachine::new(COUNTER, "111");
        let mut sink: Vec<Snapshot> = Vec::new();

        let tick = runner.tick(&mut machine, &mut sink);

        assert_eq!(tick, Tick::Halted);
        assert_eq!(machine.step_count(), 4);
        assert!(machine.is_halted());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_run_to_halt_normal_speed() {
        let runner = instant(25);
        let mut machine = TuringMachine::new(COUNTER, "11111");
        let mut sink: Vec<Snapshot> = Vec::new();

        let outcome = runner.run(&mut machine, &mut sink);

        assert_eq!(outcome, RunOutcome::Halted);
        assert_eq!(machine.step_count(), 6);
        // One render per step
        assert_eq!(sink.len(), 6);
        assert_eq!(sink.last().unwrap().state, "halt");
    }

    #[test]
    fn test_run_to_halt_full_speed() {
        let mut runner = instant(4);
        runner.set_speed(Speed::Full);
        let mut machine = TuringMachine::new(COUNTER, "1111111111");
        let mut sink: Vec<Snapshot> = Vec::new();

        let outcome = runner.run(&mut machine, &mut sink);

        assert_eq!(outcome, RunOutcome::Halted);
        assert_eq!(machine.step_count(), 11);
        // Batches of 4, 4 and 3
        assert_eq!(sink.len(), 3);
    }

    #[test]
    fn test_cancelled_before_run() {
        let runner = instant(25);
        let mut machine = TuringMachine::new(COUNTER, "11");
        runner.token().cancel();

        let outcome = runner.run(&mut machine, &mut ());

        assert_eq!(outcome, RunOutcome::Paused);
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.status(), STATUS_PAUSED);
    }

    #[test]
    fn test_pause_and_resume() {
        let runner = instant(25);
        let mut machine = TuringMachine::new(COUNTER, "11111");
        let mut sink = PauseAfter {
            renders: 0,
            limit: 2,
            token: runner.token(),
            snapshots: Vec::new(),
        };

        assert_eq!(runner.run(&mut machine, &mut sink), RunOutcome::Paused);
        assert_eq!(machine.step_count(), 2);
        assert_eq!(machine.head(), 2);
        assert!(!machine.is_halted());

        runner.token().reset();
        assert_eq!(runner.run(&mut machine, &mut sink), RunOutcome::Halted);
        assert_eq!(machine.step_count(), 6);
        assert_eq!(machine.tape().contents(), "11111");
    }

    #[test]
    fn test_pause_waits_for_full_batch() {
        let mut runner = instant(3);
        runner.set_speed(Speed::Full);
        let mut machine = TuringMachine::new(COUNTER, &"1".repeat(20));
        let mut sink = PauseAfter {
            renders: 0,
            limit: 1,
            token: runner.token(),
            snapshots: Vec::new(),
        };

        assert_eq!(runner.run(&mut machine, &mut sink), RunOutcome::Paused);
        assert_eq!(machine.step_count(), 3);
    }

    #[test]
    fn test_reset_keeps_speed() {
        let mut runner = instant(25);
        runner.set_speed(Speed::Full);
        let mut machine = TuringMachine::new(COUNTER, "1");
        runner.run(&mut machine, &mut ());

        machine.reset("1");

        assert_eq!(runner.speed(), Speed::Full);
        assert_eq!(machine.step_count(), 0);
    }

    #[test]
    fn test_toggle_speed() {
        let mut runner = Runner::default();
        assert_eq!(runner.speed(), Speed::Normal);

        runner.toggle_speed();
        assert_eq!(runner.speed(), Speed::Full);

        runner.toggle_speed();
        assert_eq!(runner.speed(), Speed::Normal);
    }

    #[test]
    fn test_controls() {
        let mut machine = TuringMachine::new(COUNTER, "");

        let idle = Controls::for_machine(&machine, false);
        assert!(idle.step && idle.run && idle.reset && idle.speed);
        assert!(!idle.stop);

        let running = Controls::for_machine(&machine, true);
        assert!(running.stop);
        assert!(!running.step && !running.run && !running.reset && !running.speed);

        machine.step();
        let halted = Controls::for_machine(&machine, false);
        assert!(!halted.step && !halted.run && !halted.stop);
        assert!(halted.reset && halted.speed);
    }
}
