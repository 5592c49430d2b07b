use tracing::{info, trace};

use crate::error::Result;
use crate::sim::Simulation;
use crate::surface::Surface;

/// Platform hook that delivers the next frame callback.
pub trait Scheduler {
    type Handle;

    /// Requests one more frame callback.
    fn schedule(&mut self) -> Result<Self::Handle>;
    /// Withdraws a request that has not fired yet.
    fn cancel(&mut self, handle: Self::Handle);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Stopped,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The loop is stopped; the callback was stale.
    Idle,
    /// Arrived before the minimum interval elapsed and was rescheduled.
    Skipped,
    /// Stepped the simulation and redrew the surface.
    Ticked,
}

/// Runs the simulation from frame callbacks with a soft frame-rate cap.
pub struct Driver<S: Scheduler> {
    sim: Simulation,
    scheduler: S,
    pending: Option<S::Handle>,
    state: DriverState,
    last_tick_ms: f64,
}

impl<S: Scheduler> Driver<S> {
    pub fn new(sim: Simulation, scheduler: S) -> Self {
        Self {
            sim,
            scheduler,
            pending: None,
            state: DriverState::Stopped,
            last_tick_ms: 0.0,
        }
    }

    pub fn start(&mut self, now_ms: f64) -> Result<()> {
        if self.state == DriverState::Running {
            return Ok(());
        }
        self.last_tick_ms = now_ms;
        self.pending = Some(self.scheduler.schedule()?);
        self.state = DriverState::Running;
        info!("animation started");
        Ok(())
    }

    /// Cancels the pending callback; simulation state is left as is.
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
        if self.state == DriverState::Running {
            info!(ticks = self.sim.ticks(), "animation stopped");
        }
        self.state = DriverState::Stopped;
    }

    /// Returns whether the loop is running afterwards.
    pub fn toggle(&mut self, now_ms: f64) -> Result<bool> {
        match self.state {
            DriverState::Running => self.stop(),
            DriverState::Stopped => self.start(now_ms)?,
        }
        Ok(self.is_running())
    }

    /// Entry point for every frame callback delivered by the scheduler.
    pub fn on_frame<T: Surface + ?Sized>(
        &mut self,
        now_ms: f64,
        surface: &mut T,
    ) -> Result<FrameOutcome> {
        if self.state == DriverState::Stopped {
            return Ok(FrameOutcome::Idle);
        }
        self.pending = None;

        let outcome = if now_ms - self.last_tick_ms < self.sim.config().min_interval_ms {
            trace!(now_ms, "frame skipped");
            FrameOutcome::Skipped
        } else {
            self.last_tick_ms = now_ms;
            self.sim.step();
            self.sim.render(surface);
            FrameOutcome::Ticked
        };

        self.pending = Some(self.scheduler.schedule()?);
        Ok(outcome)
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn sim(&self) -> &Simulation {
        &self.sim
    }

    pub fn sim_mut(&mut self) -> &mut Simulation {
        &mut self.sim
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}
