#![forbid(unsafe_code)]

//! Elm-style program driver.
//!
//! The runtime separates state (Model) from effects (Cmd). `update` is the
//! only state transition function; the program executes the commands it
//! returns. Timers are one-shot, keyed by [`TimerId`], and individually
//! cancelable; re-arming an id replaces its pending deadline. The clock is
//! virtual: the host advances it explicitly, which makes every timer chain
//! deterministic under test.
//!
//! # Example
//!
//! ```
//! use freshlink_runtime::{Cmd, Model, Program, TimerId};
//! use web_time::Duration;
//!
//! struct Blinker {
//!     on: bool,
//! }
//!
//! #[derive(Debug)]
//! enum Msg {
//!     Toggle,
//! }
//!
//! const BLINK: TimerId = TimerId(1);
//!
//! impl Model for Blinker {
//!     type Message = Msg;
//!
//!     fn init(&mut self) -> Cmd<Msg> {
//!         Cmd::timer(BLINK, Duration::from_millis(500), Msg::Toggle)
//!     }
//!
//!     fn update(&mut self, msg: Msg) -> Cmd<Msg> {
//!         match msg {
//!             Msg::Toggle => {
//!                 self.on = !self.on;
//!                 Cmd::timer(BLINK, Duration::from_millis(500), Msg::Toggle)
//!             }
//!         }
//!     }
//! }
//!
//! let mut program = Program::new(Blinker { on: false });
//! program.advance(Duration::from_millis(500));
//! assert!(program.model().on);
//! ```

use crate::effect;
use crate::subscription::{Subscription, SubscriptionManager};
use std::fmt;
use web_time::Duration;

/// Screen state and behavior.
pub trait Model: Sized {
    /// Messages are the only way state changes.
    type Message: Send + 'static;

    /// Startup commands — arm initial timers, kick off initial loads.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// The core state transition function.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// The continuous event sources that should be active for the current
    /// state. Reconciled against the running set after every update.
    fn subscriptions(&self) -> Vec<Box<dyn Subscription<Self::Message>>> {
        Vec::new()
    }
}

/// Identifies a pending timer for cancellation and re-arming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// A one-shot timer: after `delay`, deliver `msg`.
#[derive(Debug)]
pub struct TimerSpec<M> {
    pub id: TimerId,
    pub delay: Duration,
    pub msg: M,
}

/// A fire-once external call. Executed on the program's logical thread;
/// the result message is dispatched like any other. Never retried.
pub struct TaskSpec<M> {
    label: &'static str,
    run: Box<dyn FnOnce() -> M + Send>,
}

impl<M> TaskSpec<M> {
    pub fn new(label: &'static str, run: impl FnOnce() -> M + Send + 'static) -> Self {
        Self {
            label,
            run: Box::new(run),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    fn execute(self) -> M {
        effect::trace_task(self.label, self.run)
    }
}

impl<M> fmt::Debug for TaskSpec<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskSpec").field("label", &self.label).finish()
    }
}

/// Side effects returned from `init()` and `update()`.
#[derive(Debug)]
pub enum Cmd<M> {
    /// No operation.
    None,
    /// Stop the program; pending timers are canceled, feeds stopped.
    Quit,
    /// Feed a message straight back into the model.
    Msg(M),
    /// Execute several commands in order.
    Batch(Vec<Cmd<M>>),
    /// Arm (or re-arm) a one-shot timer.
    Timer(TimerSpec<M>),
    /// Drop a pending timer; a no-op if none is pending under the id.
    CancelTimer(TimerId),
    /// Run a fire-once external call.
    Task(TaskSpec<M>),
}

impl<M> Cmd<M> {
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    #[inline]
    pub fn quit() -> Self {
        Self::Quit
    }

    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    /// Combine commands, flattening the trivial cases.
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds
            .into_iter()
            .filter(|c| !matches!(c, Self::None))
            .collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.remove(0),
            _ => Self::Batch(cmds),
        }
    }

    #[inline]
    pub fn timer(id: TimerId, delay: Duration, msg: M) -> Self {
        Self::Timer(TimerSpec { id, delay, msg })
    }

    #[inline]
    pub fn cancel_timer(id: TimerId) -> Self {
        Self::CancelTimer(id)
    }

    #[inline]
    pub fn task(label: &'static str, run: impl FnOnce() -> M + Send + 'static) -> Self {
        Self::Task(TaskSpec::new(label, run))
    }
}

impl<M> Default for Cmd<M> {
    fn default() -> Self {
        Self::None
    }
}

struct PendingTimer<M> {
    id: TimerId,
    deadline: Duration,
    seq: u64,
    msg: M,
}

/// Drives a [`Model`]: dispatches messages, advances the virtual clock,
/// fires due timers in deadline order, and reconciles subscriptions.
pub struct Program<M: Model> {
    model: M,
    clock: Duration,
    next_seq: u64,
    timers: Vec<PendingTimer<M::Message>>,
    subscriptions: SubscriptionManager<M::Message>,
    running: bool,
}

impl<M: Model> Program<M> {
    pub fn new(mut model: M) -> Self {
        let init_cmd = model.init();
        let mut program = Self {
            model,
            clock: Duration::ZERO,
            next_seq: 0,
            timers: Vec::new(),
            subscriptions: SubscriptionManager::new(),
            running: true,
        };
        program.execute(init_cmd);
        program.reconcile();
        program
    }

    /// Feed a message into the model and execute the resulting commands.
    /// Ignored once the program has shut down.
    pub fn dispatch(&mut self, msg: M::Message) {
        if !self.running {
            return;
        }
        let cmd = self.model.update(msg);
        self.execute(cmd);
        self.reconcile();
    }

    /// Move the virtual clock forward, firing every timer whose deadline
    /// falls inside the window, in deadline order (arm order on ties).
    /// Each timer fires exactly once; firing may arm successors, which are
    /// honored within the same window.
    pub fn advance(&mut self, by: Duration) {
        let target = self.clock + by;
        while self.running {
            let due = self
                .timers
                .iter()
                .enumerate()
                .filter(|(_, t)| t.deadline <= target)
                .min_by_key(|(_, t)| (t.deadline, t.seq))
                .map(|(i, _)| i);
            let Some(idx) = due else { break };
            let timer = self.timers.swap_remove(idx);
            self.clock = self.clock.max(timer.deadline);
            tracing::trace!(
                target: "freshlink.runtime",
                timer = timer.id.0,
                at_ms = self.clock.as_millis() as u64,
                "timer fired"
            );
            self.dispatch(timer.msg);
        }
        if self.running {
            self.clock = target;
        }
        self.pump();
    }

    /// Drain subscription messages into the model.
    pub fn pump(&mut self) {
        for msg in self.subscriptions.drain() {
            if !self.running {
                return;
            }
            let cmd = self.model.update(msg);
            self.execute(cmd);
        }
        self.reconcile();
    }

    /// Tear the program down: cancel all pending timers and stop every
    /// feed, so nothing can fire against the disposed model.
    pub fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        let canceled = self.timers.len();
        self.timers.clear();
        self.subscriptions.stop_all();
        tracing::debug!(target: "freshlink.runtime", canceled, "program shut down");
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Virtual time elapsed since the program started.
    pub fn now(&self) -> Duration {
        self.clock
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn timer_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    fn reconcile(&mut self) {
        if self.running {
            self.subscriptions.reconcile(self.model.subscriptions());
        } else {
            self.subscriptions.stop_all();
        }
    }

    fn execute(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => self.shutdown(),
            Cmd::Msg(m) => {
                let cmd = self.model.update(m);
                self.execute(cmd);
            }
            Cmd::Batch(cmds) => {
                for c in cmds {
                    if !self.running {
                        break;
                    }
                    self.execute(c);
                }
            }
            Cmd::Timer(spec) => {
                self.timers.retain(|t| t.id != spec.id);
                self.next_seq += 1;
                self.timers.push(PendingTimer {
                    id: spec.id,
                    deadline: self.clock + spec.delay,
                    seq: self.next_seq,
                    msg: spec.msg,
                });
            }
            Cmd::CancelTimer(id) => {
                self.timers.retain(|t| t.id != id);
            }
            Cmd::Task(spec) => {
                let msg = spec.execute();
                let cmd = self.model.update(msg);
                self.execute(cmd);
            }
        }
    }
}
