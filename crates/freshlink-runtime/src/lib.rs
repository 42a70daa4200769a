#![forbid(unsafe_code)]

//! FreshLink Runtime
//!
//! A small Elm-style runtime for screen logic: state lives in a [`Model`],
//! every change flows through `update`, and side effects come back as
//! [`Cmd`] values the runtime executes — one-shot cancelable timers,
//! fire-once service tasks, and declarative session subscriptions.
//!
//! # Key Components
//!
//! - [`Model`] - Trait for screen state and behavior
//! - [`Cmd`] - Side effects returned from `update`
//! - [`Program`] - The driver: dispatches messages, advances the clock,
//!   fires due timers, reconciles subscriptions, and tears everything down
//!   on shutdown so nothing fires against a disposed model
//! - [`Subscription`] / [`SubscriptionManager`] - Continuous event sources
//!   with managed lifecycles
//! - [`SessionFeed`] - Built-in subscription bridging the auth service's
//!   session observer into the message loop
//!
//! # Concurrency model
//! Single logical thread of control. All state transitions happen on
//! discrete events: a dispatched message, a timer reaching its deadline, or
//! a drained subscription message. Subscriptions run on background threads
//! but only ever communicate through the channel; the model is never
//! touched off-thread.

pub mod effect;
pub mod program;
pub mod subscription;

pub use effect::{feeds_started_total, tasks_executed_total};
pub use program::{Cmd, Model, Program, TaskSpec, TimerId, TimerSpec};
pub use subscription::{
    MockFeed, SessionFeed, StopSignal, SubId, Subscription, SubscriptionManager,
};
