#![forbid(unsafe_code)]

//! Managed subscription feeds.
//!
//! A subscription is a continuous event source — here, the auth service's
//! session observer — declared by the model rather than wired by hand:
//!
//! 1. `Model::subscriptions()` returns the set that should be active
//! 2. After every update the runtime reconciles declared against running
//! 3. New ids are started, absent ids are stopped, unchanged ids are left alone
//! 4. Feed messages are drained into `Model::update()`
//!
//! Reconciliation is what gives the auth gate its guarantees: the feed is
//! started once (dedupe by id), and it is released on every exit path —
//! navigation away, shutdown, or the manager simply being dropped.

use crate::effect;
use freshlink_core::{AuthService, IdentityId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, mpsc};
use std::thread;
use web_time::Duration;

/// Stable identifier used to deduplicate feeds across reconcile cycles.
pub type SubId = u64;

/// A continuous source of messages, run on a background thread until the
/// channel closes or the stop signal fires.
pub trait Subscription<M: Send + 'static>: Send {
    fn id(&self) -> SubId;

    fn run(&self, sender: mpsc::Sender<M>, stop: StopSignal);
}

struct StopFlag {
    stopped: AtomicBool,
    notify: (Mutex<()>, Condvar),
}

/// Cooperative stop signal observed by a running feed.
#[derive(Clone)]
pub struct StopSignal {
    inner: Arc<StopFlag>,
}

impl StopSignal {
    pub(crate) fn pair() -> (Self, StopTrigger) {
        let inner = Arc::new(StopFlag {
            stopped: AtomicBool::new(false),
            notify: (Mutex::new(()), Condvar::new()),
        });
        (
            Self {
                inner: Arc::clone(&inner),
            },
            StopTrigger { inner },
        )
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire)
    }

    /// Block until the stop trigger fires.
    pub fn wait(&self) {
        let (lock, cvar) = &self.inner.notify;
        let mut guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        while !self.is_stopped() {
            guard = cvar.wait(guard).unwrap_or_else(|e| e.into_inner());
        }
    }

    /// Block until stopped or the timeout elapses. Returns `true` if stopped.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let (lock, cvar) = &self.inner.notify;
        let guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        if self.is_stopped() {
            return true;
        }
        let _ = cvar
            .wait_timeout(guard, duration)
            .unwrap_or_else(|e| e.into_inner());
        self.is_stopped()
    }
}

pub(crate) struct StopTrigger {
    inner: Arc<StopFlag>,
}

impl StopTrigger {
    pub(crate) fn stop(&self) {
        self.inner.stopped.store(true, Ordering::Release);
        let (lock, cvar) = &self.inner.notify;
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        cvar.notify_all();
    }
}

struct RunningFeed {
    trigger: StopTrigger,
    thread: Option<thread::JoinHandle<()>>,
}

impl RunningFeed {
    fn stop(mut self, id: SubId) {
        self.trigger.stop();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
        effect::record_feed_stop(id);
    }
}

impl Drop for RunningFeed {
    fn drop(&mut self) {
        // Joining in drop could block the main thread; the trigger alone
        // lets the feed wind down on its own.
        self.trigger.stop();
    }
}

/// Owns the running feeds for one program.
pub struct SubscriptionManager<M: Send + 'static> {
    running: HashMap<SubId, RunningFeed>,
    sender: mpsc::Sender<M>,
    receiver: mpsc::Receiver<M>,
}

impl<M: Send + 'static> SubscriptionManager<M> {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            running: HashMap::new(),
            sender,
            receiver,
        }
    }

    /// Align running feeds with the declared set.
    pub fn reconcile(&mut self, declared: Vec<Box<dyn Subscription<M>>>) {
        let declared_ids: Vec<SubId> = declared.iter().map(|s| s.id()).collect();

        let stale: Vec<SubId> = self
            .running
            .keys()
            .copied()
            .filter(|id| !declared_ids.contains(id))
            .collect();
        for id in stale {
            if let Some(feed) = self.running.remove(&id) {
                tracing::debug!(target: "freshlink.effect", sub_id = id, "stopping feed");
                feed.stop(id);
            }
        }

        for sub in declared {
            let id = sub.id();
            if self.running.contains_key(&id) {
                continue;
            }
            tracing::debug!(target: "freshlink.effect", sub_id = id, "starting feed");
            effect::record_feed_start(id);
            let (signal, trigger) = StopSignal::pair();
            let sender = self.sender.clone();
            let thread = thread::spawn(move || sub.run(sender, signal));
            self.running.insert(
                id,
                RunningFeed {
                    trigger,
                    thread: Some(thread),
                },
            );
        }
    }

    /// Drain messages produced by the feeds since the last call.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }

    /// Stop every running feed and join its thread.
    pub fn stop_all(&mut self) {
        for (id, feed) in self.running.drain() {
            feed.stop(id);
        }
    }

    pub fn active_count(&self) -> usize {
        self.running.len()
    }
}

impl<M: Send + 'static> Default for SubscriptionManager<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Send + 'static> Drop for SubscriptionManager<M> {
    fn drop(&mut self) {
        self.stop_all();
    }
}

// ── Built-in feeds ──────────────────────────────────────────────────────

/// Bridges [`AuthService::observe_session`] into the message loop.
///
/// The observer watch is acquired when the feed starts and dropped when the
/// feed stops, so the hosted callback is always released together with the
/// screen that declared it.
pub struct SessionFeed<M: Send + 'static> {
    id: SubId,
    auth: Arc<dyn AuthService>,
    make_msg: Arc<dyn Fn(Option<IdentityId>) -> M + Send + Sync>,
}

impl<M: Send + 'static> SessionFeed<M> {
    pub fn new(
        id: SubId,
        auth: Arc<dyn AuthService>,
        make_msg: impl Fn(Option<IdentityId>) -> M + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            auth,
            make_msg: Arc::new(make_msg),
        }
    }
}

impl<M: Send + 'static> Subscription<M> for SessionFeed<M> {
    fn id(&self) -> SubId {
        self.id
    }

    fn run(&self, sender: mpsc::Sender<M>, stop: StopSignal) {
        let make_msg = Arc::clone(&self.make_msg);
        let watch = self.auth.observe_session(Box::new(move |identity| {
            let _ = sender.send(make_msg(identity));
        }));
        stop.wait();
        drop(watch);
    }
}

/// Deterministic feed for tests: sends its queued messages, then idles
/// until stopped.
pub struct MockFeed<M: Send + 'static> {
    id: SubId,
    messages: Vec<M>,
}

impl<M: Send + Clone + 'static> MockFeed<M> {
    pub fn new(id: SubId, messages: Vec<M>) -> Self {
        Self { id, messages }
    }
}

impl<M: Send + Clone + 'static> Subscription<M> for MockFeed<M> {
    fn id(&self) -> SubId {
        self.id
    }

    fn run(&self, sender: mpsc::Sender<M>, stop: StopSignal) {
        for msg in &self.messages {
            if sender.send(msg.clone()).is_err() {
                return;
            }
        }
        stop.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use freshlink_core::MockAuthService;

    #[derive(Debug, Clone, PartialEq)]
    enum TestMsg {
        Session(Option<IdentityId>),
        Value(i32),
    }

    fn sleep_briefly() {
        thread::sleep(std::time::Duration::from_millis(30));
    }

    #[test]
    fn stop_signal_starts_unstopped() {
        let (signal, _trigger) = StopSignal::pair();
        assert!(!signal.is_stopped());
    }

    #[test]
    fn stop_signal_observes_trigger() {
        let (signal, trigger) = StopSignal::pair();
        trigger.stop();
        assert!(signal.is_stopped());
        assert!(signal.wait_timeout(Duration::from_millis(50)));
    }

    #[test]
    fn wait_timeout_times_out_when_untriggered() {
        let (signal, _trigger) = StopSignal::pair();
        assert!(!signal.wait_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn wait_unblocks_on_stop() {
        let (signal, trigger) = StopSignal::pair();
        let handle = thread::spawn(move || signal.wait());
        thread::sleep(std::time::Duration::from_millis(20));
        trigger.stop();
        handle.join().unwrap();
    }

    #[test]
    fn mock_feed_delivers_queued_messages() {
        let mut mgr = SubscriptionManager::<TestMsg>::new();
        mgr.reconcile(vec![Box::new(MockFeed::new(
            1,
            vec![TestMsg::Value(1), TestMsg::Value(2)],
        ))]);
        sleep_briefly();
        assert_eq!(mgr.drain(), vec![TestMsg::Value(1), TestMsg::Value(2)]);
        mgr.stop_all();
    }

    #[test]
    fn reconcile_dedupes_by_id() {
        let mut mgr = SubscriptionManager::<TestMsg>::new();
        mgr.reconcile(vec![
            Box::new(MockFeed::new(7, vec![TestMsg::Value(1)])),
            Box::new(MockFeed::new(7, vec![TestMsg::Value(2)])),
        ]);
        sleep_briefly();
        assert_eq!(mgr.active_count(), 1);
        assert_eq!(mgr.drain(), vec![TestMsg::Value(1)]);
        mgr.stop_all();
    }

    #[test]
    fn reconcile_keeps_unchanged_feed_running() {
        let mut mgr = SubscriptionManager::<TestMsg>::new();
        mgr.reconcile(vec![Box::new(MockFeed::new(3, vec![TestMsg::Value(1)]))]);
        sleep_briefly();
        let _ = mgr.drain();
        // Same id declared again: the feed is not restarted, so its queued
        // message is not re-sent.
        mgr.reconcile(vec![Box::new(MockFeed::new(3, vec![TestMsg::Value(1)]))]);
        sleep_briefly();
        assert!(mgr.drain().is_empty());
        mgr.stop_all();
    }

    #[test]
    fn reconcile_stops_undeclared_feed() {
        let mut mgr = SubscriptionManager::<TestMsg>::new();
        mgr.reconcile(vec![Box::new(MockFeed::new(5, vec![]))]);
        sleep_briefly();
        assert_eq!(mgr.active_count(), 1);
        mgr.reconcile(vec![]);
        assert_eq!(mgr.active_count(), 0);
    }

    #[test]
    fn session_feed_reports_current_state_then_changes() {
        let auth = Arc::new(MockAuthService::new());
        let mut mgr = SubscriptionManager::<TestMsg>::new();
        mgr.reconcile(vec![Box::new(SessionFeed::new(
            9,
            auth.clone() as Arc<dyn AuthService>,
            TestMsg::Session,
        ))]);
        sleep_briefly();
        assert_eq!(mgr.drain(), vec![TestMsg::Session(None)]);

        let id = auth.register_identity("amal@example.com", "secret1").unwrap();
        sleep_briefly();
        assert_eq!(mgr.drain(), vec![TestMsg::Session(Some(id))]);
        mgr.stop_all();
    }

    #[test]
    fn stopping_session_feed_releases_the_watch() {
        let auth = Arc::new(MockAuthService::new());
        let mut mgr = SubscriptionManager::<TestMsg>::new();
        mgr.reconcile(vec![Box::new(SessionFeed::new(
            9,
            auth.clone() as Arc<dyn AuthService>,
            TestMsg::Session,
        ))]);
        sleep_briefly();
        mgr.stop_all();

        // Changes after release must not reach the channel.
        auth.sign_out();
        sleep_briefly();
        let after: Vec<TestMsg> = mgr
            .drain()
            .into_iter()
            .filter(|m| *m == TestMsg::Session(None))
            .collect();
        assert!(after.len() <= 1, "watch survived stop: {after:?}");
    }
}
