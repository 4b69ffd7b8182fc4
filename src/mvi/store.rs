//! The store: single owner of a state value and its dispatch loop.
//!
//! Every root store runs one loop on its [`Scheduler`]. The loop is the only
//! code that ever holds `&mut State`; handles only get snapshots, observer
//! callbacks and a way to enqueue actions.

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{AbortHandle, Abortable, FutureExt};
use futures::stream::{BoxStream, StreamExt};
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use super::action::Action;
use super::effect::{Effect, EffectId, EffectKind};
use super::reducer::Reducer;
use super::scheduler::Scheduler;
use super::state::UiState;

/// Errors returned when dispatching into a store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The dispatch loop has stopped; the action was not enqueued.
    #[error("Store is closed")]
    Closed,

    /// An action was sent synchronously from inside this store's reducer.
    #[error("Re-entrant dispatch from inside a reducer")]
    ReentrantDispatch,
}

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// Id of the store whose reducer is running on this thread, if any.
    static REDUCING: Cell<Option<u64>> = const { Cell::new(None) };
}

/// Marks the current thread as running a reducer until dropped.
struct ReducingGuard {
    previous: Option<u64>,
}

impl ReducingGuard {
    fn enter(store: u64) -> Self {
        let previous = REDUCING.with(|r| r.replace(Some(store)));
        Self { previous }
    }
}

impl Drop for ReducingGuard {
    fn drop(&mut self) {
        REDUCING.with(|r| r.set(self.previous));
    }
}

type Observer<S> = Box<dyn Fn(&S) + Send + Sync>;

struct ObserverSlot<S> {
    active: AtomicBool,
    /// Held while the observer runs so unsubscribing can wait it out.
    gate: ReentrantMutex<()>,
    observer: Observer<S>,
}

type ObserverList<S> = Arc<Mutex<Vec<Arc<ObserverSlot<S>>>>>;

/// Guard returned by [`Store::subscribe`].
///
/// Once dropped, the observer is never called again. Dropping it from
/// inside the observer itself is allowed.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

/// Which cancellable effect an action came from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Origin {
    id: EffectId,
    generation: u64,
}

enum Message<A> {
    Action {
        action: A,
        origin: Option<Origin>,
        ack: Option<oneshot::Sender<()>>,
    },
    /// A cancellable effect task ran to completion or was aborted.
    Finished(Origin),
}

/// Operations shared by root and scoped stores.
trait StoreCore<S, A>: Send + Sync {
    fn send(&self, action: A, ack: Option<oneshot::Sender<()>>) -> Result<(), StoreError>;
    fn state(&self) -> Arc<S>;
    fn subscribe(&self, observer: Observer<S>) -> Subscription;
}

/// State visible outside the loop.
struct Shared<S> {
    snapshot: RwLock<Arc<S>>,
    observers: ObserverList<S>,
}

impl<S> Shared<S> {
    fn notify(&self, state: &S) {
        let observers = self.observers.lock().clone();
        for slot in observers {
            let _gate = slot.gate.lock();
            if slot.active.load(Ordering::SeqCst) {
                (slot.observer)(state);
            }
        }
    }
}

struct RootCore<S, A> {
    id: u64,
    shared: Arc<Shared<S>>,
    sender: mpsc::UnboundedSender<Message<A>>,
}

impl<S, A> StoreCore<S, A> for RootCore<S, A>
where
    S: UiState,
    A: Action,
{
    fn send(&self, action: A, ack: Option<oneshot::Sender<()>>) -> Result<(), StoreError> {
        if REDUCING.with(|r| r.get()) == Some(self.id) {
            tracing::error!(store = self.id, ?action, "Rejected re-entrant dispatch");
            return Err(StoreError::ReentrantDispatch);
        }
        self.sender
            .send(Message::Action {
                action,
                origin: None,
                ack,
            })
            .map_err(|_| StoreError::Closed)
    }

    fn state(&self) -> Arc<S> {
        self.shared.snapshot.read().clone()
    }

    fn subscribe(&self, observer: Observer<S>) -> Subscription {
        let slot = Arc::new(ObserverSlot {
            active: AtomicBool::new(true),
            gate: ReentrantMutex::new(()),
            observer,
        });
        self.shared.observers.lock().push(Arc::clone(&slot));

        let observers = Arc::downgrade(&self.shared.observers);
        Subscription::new(move || {
            slot.active.store(false, Ordering::SeqCst);
            // Blocks until a callback running on another thread returns.
            drop(slot.gate.lock());
            if let Some(observers) = observers.upgrade() {
                observers.lock().retain(|s| !Arc::ptr_eq(s, &slot));
            }
        })
    }
}

/// A view of a parent store through a pair of mapping functions.
struct ScopedCore<PS, PA, S, A> {
    parent: Arc<dyn StoreCore<PS, PA>>,
    to_local: fn(&PS) -> S,
    from_local: fn(A) -> PA,
}

impl<PS, PA, S, A> StoreCore<S, A> for ScopedCore<PS, PA, S, A>
where
    PS: UiState,
    PA: Action,
    S: UiState,
    A: Action,
{
    fn send(&self, action: A, ack: Option<oneshot::Sender<()>>) -> Result<(), StoreError> {
        self.parent.send((self.from_local)(action), ack)
    }

    fn state(&self) -> Arc<S> {
        Arc::new((self.to_local)(&self.parent.state()))
    }

    fn subscribe(&self, observer: Observer<S>) -> Subscription {
        let to_local = self.to_local;
        let last = Mutex::new((self.to_local)(&self.parent.state()));
        self.parent.subscribe(Box::new(move |parent: &PS| {
            let local = to_local(parent);
            {
                let mut last = last.lock();
                if *last == local {
                    return;
                }
                *last = local.clone();
            }
            observer(&local);
        }))
    }
}

/// Handle to a store.
///
/// Cheap to clone. All clones, and all stores scoped from it, feed the same
/// dispatch loop.
pub struct Store<S, A> {
    core: Arc<dyn StoreCore<S, A>>,
}

impl<S, A> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<S, A> Store<S, A>
where
    S: UiState,
    A: Action,
{
    /// Create a store and start its dispatch loop on `scheduler`.
    pub fn new<R>(
        initial_state: S,
        reducer: R,
        env: R::Environment,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self
    where
        R: Reducer<State = S, Action = A>,
    {
        let id = NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            snapshot: RwLock::new(Arc::new(initial_state.clone())),
            observers: Arc::new(Mutex::new(Vec::new())),
        });

        let store_loop = StoreLoop {
            id,
            reducer,
            env,
            state: initial_state,
            shared: Arc::clone(&shared),
            receiver,
            sender: sender.downgrade(),
            scheduler: Arc::clone(&scheduler),
            in_flight: HashMap::new(),
            next_generation: 0,
        };
        scheduler.spawn(store_loop.run().boxed());

        Self {
            core: Arc::new(RootCore { id, shared, sender }),
        }
    }

    /// Enqueue an action. Returns immediately; actions are reduced in
    /// submission order.
    ///
    /// # Errors
    /// [`StoreError::ReentrantDispatch`] when called from inside this store's
    /// reducer, [`StoreError::Closed`] when the loop has stopped.
    pub fn send(&self, action: A) -> Result<(), StoreError> {
        self.core.send(action, None)
    }

    /// Enqueue an action and wait until it, and every immediate follow-up
    /// action it produced, has been committed.
    pub async fn send_and_wait(&self, action: A) -> Result<(), StoreError> {
        let (ack, committed) = oneshot::channel();
        self.core.send(action, Some(ack))?;
        committed.await.map_err(|_| StoreError::Closed)
    }

    /// Latest committed state.
    pub fn state(&self) -> Arc<S> {
        self.core.state()
    }

    /// Observe every committed state change.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        self.core.subscribe(Box::new(observer))
    }

    /// Resolve with the current state if it satisfies `predicate`, otherwise
    /// with the first committed state that does.
    pub async fn wait_until<P>(&self, predicate: P) -> Result<S, StoreError>
    where
        P: Fn(&S) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        let (matched, mut receiver) = mpsc::unbounded_channel();
        let matcher = Arc::clone(&predicate);
        let _subscription = self.subscribe(move |state: &S| {
            if matcher(state) {
                let _ = matched.send(state.clone());
            }
        });

        let current = self.state();
        if predicate(&current) {
            return Ok((*current).clone());
        }
        receiver.recv().await.ok_or(StoreError::Closed)
    }

    /// Derive a store over a sub-state and sub-action.
    ///
    /// The scoped store has no state of its own: it reads through `to_local`
    /// on the parent snapshot and sends through `from_local` to the parent.
    pub fn scope<LS, LA>(&self, to_local: fn(&S) -> LS, from_local: fn(LA) -> A) -> Store<LS, LA>
    where
        LS: UiState,
        LA: Action,
    {
        Store {
            core: Arc::new(ScopedCore {
                parent: Arc::clone(&self.core),
                to_local,
                from_local,
            }),
        }
    }
}

struct InFlight {
    generation: u64,
    handles: Vec<AbortHandle>,
    running: usize,
}

/// The dispatch loop. Owns the state, the reducer and the environment.
struct StoreLoop<R: Reducer> {
    id: u64,
    reducer: R,
    env: R::Environment,
    state: R::State,
    shared: Arc<Shared<R::State>>,
    receiver: mpsc::UnboundedReceiver<Message<R::Action>>,
    /// Weak so the loop stops once every handle and effect is gone.
    sender: mpsc::WeakUnboundedSender<Message<R::Action>>,
    scheduler: Arc<dyn Scheduler>,
    in_flight: HashMap<EffectId, InFlight>,
    next_generation: u64,
}

impl<R: Reducer> StoreLoop<R> {
    async fn run(mut self) {
        tracing::debug!(store = self.id, "Store loop started");
        while let Some(message) = self.receiver.recv().await {
            match message {
                Message::Action {
                    action,
                    origin,
                    ack,
                } => {
                    if let Some(origin) = &origin {
                        if !self.is_current(origin) {
                            tracing::trace!(
                                store = self.id,
                                effect = %origin.id,
                                ?action,
                                "Dropping action from cancelled effect"
                            );
                            continue;
                        }
                    }
                    self.process(action);
                    if let Some(ack) = ack {
                        let _ = ack.send(());
                    }
                }
                Message::Finished(origin) => self.finish(&origin),
            }
        }
        tracing::debug!(store = self.id, "Store loop stopped");
    }

    /// Reduce `action` and every immediate follow-up, in production order.
    fn process(&mut self, action: R::Action) {
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            tracing::trace!(store = self.id, ?action, "Reducing action");
            let effect = {
                let _guard = ReducingGuard::enter(self.id);
                self.reducer.reduce(&mut self.state, action, &self.env)
            };
            self.commit();
            self.start(effect, None, &mut queue);
        }
    }

    fn commit(&mut self) {
        if **self.shared.snapshot.read() == self.state {
            return;
        }
        let snapshot = Arc::new(self.state.clone());
        *self.shared.snapshot.write() = Arc::clone(&snapshot);
        self.shared.notify(&snapshot);
    }

    fn start(
        &mut self,
        effect: Effect<R::Action>,
        origin: Option<Origin>,
        queue: &mut VecDeque<R::Action>,
    ) {
        match effect.kind {
            EffectKind::None => {}
            EffectKind::Send(action) => queue.push_back(action),
            EffectKind::Run(stream) => self.spawn(stream, origin),
            EffectKind::Merge(effects) => {
                for effect in effects {
                    self.start(effect, origin.clone(), queue);
                }
            }
            EffectKind::Cancellable { id, effect } => {
                self.cancel(&id);
                let generation = self.next_generation;
                self.next_generation += 1;
                self.in_flight.insert(
                    id.clone(),
                    InFlight {
                        generation,
                        handles: Vec::new(),
                        running: 0,
                    },
                );
                self.start(
                    *effect,
                    Some(Origin {
                        id: id.clone(),
                        generation,
                    }),
                    queue,
                );
                if self.in_flight.get(&id).is_some_and(|e| e.running == 0) {
                    self.in_flight.remove(&id);
                }
            }
            EffectKind::Cancel(id) => self.cancel(&id),
        }
    }

    fn spawn(&mut self, stream: BoxStream<'static, R::Action>, origin: Option<Origin>) {
        let Some(sender) = self.sender.upgrade() else {
            tracing::debug!(store = self.id, "Store closed; effect not started");
            return;
        };

        let (abort_handle, registration) = AbortHandle::new_pair();
        if let Some(origin) = &origin {
            if let Some(entry) = self.in_flight.get_mut(&origin.id) {
                entry.handles.push(abort_handle);
                entry.running += 1;
            }
        }

        let store = self.id;
        let feedback = sender.clone();
        let tagged = origin.clone();
        let produce = async move {
            let mut stream = stream;
            while let Some(action) = stream.next().await {
                let message = Message::Action {
                    action,
                    origin: tagged.clone(),
                    ack: None,
                };
                if feedback.send(message).is_err() {
                    break;
                }
            }
        };

        let task = async move {
            let guarded = AssertUnwindSafe(produce).catch_unwind();
            match Abortable::new(guarded, registration).await {
                Ok(Ok(())) => {}
                Ok(Err(_)) => {
                    tracing::error!(store, "Effect panicked; dispatch loop continues");
                }
                Err(_aborted) => {
                    tracing::trace!(store, "Effect cancelled");
                }
            }
            if let Some(origin) = origin {
                let _ = sender.send(Message::Finished(origin));
            }
        };
        self.scheduler.spawn(task.boxed());
    }

    fn cancel(&mut self, id: &EffectId) {
        if let Some(entry) = self.in_flight.remove(id) {
            tracing::debug!(store = self.id, effect = %id, "Cancelling in-flight effect");
            for handle in entry.handles {
                handle.abort();
            }
        }
    }

    fn finish(&mut self, origin: &Origin) {
        let done = match self.in_flight.get_mut(&origin.id) {
            Some(entry) if entry.generation == origin.generation => {
                entry.running = entry.running.saturating_sub(1);
                entry.running == 0
            }
            _ => false,
        };
        if done {
            self.in_flight.remove(&origin.id);
        }
    }

    fn is_current(&self, origin: &Origin) -> bool {
        self.in_flight
            .get(&origin.id)
            .is_some_and(|entry| entry.generation == origin.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mvi::{reducer_fn, TokioScheduler};
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Log {
        entries: Vec<u32>,
    }
    impl UiState for Log {}

    #[derive(Debug, Clone, PartialEq)]
    enum LogAction {
        Push(u32),
        PushTwice(u32),
    }
    impl Action for LogAction {}

    fn log_store() -> Store<Log, LogAction> {
        let reducer = reducer_fn(|state: &mut Log, action: LogAction, _: &()| match action {
            LogAction::Push(n) => {
                state.entries.push(n);
                Effect::none()
            }
            LogAction::PushTwice(n) => {
                state.entries.push(n);
                Effect::send(LogAction::Push(n))
            }
        });
        let scheduler = Arc::new(TokioScheduler::try_current().expect("runtime"));
        Store::new(Log::default(), reducer, (), scheduler)
    }

    #[tokio::test]
    async fn send_and_wait_commits_follow_ups() {
        let store = log_store();
        store.send_and_wait(LogAction::PushTwice(4)).await.unwrap();
        assert_eq!(store.state().entries, vec![4, 4]);
    }

    #[tokio::test]
    async fn dropped_subscription_stops_callbacks() {
        let store = log_store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let subscription = store.subscribe(move |s: &Log| sink.lock().push(s.entries.len()));

        store.send_and_wait(LogAction::Push(1)).await.unwrap();
        drop(subscription);
        store.send_and_wait(LogAction::Push(2)).await.unwrap();

        assert_eq!(*seen.lock(), vec![1]);
    }

    #[tokio::test]
    async fn subscription_can_drop_itself_from_callback() {
        let store = log_store();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let calls = Arc::new(AtomicU64::new(0));

        let own = Arc::clone(&slot);
        let counter = Arc::clone(&calls);
        let subscription = store.subscribe(move |_: &Log| {
            counter.fetch_add(1, Ordering::SeqCst);
            let taken = own.lock().take();
            drop(taken);
        });
        *slot.lock() = Some(subscription);

        store.send_and_wait(LogAction::Push(1)).await.unwrap();
        store.send_and_wait(LogAction::Push(2)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unchanged_state_is_not_published() {
        let reducer = reducer_fn(|_: &mut Log, _: LogAction, _: &()| Effect::none());
        let scheduler = Arc::new(TokioScheduler::try_current().expect("runtime"));
        let store = Store::new(Log::default(), reducer, (), scheduler);
        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);
        let _subscription = store.subscribe(move |_: &Log| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.send_and_wait(LogAction::Push(1)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn wait_until_sees_later_commits() {
        let store = log_store();
        let waiter = {
            let store = store.clone();
            tokio::spawn(async move { store.wait_until(|s: &Log| s.entries.len() == 2).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        store.send(LogAction::PushTwice(9)).unwrap();

        let state = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("timed out")
            .expect("join")
            .expect("store open");
        assert_eq!(state.entries, vec![9, 9]);
    }
}
