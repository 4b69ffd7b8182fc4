//! Effect descriptions returned by reducers.
//!
//! An [`Effect`] is a value, not execution: the [`Store`](super::Store)
//! decides when and where it runs. Effects never touch state, they only
//! produce future actions.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::future::FutureExt;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use thiserror::Error;

/// Identity used to cancel in-flight effects.
///
/// Starting a cancellable effect under an id that is already running
/// cancels the previous one first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EffectId(Cow<'static, str>);

impl EffectId {
    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for EffectId {
    fn from(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }
}

impl From<String> for EffectId {
    fn from(id: String) -> Self {
        Self(Cow::Owned(id))
    }
}

/// A task effect panicked before producing its result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Effect panicked: {message}")]
pub struct EffectPanic {
    message: String,
}

impl EffectPanic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self { message }
    }
}

/// Deferred work that yields zero or more actions.
#[must_use = "effects do nothing unless returned to the store"]
pub struct Effect<A> {
    pub(crate) kind: EffectKind<A>,
}

pub(crate) enum EffectKind<A> {
    None,
    /// Fed back into the store before any other queued action.
    Send(A),
    /// Every item is dispatched as it arrives.
    Run(BoxStream<'static, A>),
    Merge(Vec<Effect<A>>),
    Cancellable {
        id: EffectId,
        effect: Box<Effect<A>>,
    },
    Cancel(EffectId),
}

impl<A: Send + 'static> Effect<A> {
    /// No follow-up work.
    pub fn none() -> Self {
        Self {
            kind: EffectKind::None,
        }
    }

    /// Immediately feed `action` back into the store.
    pub fn send(action: A) -> Self {
        Self {
            kind: EffectKind::Send(action),
        }
    }

    /// Run a future and dispatch its output.
    pub fn future<F>(future: F) -> Self
    where
        F: Future<Output = A> + Send + 'static,
    {
        Self::stream(stream::once(future))
    }

    /// Run a fallible future and map its result to an action.
    ///
    /// This is how operations that can fail reach the reducer: the error
    /// becomes the failure variant of an action instead of escaping the
    /// dispatch loop. A panic inside `future` is reported to `map` as an
    /// `Err` built from [`EffectPanic`].
    pub fn task<F, T, E, M>(future: F, map: M) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: From<EffectPanic>,
        M: FnOnce(Result<T, E>) -> A + Send + 'static,
    {
        Self::future(async move {
            let result = match AssertUnwindSafe(future).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => {
                    let panic = EffectPanic::from_payload(payload.as_ref());
                    tracing::error!(error = %panic, "Task effect panicked");
                    Err(E::from(panic))
                }
            };
            map(result)
        })
    }

    /// Run a future whose output is not needed.
    pub fn fire_and_forget<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self::stream(stream::once(future).filter_map(|()| async { None }))
    }

    /// Dispatch every item of `stream` as it is produced.
    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream<Item = A> + Send + 'static,
    {
        Self {
            kind: EffectKind::Run(stream.boxed()),
        }
    }

    /// Run several effects concurrently.
    pub fn merge(effects: impl IntoIterator<Item = Effect<A>>) -> Self {
        let mut effects: Vec<_> = effects.into_iter().filter(|e| !e.is_none()).collect();
        match effects.len() {
            0 => Self::none(),
            1 => effects.remove(0),
            _ => Self {
                kind: EffectKind::Merge(effects),
            },
        }
    }

    /// Cancel whatever runs under `id`. Actions it already queued are dropped.
    pub fn cancel(id: impl Into<EffectId>) -> Self {
        Self {
            kind: EffectKind::Cancel(id.into()),
        }
    }

    /// Make this effect cancellable under `id`, superseding any effect
    /// already in flight under the same id.
    pub fn cancellable(self, id: impl Into<EffectId>) -> Self {
        if self.is_none() {
            return self;
        }
        Self {
            kind: EffectKind::Cancellable {
                id: id.into(),
                effect: Box::new(self),
            },
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self.kind, EffectKind::None)
    }

    /// Transform the actions this effect produces.
    ///
    /// Used by pullback to re-embed child actions into the parent type.
    pub fn map<B, F>(self, f: F) -> Effect<B>
    where
        F: Fn(A) -> B + Clone + Send + Sync + 'static,
        B: Send + 'static,
    {
        let kind = match self.kind {
            EffectKind::None => EffectKind::None,
            EffectKind::Send(action) => EffectKind::Send(f(action)),
            EffectKind::Run(stream) => EffectKind::Run(stream.map(f).boxed()),
            EffectKind::Merge(effects) => EffectKind::Merge(
                effects.into_iter().map(|e| e.map(f.clone())).collect(),
            ),
            EffectKind::Cancellable { id, effect } => EffectKind::Cancellable {
                id,
                effect: Box::new(effect.map(f)),
            },
            EffectKind::Cancel(id) => EffectKind::Cancel(id),
        };
        Effect { kind }
    }
}

impl<A: fmt::Debug> fmt::Debug for Effect<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            EffectKind::None => write!(f, "Effect::None"),
            EffectKind::Send(action) => f.debug_tuple("Effect::Send").field(action).finish(),
            EffectKind::Run(_) => write!(f, "Effect::Run(<stream>)"),
            EffectKind::Merge(effects) => f.debug_tuple("Effect::Merge").field(effects).finish(),
            EffectKind::Cancellable { id, effect } => f
                .debug_struct("Effect::Cancellable")
                .field("id", id)
                .field("effect", effect)
                .finish(),
            EffectKind::Cancel(id) => f.debug_tuple("Effect::Cancel").field(id).finish(),
        }
    }
}
