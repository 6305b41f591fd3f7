//! Engine-side promise records.
//!
//! A [`PromiseRecord`] holds the state of one promise and the reactions
//! registered on it. Settling a record never runs a handler: it returns the
//! [`ReactionJob`]s the host must enqueue on its microtask queue, so
//! continuations always run after the settling call stack unwinds.

use thiserror::Error;

/// The state of a promise.
///
/// Once settled (Fulfilled or Rejected), a promise cannot change state.
#[derive(Debug, Clone, PartialEq)]
pub enum PromiseState<V> {
    /// The initial state; the promise is neither fulfilled nor rejected.
    Pending,
    /// The promise has been fulfilled with a value.
    Fulfilled(V),
    /// The promise has been rejected with a reason.
    Rejected(V),
}

impl<V> PromiseState<V> {
    /// Returns `true` if the promise is no longer pending.
    pub fn is_settled(&self) -> bool {
        !matches!(self, PromiseState::Pending)
    }
}

/// Errors from settling a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PromiseError {
    /// The record was already fulfilled or rejected.
    #[error("promise is already settled")]
    AlreadySettled,
}

/// Which way a promise settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionKind {
    /// Fulfillment
    Fulfill,
    /// Rejection
    Reject,
}

/// The derived promise of a `then` call, with its resolving functions.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionCapability<V> {
    /// The promise returned by `then`
    pub promise: V,
    /// Resolves `promise` with the handler result
    pub resolve: V,
    /// Rejects `promise` when the handler throws
    pub reject: V,
}

/// Handlers registered with `then`.
#[derive(Debug, Clone, PartialEq)]
pub struct PromiseReaction<V> {
    /// Called with the fulfillment value
    pub on_fulfilled: Option<V>,
    /// Called with the rejection reason
    pub on_rejected: Option<V>,
    /// Settled with the handler outcome; `None` for internal reactions
    pub capability: Option<ReactionCapability<V>>,
}

impl<V> PromiseReaction<V> {
    /// Creates a reaction.
    pub fn new(
        on_fulfilled: Option<V>,
        on_rejected: Option<V>,
        capability: Option<ReactionCapability<V>>,
    ) -> Self {
        Self {
            on_fulfilled,
            on_rejected,
            capability,
        }
    }

    fn into_job(self, kind: ReactionKind, argument: V) -> ReactionJob<V> {
        let handler = match kind {
            ReactionKind::Fulfill => self.on_fulfilled,
            ReactionKind::Reject => self.on_rejected,
        };
        ReactionJob {
            kind,
            handler,
            capability: self.capability,
            argument,
        }
    }
}

/// A reaction ready to run on the microtask queue.
///
/// With no handler, the settlement passes through to the capability
/// unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionJob<V> {
    /// How the source promise settled
    pub kind: ReactionKind,
    /// The handler to call, if one was registered for `kind`
    pub handler: Option<V>,
    /// The derived promise to settle with the outcome
    pub capability: Option<ReactionCapability<V>>,
    /// The settlement value or reason
    pub argument: V,
}

impl<V> ReactionJob<V> {
    /// Visits every value held by the job.
    pub fn for_each_value(&self, mut f: impl FnMut(&V)) {
        if let Some(handler) = &self.handler {
            f(handler);
        }
        if let Some(capability) = &self.capability {
            f(&capability.promise);
            f(&capability.resolve);
            f(&capability.reject);
        }
        f(&self.argument);
    }
}

/// State of one promise.
///
/// # Examples
///
/// ```
/// use async_runtime::{PromiseReaction, PromiseRecord, ReactionKind};
///
/// let mut promise: PromiseRecord<&str> = PromiseRecord::new();
/// let jobs = promise.reject("boom").unwrap();
/// assert!(jobs.is_empty());
/// assert!(promise.is_unhandled_rejection());
///
/// let job = promise.then(PromiseReaction::new(None, Some("handler"), None)).unwrap();
/// assert_eq!(job.kind, ReactionKind::Reject);
/// assert!(!promise.is_unhandled_rejection());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PromiseRecord<V> {
    state: PromiseState<V>,
    reactions: Vec<PromiseReaction<V>>,
    is_handled: bool,
}

impl<V: Clone> PromiseRecord<V> {
    /// Creates a pending promise.
    pub fn new() -> Self {
        Self {
            state: PromiseState::Pending,
            reactions: Vec::new(),
            is_handled: false,
        }
    }

    /// The current state.
    pub fn state(&self) -> &PromiseState<V> {
        &self.state
    }

    /// Returns true while pending.
    pub fn is_pending(&self) -> bool {
        !self.state.is_settled()
    }

    /// Whether a `then` has ever been registered.
    pub fn is_handled(&self) -> bool {
        self.is_handled
    }

    /// Rejected with no handler registered yet.
    pub fn is_unhandled_rejection(&self) -> bool {
        matches!(self.state, PromiseState::Rejected(_)) && !self.is_handled
    }

    /// Marks the promise as observed without registering a reaction.
    pub fn mark_handled(&mut self) {
        self.is_handled = true;
    }

    /// Checks if there are pending reactions.
    pub fn has_pending_reactions(&self) -> bool {
        !self.reactions.is_empty()
    }

    /// Fulfills the promise and returns the jobs for its reactions.
    pub fn fulfill(&mut self, value: V) -> Result<Vec<ReactionJob<V>>, PromiseError> {
        self.settle(ReactionKind::Fulfill, value)
    }

    /// Rejects the promise and returns the jobs for its reactions.
    ///
    /// The caller reports the rejection to its tracker when
    /// [`is_handled`](Self::is_handled) is false.
    pub fn reject(&mut self, reason: V) -> Result<Vec<ReactionJob<V>>, PromiseError> {
        self.settle(ReactionKind::Reject, reason)
    }

    fn settle(&mut self, kind: ReactionKind, argument: V) -> Result<Vec<ReactionJob<V>>, PromiseError> {
        if self.state.is_settled() {
            return Err(PromiseError::AlreadySettled);
        }
        self.state = match kind {
            ReactionKind::Fulfill => PromiseState::Fulfilled(argument.clone()),
            ReactionKind::Reject => PromiseState::Rejected(argument.clone()),
        };
        Ok(self
            .reactions
            .drain(..)
            .map(|reaction| reaction.into_job(kind, argument.clone()))
            .collect())
    }

    /// Registers a reaction.
    ///
    /// On a settled promise the reaction is returned as a job to enqueue
    /// right away; on a pending one it is stored and `None` is returned.
    /// Either way the promise counts as handled from now on.
    pub fn then(&mut self, reaction: PromiseReaction<V>) -> Option<ReactionJob<V>> {
        self.is_handled = true;
        match &self.state {
            PromiseState::Pending => {
                self.reactions.push(reaction);
                None
            }
            PromiseState::Fulfilled(value) => {
                Some(reaction.into_job(ReactionKind::Fulfill, value.clone()))
            }
            PromiseState::Rejected(reason) => {
                Some(reaction.into_job(ReactionKind::Reject, reason.clone()))
            }
        }
    }

    /// Visits every value held by the record.
    pub fn for_each_value(&self, mut f: impl FnMut(&V)) {
        match &self.state {
            PromiseState::Fulfilled(value) | PromiseState::Rejected(value) => f(value),
            PromiseState::Pending => {}
        }
        for reaction in &self.reactions {
            if let Some(handler) = &reaction.on_fulfilled {
                f(handler);
            }
            if let Some(handler) = &reaction.on_rejected {
                f(handler);
            }
            if let Some(capability) = &reaction.capability {
                f(&capability.promise);
                f(&capability.resolve);
                f(&capability.reject);
            }
        }
    }
}

impl<V: Clone> Default for PromiseRecord<V> {
    fn default() -> Self {
        Self::new()
    }
}
