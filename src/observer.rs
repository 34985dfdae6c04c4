//! Diagnostic observers for activation traceability.
//!
//! This module provides hooks for observing activation events, enabling
//! structured tracing, performance monitoring, and debugging of wiring
//! behavior without touching the engine itself.

use std::sync::Arc;
use std::time::Duration;

use crate::error::WireError;

/// Observer trait for activation events.
///
/// Observers see the engine walk an object graph: activation start and end,
/// every wired member, every lifecycle entry. All methods default to no-ops,
/// so implementations pick the events they care about.
///
/// # Performance
///
/// Observer calls are made synchronously during activation. Keep
/// implementations lightweight; for expensive work, queue events and process
/// them elsewhere.
///
/// # Examples
///
/// ```rust
/// use std::sync::atomic::{AtomicU64, Ordering};
/// use std::sync::Arc;
/// use wirework::{ActivationObserver, Bindings};
///
/// #[derive(Default)]
/// struct CountingObserver {
///     wired: AtomicU64,
/// }
///
/// impl ActivationObserver for CountingObserver {
///     fn member_wired(&self, _owner: &'static str, _member: &'static str, _impl_name: &'static str) {
///         self.wired.fetch_add(1, Ordering::Relaxed);
///     }
/// }
///
/// let mut bindings = Bindings::new();
/// let observer = Arc::new(CountingObserver::default());
/// bindings.add_observer(observer.clone());
/// let _activator = bindings.build();
/// // Every subsequent activation reports its wired members to the observer
/// ```
pub trait ActivationObserver: Send + Sync {
    /// Called when an activation starts, before any member is wired.
    fn activating(&self, _root: &'static str) {}

    /// Called after a member has been produced and written.
    ///
    /// `owner` is the level that declares the member, `impl_name` the
    /// concrete implementation that was bound to it.
    fn member_wired(&self, _owner: &'static str, _member: &'static str, _impl_name: &'static str) {}

    /// Called after a lifecycle entry ran successfully.
    fn lifecycle_invoked(&self, _owner: &'static str, _member: &'static str) {}

    /// Called when the whole activation succeeded.
    ///
    /// `elapsed` covers wiring and lifecycle for the full graph.
    fn activated(&self, _root: &'static str, _elapsed: Duration) {}

    /// Called when the activation failed; the error still propagates to the
    /// caller after this hook.
    fn activation_failed(&self, _root: &'static str, _error: &WireError) {}
}

/// Container for registered observers.
///
/// Holds all registered observers and fans events out to them. Designed for
/// minimal overhead when no observers are registered.
#[derive(Default)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn ActivationObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn ActivationObserver>) {
        self.observers.push(observer);
    }

    /// True if any observers are registered. Lets hot paths skip timing work.
    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn activating(&self, root: &'static str) {
        for observer in &self.observers {
            observer.activating(root);
        }
    }

    #[inline]
    pub(crate) fn member_wired(&self, owner: &'static str, member: &'static str, impl_name: &'static str) {
        for observer in &self.observers {
            observer.member_wired(owner, member, impl_name);
        }
    }

    #[inline]
    pub(crate) fn lifecycle_invoked(&self, owner: &'static str, member: &'static str) {
        for observer in &self.observers {
            observer.lifecycle_invoked(owner, member);
        }
    }

    #[inline]
    pub(crate) fn activated(&self, root: &'static str, elapsed: Duration) {
        for observer in &self.observers {
            observer.activated(root, elapsed);
        }
    }

    #[inline]
    pub(crate) fn activation_failed(&self, root: &'static str, error: &WireError) {
        for observer in &self.observers {
            observer.activation_failed(root, error);
        }
    }
}

/// Built-in observer that emits activation events as `tracing` events.
///
/// Useful for development and for services that already ship a `tracing`
/// subscriber; wire events land under the `wirework` target.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use wirework::{Bindings, TracingObserver};
///
/// let mut bindings = Bindings::new();
/// bindings.add_observer(Arc::new(TracingObserver::new()));
/// let _activator = bindings.build();
/// ```
#[derive(Default)]
pub struct TracingObserver;

impl TracingObserver {
    /// Creates the observer.
    pub fn new() -> Self {
        Self
    }
}

impl ActivationObserver for TracingObserver {
    fn activating(&self, root: &'static str) {
        tracing::debug!(target: "wirework", root, "activation started");
    }

    fn member_wired(&self, owner: &'static str, member: &'static str, impl_name: &'static str) {
        tracing::debug!(target: "wirework", owner, member, impl_name, "member wired");
    }

    fn lifecycle_invoked(&self, owner: &'static str, member: &'static str) {
        tracing::debug!(target: "wirework", owner, member, "lifecycle entry ran");
    }

    fn activated(&self, root: &'static str, elapsed: Duration) {
        tracing::info!(target: "wirework", root, ?elapsed, "activation finished");
    }

    fn activation_failed(&self, root: &'static str, error: &WireError) {
        tracing::error!(target: "wirework", root, %error, "activation failed");
    }
}
