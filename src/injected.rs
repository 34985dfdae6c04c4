//! Injected member slots and the shell around wired values.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use parking_lot::MutexGuard;

use crate::aspects::{AccessRecord, AccessReport, AspectShell};
use crate::error::{WireError, WireResult};
use crate::proxy::VirtualCell;

/// An injectable member slot.
///
/// Hosts declare their injection points as `Injected<S>` fields, where `S` is
/// the subject they depend on: a `dyn Trait` object type or a concrete type.
/// Before activation a slot is unset; activation fills it with a wired value
/// according to the member's [`ProxyFlags`](crate::ProxyFlags). Every access
/// goes through `get`, `get_required` or `with`, which is where deferred
/// members materialize and cross-cutting behaviors apply.
///
/// # Examples
///
/// An unset slot reports its state instead of panicking:
///
/// ```rust
/// use wirework::{Injected, WireError};
///
/// let slot: Injected<u32> = Injected::default();
/// assert!(!slot.wired());
/// match slot.get() {
///     Err(WireError::Unset(subject)) => assert_eq!(subject, "u32"),
///     _ => unreachable!(),
/// }
/// ```
///
/// After activation the slot yields the bound implementation:
///
/// ```rust
/// use std::sync::Arc;
/// use wirework::{Bindings, Injected, ProxyFlags, TypeShape, Wirable};
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// #[derive(Default)]
/// struct Plain;
/// impl Greeter for Plain {
///     fn greet(&self) -> String {
///         "hello".to_string()
///     }
/// }
/// impl Wirable for Plain {
///     fn shape() -> TypeShape {
///         TypeShape::of::<Self>().finish()
///     }
/// }
///
/// #[derive(Default)]
/// struct App {
///     greeter: Injected<dyn Greeter>,
/// }
/// impl Wirable for App {
///     fn shape() -> TypeShape {
///         TypeShape::of::<Self>()
///             .member("greeter", ProxyFlags::default(), |a: &mut App, v: Injected<dyn Greeter>| {
///                 a.greeter = v;
///             })
///             .finish()
///     }
/// }
///
/// let mut bindings = Bindings::new();
/// bindings.bind_as(|p: Arc<Plain>| p as Arc<dyn Greeter>);
/// let activator = bindings.build();
///
/// let mut app = App::default();
/// activator.activate(&mut app).unwrap();
/// assert_eq!(app.greeter.get().unwrap().greet(), "hello");
/// assert_eq!(app.greeter.with(|g| g.greet()).unwrap(), "hello");
/// ```
pub struct Injected<S: ?Sized + Send + Sync + 'static> {
    shell: Option<Arc<Shell<S>>>,
}

impl<S: ?Sized + Send + Sync + 'static> Injected<S> {
    /// An unset slot, identical to `Default`.
    pub fn unset() -> Self {
        Self { shell: None }
    }

    pub(crate) fn from_shell(shell: Arc<Shell<S>>) -> Self {
        Self { shell: Some(shell) }
    }

    /// True once activation has filled the slot.
    pub fn wired(&self) -> bool {
        self.shell.is_some()
    }

    /// True when the member was wired with deferred construction.
    pub fn is_lazy(&self) -> bool {
        matches!(self.shell.as_deref(), Some(shell) if shell.is_deferred())
    }

    /// True when the real value exists: always for eager members, after the
    /// first successful access for deferred ones.
    pub fn materialized(&self) -> bool {
        matches!(self.shell.as_deref(), Some(shell) if shell.materialized())
    }

    /// True when the member carries cross-cutting access behaviors.
    pub fn has_aspects(&self) -> bool {
        matches!(self.shell.as_deref(), Some(shell) if shell.aspects.is_some())
    }

    /// Type name of the wired implementation, if any.
    pub fn impl_name(&self) -> Option<&'static str> {
        self.shell.as_deref().map(Shell::impl_name)
    }

    /// Accesses the wired value.
    ///
    /// One call is one pass through the member's access boundary: security
    /// rules are consulted, a deferred value materializes, metrics and the
    /// access log are updated.
    ///
    /// # Errors
    ///
    /// - [`WireError::Unset`] when the slot was never wired.
    /// - [`WireError::AccessDenied`] when a security rule vetoes the access.
    /// - Any construction error of a deferred member surfacing on first
    ///   access, such as [`WireError::Instantiation`] or
    ///   [`WireError::Cyclic`].
    pub fn get(&self) -> WireResult<Arc<S>> {
        match &self.shell {
            None => Err(WireError::Unset(type_name::<S>())),
            Some(shell) => shell.access(),
        }
    }

    /// Accesses the wired value, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics when `get` would return an error. Prefer `get` outside of
    /// wiring that is known to have succeeded.
    pub fn get_required(&self) -> Arc<S> {
        match self.get() {
            Ok(value) => value,
            Err(e) => panic!("required member access failed: {}", e),
        }
    }

    /// Accesses the wired value for the duration of a closure.
    ///
    /// For `concurrent` members the serialization gate is held across the
    /// closure, so scoped work on the subject is mutually exclusive between
    /// threads. Errors match [`Injected::get`].
    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> WireResult<R> {
        match &self.shell {
            None => Err(WireError::Unset(type_name::<S>())),
            Some(shell) => shell.access_with(f),
        }
    }

    /// Access counters for members wired with the `metrics` flag.
    pub fn report(&self) -> Option<AccessReport> {
        self.shell.as_deref().and_then(|shell| {
            shell.aspects.as_ref().and_then(AspectShell::report)
        })
    }

    /// Recorded accesses for members wired with the `logging` flag.
    ///
    /// Empty for members without an access log.
    pub fn access_log(&self) -> Vec<AccessRecord> {
        self.shell
            .as_deref()
            .and_then(|shell| shell.aspects.as_ref())
            .map(AspectShell::log_records)
            .unwrap_or_default()
    }
}

impl<S: ?Sized + Send + Sync + 'static> Default for Injected<S> {
    fn default() -> Self {
        Self::unset()
    }
}

impl<S: ?Sized + Send + Sync + 'static> Clone for Injected<S> {
    fn clone(&self) -> Self {
        Self {
            shell: self.shell.clone(),
        }
    }
}

impl<S: ?Sized + Send + Sync + 'static> fmt::Debug for Injected<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.shell {
            None => write!(f, "Injected(unset)"),
            Some(shell) => write!(f, "Injected({})", shell.impl_name()),
        }
    }
}

/// Wired value behind a member slot: the source plus its optional aspects.
pub(crate) struct Shell<S: ?Sized + Send + Sync + 'static> {
    impl_name: &'static str,
    source: Source<S>,
    pub(crate) aspects: Option<AspectShell>,
}

enum Source<S: ?Sized + Send + Sync + 'static> {
    Eager(Arc<S>),
    Deferred(VirtualCell<S>),
}

impl<S: ?Sized + Send + Sync + 'static> Shell<S> {
    pub(crate) fn eager(
        value: Arc<S>,
        impl_name: &'static str,
        aspects: Option<AspectShell>,
    ) -> Self {
        Self {
            impl_name,
            source: Source::Eager(value),
            aspects,
        }
    }

    pub(crate) fn deferred(
        cell: VirtualCell<S>,
        impl_name: &'static str,
        aspects: Option<AspectShell>,
    ) -> Self {
        Self {
            impl_name,
            source: Source::Deferred(cell),
            aspects,
        }
    }

    pub(crate) fn impl_name(&self) -> &'static str {
        self.impl_name
    }

    fn is_deferred(&self) -> bool {
        matches!(self.source, Source::Deferred(_))
    }

    fn materialized(&self) -> bool {
        match &self.source {
            Source::Eager(_) => true,
            Source::Deferred(cell) => cell.materialized(),
        }
    }

    // One access boundary pass: gate, rules, source, bookkeeping. The guard
    // is returned so scoped access can outlive the bookkeeping.
    fn open(&self) -> WireResult<(Arc<S>, Option<MutexGuard<'_, ()>>)> {
        let gate = match &self.aspects {
            Some(aspects) => {
                let gate = aspects.lock_gate();
                aspects.authorize()?;
                gate
            }
            None => None,
        };
        let value = match &self.source {
            Source::Eager(value) => Arc::clone(value),
            Source::Deferred(cell) => cell.materialize()?,
        };
        if let Some(aspects) = &self.aspects {
            aspects.record_granted();
        }
        Ok((value, gate))
    }

    pub(crate) fn access(&self) -> WireResult<Arc<S>> {
        self.open().map(|(value, _gate)| value)
    }

    pub(crate) fn access_with<R>(&self, f: impl FnOnce(&S) -> R) -> WireResult<R> {
        let (value, _gate) = self.open()?;
        Ok(f(&value))
    }
}
