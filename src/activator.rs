//! The injection engine entry point.

use std::any::type_name;
use std::sync::Arc;
use std::time::Instant;

use crate::aspects::SecurityRule;
use crate::bindings::BindingRegistry;
use crate::error::WireResult;
use crate::internal::WiringSession;
use crate::lifecycle;
use crate::observer::Observers;
use crate::shape::Wirable;

/// The wiring engine built from [`Bindings`](crate::Bindings).
///
/// An activator is a cheaply clonable handle over immutable state: the
/// binding registry, the registered security rules, and the observers.
/// Clones share that state, so one activator can serve many call sites and
/// threads; each [`activate`](Activator::activate) call owns its private
/// session, and exclusive access to the target graph is a borrow-checker
/// fact, so unrelated roots may activate concurrently.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use wirework::{Bindings, Injected, ProxyFlags, TypeShape, Wirable};
///
/// trait Repository: Send + Sync {
///     fn find(&self, id: u32) -> Option<String>;
/// }
///
/// #[derive(Default)]
/// struct SqlRepository;
///
/// impl Repository for SqlRepository {
///     fn find(&self, _id: u32) -> Option<String> {
///         Some("row".to_string())
///     }
/// }
///
/// impl Wirable for SqlRepository {
///     fn shape() -> TypeShape {
///         TypeShape::of::<Self>().finish()
///     }
/// }
///
/// #[derive(Default)]
/// struct Service {
///     repo: Injected<dyn Repository>,
///     ready: bool,
/// }
///
/// impl Wirable for Service {
///     fn shape() -> TypeShape {
///         TypeShape::of::<Self>()
///             .member("repo", ProxyFlags::default(), |s: &mut Service, v: Injected<dyn Repository>| {
///                 s.repo = v;
///             })
///             .lifecycle("init", |s: &mut Service| s.ready = true)
///             .finish()
///     }
/// }
///
/// let mut bindings = Bindings::new();
/// bindings.bind_as(|c: Arc<SqlRepository>| c as Arc<dyn Repository>);
/// let activator = bindings.build();
///
/// let mut service = Service::default();
/// activator.activate(&mut service).unwrap();
///
/// assert!(service.ready);
/// assert!(service.repo.wired());
/// assert_eq!(service.repo.get().unwrap().find(1), Some("row".to_string()));
/// ```
#[derive(Clone)]
pub struct Activator {
    inner: Arc<ActivatorInner>,
}

pub(crate) struct ActivatorInner {
    pub(crate) registry: BindingRegistry,
    pub(crate) rules: Vec<Arc<dyn SecurityRule>>,
    pub(crate) observers: Observers,
}

impl Activator {
    pub(crate) fn new(inner: ActivatorInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Wires the target and its transitive dependency graph in place, then
    /// runs the target's lifecycle entries.
    ///
    /// Members wire base levels before derived levels; every eagerly
    /// produced dependency is fully wired and lifecycle-invoked before it is
    /// assigned. Nothing is cached between calls: activating twice produces
    /// distinct dependency instances.
    ///
    /// # Errors
    ///
    /// Any [`WireError`](crate::WireError) aborts the call. Members wired
    /// before the failure keep their values; there is no rollback.
    pub fn activate<T: Wirable>(&self, target: &mut T) -> WireResult<()> {
        let root = type_name::<T>();
        let observing = self.inner.observers.has_observers();
        let started = if observing { Some(Instant::now()) } else { None };
        if observing {
            self.inner.observers.activating(root);
        }

        let mut session = WiringSession::new();
        let outcome = match session.enter(root) {
            Ok(()) => {
                let wired = self
                    .wire_value(target, &mut session)
                    .and_then(|()| self.run_lifecycle(target));
                session.exit();
                wired
            }
            Err(e) => Err(e),
        };

        if observing {
            match &outcome {
                Ok(()) => {
                    if let Some(started) = started {
                        self.inner.observers.activated(root, started.elapsed());
                    }
                }
                Err(error) => self.inner.observers.activation_failed(root, error),
            }
        }
        outcome
    }

    /// Populates every injectable member across the target's level chain,
    /// base levels first, recursing into fresh dependencies depth-first.
    pub(crate) fn wire_value<T: Wirable>(
        &self,
        target: &mut T,
        session: &mut WiringSession,
    ) -> WireResult<()> {
        let shape = T::shape();
        for level in shape.levels() {
            for member in level.members() {
                let binding = self.inner.registry.resolve(member.subject())?;
                let flags = member.flags();
                let value = if flags.lazy {
                    binding.produce_deferred(self, flags)?
                } else {
                    binding.produce_eager(self, session, flags)?
                };
                member.write(&mut *target, value)?;
                self.inner
                    .observers
                    .member_wired(level.name(), member.name(), binding.impl_name());
            }
        }
        Ok(())
    }

    pub(crate) fn run_lifecycle<T: Wirable>(&self, target: &mut T) -> WireResult<()> {
        lifecycle::run(target, &self.inner.observers)
    }

    pub(crate) fn rules(&self) -> &[Arc<dyn SecurityRule>] {
        &self.inner.rules
    }
}
