//! Deferred materialization cells for lazily wired members.

use std::any::type_name;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::error::WireResult;

/// When a deferred cell runs its service factory.
///
/// `CachePerProxy` materializes at most once and caches the value for the
/// lifetime of the cell; `FreshPerAccess` runs the factory on every access.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ServiceStrategy {
    /// Materialize once, cache for the cell's lifetime (the default).
    #[default]
    CachePerProxy,
    /// Run the service factory on every access.
    FreshPerAccess,
}

/// A lazy stand-in for a subject that has not been constructed yet.
///
/// The cell satisfies the subject contract without eager construction: the
/// service factory runs on first access (or every access, depending on the
/// [`ServiceStrategy`]). Under `CachePerProxy`, concurrent first accesses
/// still materialize at most once.
///
/// Members wired with the `lazy` flag hold one of these internally; the
/// [`VirtualProxyBuilder`] builds standalone cells.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use wirework::VirtualProxyBuilder;
///
/// let cell = VirtualProxyBuilder::new(|| Ok(Arc::new(42u32))).build();
/// assert!(!cell.materialized());
///
/// assert_eq!(*cell.materialize().unwrap(), 42);
/// assert_eq!(*cell.materialize().unwrap(), 42);
///
/// assert!(cell.materialized());
/// assert_eq!(cell.materializations(), 1);
/// ```
pub struct VirtualCell<S: ?Sized + Send + Sync + 'static> {
    subject: &'static str,
    strategy: ServiceStrategy,
    cell: OnceCell<Arc<S>>,
    factory: Box<dyn Fn() -> WireResult<Arc<S>> + Send + Sync>,
    materializations: AtomicU64,
}

impl<S: ?Sized + Send + Sync + 'static> VirtualCell<S> {
    pub(crate) fn new(
        strategy: ServiceStrategy,
        factory: Box<dyn Fn() -> WireResult<Arc<S>> + Send + Sync>,
    ) -> Self {
        Self {
            subject: type_name::<S>(),
            strategy,
            cell: OnceCell::new(),
            factory,
            materializations: AtomicU64::new(0),
        }
    }

    /// Produces the real value according to the strategy.
    ///
    /// A failed factory run leaves a `CachePerProxy` cell empty, so a later
    /// access retries.
    pub fn materialize(&self) -> WireResult<Arc<S>> {
        match self.strategy {
            ServiceStrategy::CachePerProxy => self
                .cell
                .get_or_try_init(|| {
                    self.materializations.fetch_add(1, Ordering::Relaxed);
                    (self.factory)()
                })
                .map(Arc::clone),
            ServiceStrategy::FreshPerAccess => {
                self.materializations.fetch_add(1, Ordering::Relaxed);
                (self.factory)()
            }
        }
    }

    /// True once a `CachePerProxy` cell holds its value. Always false under
    /// `FreshPerAccess`, which never caches.
    pub fn materialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Number of service factory runs so far.
    pub fn materializations(&self) -> u64 {
        self.materializations.load(Ordering::Relaxed)
    }

    /// The strategy this cell was built with.
    pub fn strategy(&self) -> ServiceStrategy {
        self.strategy
    }

    /// Type name of the subject contract.
    pub fn subject(&self) -> &'static str {
        self.subject
    }
}

impl<S: ?Sized + Send + Sync + 'static> fmt::Debug for VirtualCell<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualCell")
            .field("subject", &self.subject)
            .field("strategy", &self.strategy)
            .field("materialized", &self.materialized())
            .field("materializations", &self.materializations())
            .finish()
    }
}

/// Builder for standalone [`VirtualCell`]s.
///
/// The engine builds cells itself when it wires a `lazy` member; the builder
/// exists for code that wants deferred construction outside of an activation.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use wirework::{ServiceStrategy, VirtualProxyBuilder};
///
/// let cell = VirtualProxyBuilder::new(|| Ok(Arc::new("fresh".to_string())))
///     .strategy(ServiceStrategy::FreshPerAccess)
///     .build();
///
/// cell.materialize().unwrap();
/// cell.materialize().unwrap();
/// assert_eq!(cell.materializations(), 2);
/// assert!(!cell.materialized());
/// ```
pub struct VirtualProxyBuilder<S: ?Sized + Send + Sync + 'static> {
    strategy: ServiceStrategy,
    factory: Box<dyn Fn() -> WireResult<Arc<S>> + Send + Sync>,
}

impl<S: ?Sized + Send + Sync + 'static> VirtualProxyBuilder<S> {
    /// Starts a builder around the service factory that produces the real
    /// value.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> WireResult<Arc<S>> + Send + Sync + 'static,
    {
        Self {
            strategy: ServiceStrategy::default(),
            factory: Box::new(factory),
        }
    }

    /// Overrides the default `CachePerProxy` strategy.
    pub fn strategy(mut self, strategy: ServiceStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Builds the cell. Nothing is constructed until the first access.
    pub fn build(self) -> VirtualCell<S> {
        VirtualCell::new(self.strategy, self.factory)
    }
}
