//! Binding registration surface and the subject registry.

use std::any::type_name;
use std::collections::HashMap;
use std::sync::Arc;

use crate::activator::{Activator, ActivatorInner};
use crate::aspects::SecurityRule;
use crate::error::{WireError, WireResult};
use crate::factory::{self, DeferredProduce, EagerProduce};
use crate::internal::WiringSession;
use crate::key::Key;
use crate::observer::{ActivationObserver, Observers};
use crate::shape::{AnyArc, ProxyFlags, Wirable};

/// One registered implementation for a subject: its display name plus the
/// produce pipelines captured at bind time.
pub(crate) struct ImplBinding {
    impl_name: &'static str,
    eager: EagerProduce,
    deferred: DeferredProduce,
}

impl ImplBinding {
    pub(crate) fn impl_name(&self) -> &'static str {
        self.impl_name
    }

    pub(crate) fn produce_eager(
        &self,
        activator: &Activator,
        session: &mut WiringSession,
        flags: ProxyFlags,
    ) -> WireResult<AnyArc> {
        (self.eager)(activator, session, flags)
    }

    pub(crate) fn produce_deferred(
        &self,
        activator: &Activator,
        flags: ProxyFlags,
    ) -> WireResult<AnyArc> {
        (self.deferred)(activator, flags)
    }
}

/// Subject-to-implementation lookup consulted per injectable member.
///
/// Exactly one candidate resolves; zero candidates and multiple candidates
/// are both explicit errors, never a silent pick.
pub(crate) struct BindingRegistry {
    bindings: HashMap<Key, Vec<ImplBinding>>,
}

impl BindingRegistry {
    pub(crate) fn resolve(&self, subject: &Key) -> WireResult<&ImplBinding> {
        match self.bindings.get(subject).map(Vec::as_slice) {
            Some([binding]) => Ok(binding),
            Some([]) | None => Err(WireError::NotFound(subject.display_name())),
            Some(candidates) => Err(WireError::Ambiguous(
                subject.display_name(),
                candidates.iter().map(ImplBinding::impl_name).collect(),
            )),
        }
    }
}

/// Registration surface for the wiring engine.
///
/// Bindings map subjects (trait object types or concrete types) to the
/// implementations that satisfy them, and carry the security rules and
/// observers the built [`Activator`] will use. Registration is append-only;
/// binding two implementations for one subject makes that subject ambiguous
/// and resolution of it fails.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use wirework::{Bindings, Injected, ProxyFlags, TypeShape, Wirable};
///
/// trait Mailer: Send + Sync {
///     fn deliver(&self, to: &str) -> bool;
/// }
///
/// #[derive(Default)]
/// struct SmtpMailer;
///
/// impl Mailer for SmtpMailer {
///     fn deliver(&self, _to: &str) -> bool {
///         true
///     }
/// }
///
/// impl Wirable for SmtpMailer {
///     fn shape() -> TypeShape {
///         TypeShape::of::<Self>().finish()
///     }
/// }
///
/// #[derive(Default)]
/// struct Newsletter {
///     mailer: Injected<dyn Mailer>,
/// }
///
/// impl Wirable for Newsletter {
///     fn shape() -> TypeShape {
///         TypeShape::of::<Self>()
///             .member("mailer", ProxyFlags::default(), |n: &mut Newsletter, v: Injected<dyn Mailer>| {
///                 n.mailer = v;
///             })
///             .finish()
///     }
/// }
///
/// let mut bindings = Bindings::new();
/// bindings.bind_as(|m: Arc<SmtpMailer>| m as Arc<dyn Mailer>);
/// let activator = bindings.build();
///
/// let mut newsletter = Newsletter::default();
/// activator.activate(&mut newsletter).unwrap();
/// assert!(newsletter.mailer.get().unwrap().deliver("user@example.com"));
/// ```
pub struct Bindings {
    bindings: HashMap<Key, Vec<ImplBinding>>,
    rules: Vec<Arc<dyn SecurityRule>>,
    observers: Observers,
}

impl Bindings {
    /// Creates an empty registration surface.
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            rules: Vec::new(),
            observers: Observers::new(),
        }
    }

    /// Binds a concrete type as its own subject.
    ///
    /// Members declaring `Injected<C>` resolve to a fresh `C::default()`
    /// per production.
    pub fn bind<C>(&mut self) -> &mut Self
    where
        C: Wirable + Default,
    {
        self.bind_as::<C, C, _>(|value| value)
    }

    /// Binds implementation `C` for subject `S`.
    ///
    /// The coercion closure fixes both types and performs the cast to the
    /// subject, typically `|c: Arc<C>| c as Arc<dyn Subject>`. Construction
    /// uses `C::default()`; see [`Bindings::bind_with`] for a custom
    /// constructor.
    pub fn bind_as<S, C, F>(&mut self, coerce: F) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        C: Wirable + Default,
        F: Fn(Arc<C>) -> Arc<S> + Send + Sync + 'static,
    {
        self.bind_with(|| Ok(C::default()), coerce)
    }

    /// Binds implementation `C` for subject `S` with a fallible constructor.
    ///
    /// A constructor error surfaces as
    /// [`WireError::Instantiation`](crate::WireError::Instantiation) and
    /// aborts the activation that triggered the construction.
    pub fn bind_with<S, C, Ctor, F>(&mut self, ctor: Ctor, coerce: F) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
        C: Wirable,
        Ctor: Fn() -> Result<C, String> + Send + Sync + 'static,
        F: Fn(Arc<C>) -> Arc<S> + Send + Sync + 'static,
    {
        let ctor = Arc::new(ctor);
        let coerce = Arc::new(coerce);
        let binding = ImplBinding {
            impl_name: type_name::<C>(),
            eager: factory::eager_produce::<S, C, Ctor, F>(Arc::clone(&ctor), Arc::clone(&coerce)),
            deferred: factory::deferred_produce::<S, C, Ctor, F>(ctor, coerce),
        };
        self.bindings.entry(Key::of::<S>()).or_default().push(binding);
        self
    }

    /// Registers a security rule consulted on every access through a member
    /// wired with the `secure` flag.
    pub fn add_security_rule(&mut self, rule: Arc<dyn SecurityRule>) -> &mut Self {
        self.rules.push(rule);
        self
    }

    /// Registers an observer notified of activation events.
    pub fn add_observer(&mut self, observer: Arc<dyn ActivationObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    /// Consumes the registrations and builds the engine.
    pub fn build(self) -> Activator {
        Activator::new(ActivatorInner {
            registry: BindingRegistry {
                bindings: self.bindings,
            },
            rules: self.rules,
            observers: self.observers,
        })
    }
}

impl Default for Bindings {
    fn default() -> Self {
        Self::new()
    }
}
