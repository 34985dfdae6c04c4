//! Wiring metadata registered at compile time: shapes, members, lifecycle
//! entries, and proxy flags.

use std::any::{type_name, Any};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{WireError, WireResult};
use crate::injected::{Injected, Shell};
use crate::key::Key;

/// Type-erased wired value as stored in member slots and produce pipelines.
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// A type that participates in wiring.
///
/// Implementors describe their injectable members and lifecycle entries once,
/// through [`TypeShape::of`]. The engine walks the returned shape on every
/// activation; no runtime introspection is involved.
///
/// # Examples
///
/// ```rust
/// use wirework::{Injected, ProxyFlags, TypeShape, Wirable};
///
/// #[derive(Default)]
/// struct Cache;
///
/// impl Wirable for Cache {
///     fn shape() -> TypeShape {
///         TypeShape::of::<Self>().finish()
///     }
/// }
///
/// #[derive(Default)]
/// struct Service {
///     cache: Injected<Cache>,
///     ready: bool,
/// }
///
/// impl Wirable for Service {
///     fn shape() -> TypeShape {
///         TypeShape::of::<Self>()
///             .member("cache", ProxyFlags::default(), |s: &mut Service, v: Injected<Cache>| {
///                 s.cache = v;
///             })
///             .lifecycle("init", |s: &mut Service| s.ready = true)
///             .finish()
///     }
/// }
///
/// let shape = Service::shape();
/// assert_eq!(shape.levels().len(), 1);
/// assert_eq!(shape.levels()[0].members().len(), 1);
/// ```
pub trait Wirable: Send + Sync + 'static {
    /// Returns the wiring metadata for this type.
    fn shape() -> TypeShape;
}

/// Proxy decision flags declared per injectable member.
///
/// `lazy` decides whether the real value is constructed eagerly during
/// activation or deferred to first access. The remaining flags pick the
/// cross-cutting behaviors layered on the member's access boundary; they
/// compose freely with each other and with `lazy`.
///
/// # Examples
///
/// ```rust
/// use wirework::ProxyFlags;
///
/// let flags = ProxyFlags::none().lazy().metrics().logging();
/// assert!(flags.lazy);
/// assert!(flags.metrics);
/// assert!(!flags.secure);
/// assert!(flags.wants_shell());
///
/// assert!(!ProxyFlags::none().lazy().wants_shell());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProxyFlags {
    /// Defer construction to first access
    pub lazy: bool,
    /// Serialize scoped access across threads
    pub concurrent: bool,
    /// Count accesses and denials
    pub metrics: bool,
    /// Consult registered security rules per access
    pub secure: bool,
    /// Record an access log and emit trace events
    pub logging: bool,
}

impl ProxyFlags {
    /// No flags set: eager construction, bare access.
    #[inline]
    pub fn none() -> Self {
        Self::default()
    }

    /// Defer construction to first access.
    #[inline]
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    /// Serialize scoped access across threads.
    #[inline]
    pub fn concurrent(mut self) -> Self {
        self.concurrent = true;
        self
    }

    /// Count accesses and denials.
    #[inline]
    pub fn metrics(mut self) -> Self {
        self.metrics = true;
        self
    }

    /// Consult registered security rules per access.
    #[inline]
    pub fn secure(mut self) -> Self {
        self.secure = true;
        self
    }

    /// Record an access log and emit trace events.
    #[inline]
    pub fn logging(mut self) -> Self {
        self.logging = true;
        self
    }

    /// True when any cross-cutting behavior is requested.
    #[inline]
    pub fn wants_shell(&self) -> bool {
        self.concurrent || self.metrics || self.secure || self.logging
    }
}

/// Wiring metadata for one type: an ordered chain of levels.
///
/// Levels wire in storage order, inherited (base) levels before the declaring
/// type's own level, mirroring a superclass-before-subclass walk. Built
/// through [`TypeShape::of`] and consumed by the engine on every activation.
#[derive(Clone)]
pub struct TypeShape {
    levels: Vec<ShapeLevel>,
}

impl TypeShape {
    /// Starts building the shape for host type `H`.
    ///
    /// The builder's own level lands last in the chain; levels contributed by
    /// [`ShapeBuilder::inherits`] wire before it.
    pub fn of<H: 'static>() -> ShapeBuilder<H> {
        ShapeBuilder {
            inherited: Vec::new(),
            own: ShapeLevel::new(type_name::<H>()),
            _host: PhantomData,
        }
    }

    /// The level chain, base-most first.
    pub fn levels(&self) -> &[ShapeLevel] {
        &self.levels
    }

    fn into_levels(self) -> Vec<ShapeLevel> {
        self.levels
    }
}

/// Builder for a host type's [`TypeShape`].
///
/// Returned by [`TypeShape::of`]; `member`, `lifecycle` and
/// `lifecycle_fallible` act on the host's own level, `inherits` splices in
/// the full level chain of an embedded wirable value.
pub struct ShapeBuilder<H> {
    inherited: Vec<ShapeLevel>,
    own: ShapeLevel,
    _host: PhantomData<fn(&mut H)>,
}

impl<H: 'static> ShapeBuilder<H> {
    /// Declares an injectable member on the host's own level.
    ///
    /// The setter is the member's explicit write access; the engine calls it
    /// with the wired slot after the subject has been produced according to
    /// `flags`.
    pub fn member<S, F>(mut self, name: &'static str, flags: ProxyFlags, assign: F) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&mut H, Injected<S>) + Send + Sync + 'static,
    {
        self.own.members.push(MemberShape::of::<H, S, F>(name, flags, assign));
        self
    }

    /// Declares an infallible lifecycle entry on the host's own level.
    ///
    /// Entries run after every member of the chain has been wired, base
    /// levels first, in declaration order within a level.
    pub fn lifecycle<F>(mut self, name: &'static str, run: F) -> Self
    where
        F: Fn(&mut H) + Send + Sync + 'static,
    {
        self.own.lifecycle.push(LifecycleShape::of::<H, F>(name, run));
        self
    }

    /// Declares a lifecycle entry that may fail.
    ///
    /// A returned error aborts the whole activation as
    /// [`WireError::Lifecycle`].
    pub fn lifecycle_fallible<F>(mut self, name: &'static str, run: F) -> Self
    where
        F: Fn(&mut H) -> Result<(), String> + Send + Sync + 'static,
    {
        self.own.lifecycle.push(LifecycleShape::fallible::<H, F>(name, run));
        self
    }

    /// Splices the level chain of an embedded wirable value below the host's
    /// own level.
    ///
    /// `project` maps the host to the embedded value; every member setter and
    /// lifecycle entry of `B`'s chain is rebased through it. Inherited levels
    /// wire before the host's own level, in the order `inherits` is called.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wirework::{Injected, ProxyFlags, TypeShape, Wirable};
    ///
    /// #[derive(Default)]
    /// struct Conn;
    /// impl Wirable for Conn {
    ///     fn shape() -> TypeShape {
    ///         TypeShape::of::<Self>().finish()
    ///     }
    /// }
    ///
    /// #[derive(Default)]
    /// struct Base {
    ///     conn: Injected<Conn>,
    /// }
    /// impl Wirable for Base {
    ///     fn shape() -> TypeShape {
    ///         TypeShape::of::<Self>()
    ///             .member("conn", ProxyFlags::default(), |b: &mut Base, v: Injected<Conn>| {
    ///                 b.conn = v;
    ///             })
    ///             .finish()
    ///     }
    /// }
    ///
    /// #[derive(Default)]
    /// struct Derived {
    ///     base: Base,
    ///     started: bool,
    /// }
    /// impl Wirable for Derived {
    ///     fn shape() -> TypeShape {
    ///         TypeShape::of::<Self>()
    ///             .inherits::<Base>(|d| &mut d.base)
    ///             .lifecycle("start", |d: &mut Derived| d.started = true)
    ///             .finish()
    ///     }
    /// }
    ///
    /// let shape = Derived::shape();
    /// let names: Vec<_> = shape.levels().iter().map(|l| l.name()).collect();
    /// assert!(names[0].contains("Base"));
    /// assert!(names[1].contains("Derived"));
    /// ```
    pub fn inherits<B: Wirable>(mut self, project: fn(&mut H) -> &mut B) -> Self {
        for level in B::shape().into_levels() {
            self.inherited.push(level.rebased::<H, B>(project));
        }
        self
    }

    /// Finishes the chain: inherited levels first, the host's own level last.
    pub fn finish(mut self) -> TypeShape {
        self.inherited.push(self.own);
        TypeShape { levels: self.inherited }
    }
}

/// One level of a shape chain: the members and lifecycle entries declared by
/// a single type.
#[derive(Clone)]
pub struct ShapeLevel {
    name: &'static str,
    members: Vec<MemberShape>,
    lifecycle: Vec<LifecycleShape>,
}

impl ShapeLevel {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            members: Vec::new(),
            lifecycle: Vec::new(),
        }
    }

    /// Name of the declaring type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Injectable members declared at this level, in declaration order.
    pub fn members(&self) -> &[MemberShape] {
        &self.members
    }

    /// Lifecycle entries declared at this level, in declaration order.
    pub fn lifecycle_entries(&self) -> &[LifecycleShape] {
        &self.lifecycle
    }

    fn rebased<H: 'static, B: 'static>(self, project: fn(&mut H) -> &mut B) -> ShapeLevel {
        ShapeLevel {
            name: self.name,
            members: self
                .members
                .into_iter()
                .map(|m| m.rebased::<H, B>(project))
                .collect(),
            lifecycle: self
                .lifecycle
                .into_iter()
                .map(|l| l.rebased::<H, B>(project))
                .collect(),
        }
    }
}

/// An injectable member: declared name, subject key, proxy flags, and the
/// erased setter supplied by the owning type.
#[derive(Clone)]
pub struct MemberShape {
    name: &'static str,
    owner: &'static str,
    subject: Key,
    flags: ProxyFlags,
    set: Arc<dyn Fn(&mut dyn Any, AnyArc) -> WireResult<()> + Send + Sync>,
}

impl MemberShape {
    fn of<H, S, F>(name: &'static str, flags: ProxyFlags, assign: F) -> MemberShape
    where
        H: 'static,
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&mut H, Injected<S>) + Send + Sync + 'static,
    {
        let owner = type_name::<H>();
        let expected = type_name::<S>();
        MemberShape {
            name,
            owner,
            subject: Key::of::<S>(),
            flags,
            set: Arc::new(move |host: &mut dyn Any, value: AnyArc| {
                let shell = value
                    .downcast::<Shell<S>>()
                    .map_err(|_| WireError::MemberWrite { owner, member: name, expected })?;
                let host = host
                    .downcast_mut::<H>()
                    .ok_or(WireError::MemberWrite { owner, member: name, expected })?;
                assign(host, Injected::from_shell(shell));
                Ok(())
            }),
        }
    }

    /// Declared member name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Key of the subject this member expects.
    pub fn subject(&self) -> &Key {
        &self.subject
    }

    /// Proxy decision flags declared for this member.
    pub fn flags(&self) -> ProxyFlags {
        self.flags
    }

    pub(crate) fn write(&self, host: &mut dyn Any, value: AnyArc) -> WireResult<()> {
        (self.set)(host, value)
    }

    fn rebased<H: 'static, B: 'static>(self, project: fn(&mut H) -> &mut B) -> MemberShape {
        let owner = self.owner;
        let name = self.name;
        let expected = self.subject.display_name();
        let inner = Arc::clone(&self.set);
        MemberShape {
            set: Arc::new(move |host: &mut dyn Any, value: AnyArc| {
                let host = host
                    .downcast_mut::<H>()
                    .ok_or(WireError::MemberWrite { owner, member: name, expected })?;
                inner(project(host), value)
            }),
            ..self
        }
    }
}

impl std::fmt::Debug for MemberShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberShape")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("subject", &self.subject.display_name())
            .field("flags", &self.flags)
            .finish()
    }
}

/// A lifecycle entry: declared name plus the erased callback invoked after
/// wiring completes for the whole chain.
#[derive(Clone)]
pub struct LifecycleShape {
    name: &'static str,
    owner: &'static str,
    run: Arc<dyn Fn(&mut dyn Any) -> WireResult<()> + Send + Sync>,
}

impl LifecycleShape {
    fn of<H, F>(name: &'static str, run: F) -> LifecycleShape
    where
        H: 'static,
        F: Fn(&mut H) + Send + Sync + 'static,
    {
        Self::fallible::<H, _>(name, move |host| {
            run(host);
            Ok(())
        })
    }

    fn fallible<H, F>(name: &'static str, run: F) -> LifecycleShape
    where
        H: 'static,
        F: Fn(&mut H) -> Result<(), String> + Send + Sync + 'static,
    {
        let owner = type_name::<H>();
        LifecycleShape {
            name,
            owner,
            run: Arc::new(move |host: &mut dyn Any| {
                let host = host.downcast_mut::<H>().ok_or_else(|| WireError::Lifecycle {
                    owner,
                    member: name,
                    reason: "host type mismatch".to_string(),
                })?;
                run(host).map_err(|reason| WireError::Lifecycle { owner, member: name, reason })
            }),
        }
    }

    /// Declared entry name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn invoke(&self, host: &mut dyn Any) -> WireResult<()> {
        (self.run)(host)
    }

    fn rebased<H: 'static, B: 'static>(self, project: fn(&mut H) -> &mut B) -> LifecycleShape {
        let owner = self.owner;
        let name = self.name;
        let inner = Arc::clone(&self.run);
        LifecycleShape {
            run: Arc::new(move |host: &mut dyn Any| {
                let host = host.downcast_mut::<H>().ok_or_else(|| WireError::Lifecycle {
                    owner,
                    member: name,
                    reason: "host type mismatch".to_string(),
                })?;
                inner(project(host))
            }),
            ..self
        }
    }
}

impl std::fmt::Debug for LifecycleShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleShape")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WireError;
    use crate::injected::{Injected, Shell};
    use std::sync::Arc;

    #[derive(Default)]
    struct HostA {
        dep: Injected<u32>,
    }

    struct HostB;

    fn dep_member() -> MemberShape {
        MemberShape::of::<HostA, u32, _>("dep", ProxyFlags::default(), |h: &mut HostA, v| {
            h.dep = v;
        })
    }

    #[test]
    fn write_assigns_through_setter() {
        let member = dep_member();
        let shell: Arc<Shell<u32>> = Arc::new(Shell::eager(Arc::new(7u32), "u32", None));
        let mut host = HostA::default();
        member.write(&mut host, shell).unwrap();
        assert!(host.dep.wired());
        assert_eq!(*host.dep.get().unwrap(), 7);
    }

    #[test]
    fn write_rejects_wrong_host() {
        let member = dep_member();
        let shell: Arc<Shell<u32>> = Arc::new(Shell::eager(Arc::new(7u32), "u32", None));
        let mut wrong = HostB;
        match member.write(&mut wrong, shell) {
            Err(WireError::MemberWrite { member: m, .. }) => assert_eq!(m, "dep"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn write_rejects_wrong_value() {
        let member = dep_member();
        let shell: Arc<Shell<String>> =
            Arc::new(Shell::eager(Arc::new("seven".to_string()), "String", None));
        let mut host = HostA::default();
        match member.write(&mut host, shell) {
            Err(WireError::MemberWrite { expected, .. }) => assert_eq!(expected, "u32"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn flags_builder_composes() {
        let flags = ProxyFlags::none().lazy().concurrent().secure();
        assert!(flags.lazy && flags.concurrent && flags.secure);
        assert!(!flags.metrics && !flags.logging);
        assert!(flags.wants_shell());
        assert!(!ProxyFlags::none().wants_shell());
    }

    #[test]
    fn inherited_levels_precede_own_level() {
        #[derive(Default)]
        struct Base {
            dep: Injected<u32>,
        }
        impl Wirable for Base {
            fn shape() -> TypeShape {
                TypeShape::of::<Self>()
                    .member("dep", ProxyFlags::default(), |b: &mut Base, v: Injected<u32>| {
                        b.dep = v;
                    })
                    .finish()
            }
        }

        #[derive(Default)]
        struct Derived {
            base: Base,
        }
        impl Wirable for Derived {
            fn shape() -> TypeShape {
                TypeShape::of::<Self>()
                    .inherits::<Base>(|d| &mut d.base)
                    .finish()
            }
        }

        let shape = Derived::shape();
        assert_eq!(shape.levels().len(), 2);
        assert!(shape.levels()[0].name().contains("Base"));
        assert!(shape.levels()[1].name().contains("Derived"));
        assert_eq!(shape.levels()[0].members().len(), 1);

        // Rebased setter writes into the embedded value
        let member = &shape.levels()[0].members()[0];
        let shell: Arc<Shell<u32>> = Arc::new(Shell::eager(Arc::new(9u32), "u32", None));
        let mut derived = Derived::default();
        member.write(&mut derived, shell).unwrap();
        assert_eq!(*derived.base.dep.get().unwrap(), 9);
    }
}
