//! # wirework
//!
//! Declarative member injection for Rust: activate an object instance and the
//! engine recursively constructs and wires its dependency graph, then runs
//! lifecycle callbacks across the whole chain.
//!
//! ## Features
//!
//! - **Explicit metadata**: types describe their injectable members and
//!   lifecycle entries once, through [`Wirable::shape`]; no runtime
//!   introspection
//! - **Recursive wiring**: every fresh dependency is fully wired and
//!   lifecycle-invoked before it is assigned, depth-first
//! - **Level chains**: embedded wirable values contribute their own levels,
//!   wired base-first, mirroring a superclass-before-subclass walk
//! - **Proxy flags per member**: defer construction to first access, and
//!   layer serialized access, metrics, security rules and access logging on
//!   the access boundary
//! - **Cycle detection**: re-entrant construction fails fast with the full
//!   path instead of overflowing the stack
//! - **No graph cache**: every activation rebuilds the reachable graph, so
//!   two activations never share dependency instances
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use wirework::{Bindings, Injected, ProxyFlags, TypeShape, Wirable};
//!
//! // Define the contract and an implementation
//! trait Repository: Send + Sync {
//!     fn find(&self, id: u32) -> Option<String>;
//! }
//!
//! #[derive(Default)]
//! struct SqlRepository;
//!
//! impl Repository for SqlRepository {
//!     fn find(&self, _id: u32) -> Option<String> {
//!         Some("row".to_string())
//!     }
//! }
//!
//! impl Wirable for SqlRepository {
//!     fn shape() -> TypeShape {
//!         TypeShape::of::<Self>().finish()
//!     }
//! }
//!
//! // Declare an injection point and a lifecycle entry
//! #[derive(Default)]
//! struct Service {
//!     repo: Injected<dyn Repository>,
//!     ready: bool,
//! }
//!
//! impl Wirable for Service {
//!     fn shape() -> TypeShape {
//!         TypeShape::of::<Self>()
//!             .member("repo", ProxyFlags::default(), |s: &mut Service, v: Injected<dyn Repository>| {
//!                 s.repo = v;
//!             })
//!             .lifecycle("init", |s: &mut Service| s.ready = true)
//!             .finish()
//!     }
//! }
//!
//! // Bind, build, activate
//! let mut bindings = Bindings::new();
//! bindings.bind_as(|c: Arc<SqlRepository>| c as Arc<dyn Repository>);
//! let activator = bindings.build();
//!
//! let mut service = Service::default();
//! activator.activate(&mut service).unwrap();
//!
//! assert!(service.ready);
//! assert_eq!(service.repo.get().unwrap().find(1), Some("row".to_string()));
//! ```
//!
//! ## Lazy members and access shells
//!
//! A member's [`ProxyFlags`] decide when its value is constructed and which
//! cross-cutting behaviors guard its accesses:
//!
//! ```rust
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use wirework::{Bindings, Injected, ProxyFlags, TypeShape, Wirable};
//!
//! static BUILT: AtomicU32 = AtomicU32::new(0);
//!
//! struct Expensive;
//!
//! impl Default for Expensive {
//!     fn default() -> Self {
//!         BUILT.fetch_add(1, Ordering::SeqCst);
//!         Expensive
//!     }
//! }
//!
//! impl Wirable for Expensive {
//!     fn shape() -> TypeShape {
//!         TypeShape::of::<Self>().finish()
//!     }
//! }
//!
//! #[derive(Default)]
//! struct App {
//!     worker: Injected<Expensive>,
//! }
//!
//! impl Wirable for App {
//!     fn shape() -> TypeShape {
//!         TypeShape::of::<Self>()
//!             .member(
//!                 "worker",
//!                 ProxyFlags::none().lazy().metrics(),
//!                 |a: &mut App, v: Injected<Expensive>| a.worker = v,
//!             )
//!             .finish()
//!     }
//! }
//!
//! let mut bindings = Bindings::new();
//! bindings.bind::<Expensive>();
//! let activator = bindings.build();
//!
//! let mut app = App::default();
//! activator.activate(&mut app).unwrap();
//!
//! // Nothing constructed yet
//! assert!(app.worker.is_lazy());
//! assert_eq!(BUILT.load(Ordering::SeqCst), 0);
//!
//! // First access materializes, later accesses reuse the value
//! app.worker.get().unwrap();
//! app.worker.get().unwrap();
//! assert_eq!(BUILT.load(Ordering::SeqCst), 1);
//! assert_eq!(app.worker.report().unwrap().accesses, 2);
//! ```

// Module declarations
pub mod activator;
pub mod aspects;
pub mod bindings;
pub mod error;
pub mod injected;
pub mod key;
pub mod observer;
pub mod proxy;
pub mod shape;

// Internal modules
mod factory;
mod internal;
mod lifecycle;

// Re-export core types
pub use activator::Activator;
pub use aspects::{AccessContext, AccessOutcome, AccessRecord, AccessReport, SecurityRule};
pub use bindings::Bindings;
pub use error::{WireError, WireResult};
pub use injected::Injected;
pub use key::Key;
pub use observer::{ActivationObserver, TracingObserver};
pub use proxy::{ServiceStrategy, VirtualCell, VirtualProxyBuilder};
pub use shape::{
    LifecycleShape, MemberShape, ProxyFlags, ShapeBuilder, ShapeLevel, TypeShape, Wirable,
};
