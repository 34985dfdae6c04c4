//! Produce pipelines captured at bind time.
//!
//! For every binding two pipelines are built while the subject and the
//! implementation types are still statically known: an eager one that
//! constructs, wires and lifecycle-invokes the value on the spot, and a
//! deferred one that packs the same work into a cell for first access.

use std::any::type_name;
use std::sync::Arc;

use crate::activator::Activator;
use crate::aspects::AspectShell;
use crate::error::{WireError, WireResult};
use crate::injected::Shell;
use crate::internal::WiringSession;
use crate::proxy::{ServiceStrategy, VirtualCell};
use crate::shape::{AnyArc, ProxyFlags, Wirable};

pub(crate) type EagerProduce =
    Arc<dyn Fn(&Activator, &mut WiringSession, ProxyFlags) -> WireResult<AnyArc> + Send + Sync>;

pub(crate) type DeferredProduce =
    Arc<dyn Fn(&Activator, ProxyFlags) -> WireResult<AnyArc> + Send + Sync>;

// Construct, recursively wire, run lifecycle entries, coerce to the subject.
fn construct_and_wire<S, C, Ctor, F>(
    ctor: &Ctor,
    coerce: &F,
    activator: &Activator,
    session: &mut WiringSession,
) -> WireResult<Arc<S>>
where
    S: ?Sized + Send + Sync + 'static,
    C: Wirable,
    Ctor: Fn() -> Result<C, String> + Send + Sync + 'static,
    F: Fn(Arc<C>) -> Arc<S> + Send + Sync + 'static,
{
    let mut value =
        ctor().map_err(|reason| WireError::Instantiation(type_name::<C>(), reason))?;
    activator.wire_value(&mut value, session)?;
    activator.run_lifecycle(&mut value)?;
    Ok(coerce(Arc::new(value)))
}

/// Builds the pipeline for eager members: the value is fully live before the
/// member setter runs.
pub(crate) fn eager_produce<S, C, Ctor, F>(ctor: Arc<Ctor>, coerce: Arc<F>) -> EagerProduce
where
    S: ?Sized + Send + Sync + 'static,
    C: Wirable,
    Ctor: Fn() -> Result<C, String> + Send + Sync + 'static,
    F: Fn(Arc<C>) -> Arc<S> + Send + Sync + 'static,
{
    Arc::new(move |activator, session, flags| {
        session.enter(type_name::<C>())?;
        let produced = construct_and_wire::<S, C, Ctor, F>(&ctor, &coerce, activator, session);
        session.exit();
        let value = produced?;

        let aspects =
            AspectShell::for_flags(type_name::<S>(), type_name::<C>(), flags, activator.rules());
        let shell: Arc<Shell<S>> = Arc::new(Shell::eager(value, type_name::<C>(), aspects));
        Ok(shell as AnyArc)
    })
}

/// Builds the pipeline for lazy members: nothing is constructed now; the
/// returned shell wraps a cell that runs the full construct/wire/lifecycle
/// pipeline in a fresh session on first access.
pub(crate) fn deferred_produce<S, C, Ctor, F>(ctor: Arc<Ctor>, coerce: Arc<F>) -> DeferredProduce
where
    S: ?Sized + Send + Sync + 'static,
    C: Wirable,
    Ctor: Fn() -> Result<C, String> + Send + Sync + 'static,
    F: Fn(Arc<C>) -> Arc<S> + Send + Sync + 'static,
{
    Arc::new(move |activator, flags| {
        let aspects =
            AspectShell::for_flags(type_name::<S>(), type_name::<C>(), flags, activator.rules());

        let owner = activator.clone();
        let ctor = Arc::clone(&ctor);
        let coerce = Arc::clone(&coerce);
        let service_factory = move || -> WireResult<Arc<S>> {
            let mut session = WiringSession::new();
            session.enter(type_name::<C>())?;
            let produced =
                construct_and_wire::<S, C, Ctor, F>(&ctor, &coerce, &owner, &mut session);
            session.exit();
            produced
        };

        let cell = VirtualCell::new(ServiceStrategy::CachePerProxy, Box::new(service_factory));
        let shell: Arc<Shell<S>> = Arc::new(Shell::deferred(cell, type_name::<C>(), aspects));
        Ok(shell as AnyArc)
    })
}
