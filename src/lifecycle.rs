//! Lifecycle entry invocation after wiring.

use crate::error::WireResult;
use crate::observer::Observers;
use crate::shape::Wirable;

/// Walks the level chain base-first and invokes every lifecycle entry.
///
/// Entries see the host with all members of the whole chain already wired.
/// The first failing entry aborts the walk; later entries do not run.
pub(crate) fn run<T: Wirable>(target: &mut T, observers: &Observers) -> WireResult<()> {
    let shape = T::shape();
    for level in shape.levels() {
        for entry in level.lifecycle_entries() {
            entry.invoke(&mut *target)?;
            observers.lifecycle_invoked(level.name(), entry.name());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WireError;
    use crate::shape::TypeShape;

    #[derive(Default)]
    struct Staged {
        order: Vec<&'static str>,
    }

    impl Wirable for Staged {
        fn shape() -> TypeShape {
            TypeShape::of::<Self>()
                .lifecycle("first", |s: &mut Staged| s.order.push("first"))
                .lifecycle("second", |s: &mut Staged| s.order.push("second"))
                .finish()
        }
    }

    #[test]
    fn entries_run_in_declaration_order() {
        let mut staged = Staged::default();
        run(&mut staged, &Observers::new()).unwrap();
        assert_eq!(staged.order, vec!["first", "second"]);
    }

    #[test]
    fn failing_entry_aborts_the_walk() {
        #[derive(Default)]
        struct Fragile {
            attempted: bool,
        }

        impl Wirable for Fragile {
            fn shape() -> TypeShape {
                TypeShape::of::<Self>()
                    .lifecycle_fallible("explode", |f: &mut Fragile| {
                        f.attempted = true;
                        Err("boom".to_string())
                    })
                    .lifecycle("after", |_f: &mut Fragile| panic!("must not run"))
                    .finish()
            }
        }

        let mut fragile = Fragile::default();
        let err = run(&mut fragile, &Observers::new()).unwrap_err();
        match err {
            WireError::Lifecycle { member, reason, .. } => {
                assert_eq!(member, "explode");
                assert_eq!(reason, "boom");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(fragile.attempted);
    }
}
