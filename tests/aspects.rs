use wirework::{
    AccessContext, AccessOutcome, Bindings, Injected, ProxyFlags, SecurityRule, TypeShape,
    WireError, Wirable,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

trait Vault: Send + Sync {
    fn secret(&self) -> &'static str;
}

#[derive(Default)]
struct FileVault;

impl Vault for FileVault {
    fn secret(&self) -> &'static str {
        "hunter2"
    }
}

impl Wirable for FileVault {
    fn shape() -> TypeShape {
        TypeShape::of::<Self>().finish()
    }
}

fn vault_bindings() -> Bindings {
    let mut bindings = Bindings::new();
    bindings.bind_as(|f: Arc<FileVault>| f as Arc<dyn Vault>);
    bindings
}

#[test]
fn test_metrics_counts_accesses() {
    #[derive(Default)]
    struct Metered {
        vault: Injected<dyn Vault>,
    }

    impl Wirable for Metered {
        fn shape() -> TypeShape {
            TypeShape::of::<Self>()
                .member("vault", ProxyFlags::none().metrics(), |m: &mut Metered, v: Injected<dyn Vault>| {
                    m.vault = v;
                })
                .finish()
        }
    }

    let activator = vault_bindings().build();

    let mut metered = Metered::default();
    activator.activate(&mut metered).unwrap();
    assert!(metered.vault.has_aspects());

    metered.vault.get().unwrap();
    metered.vault.get().unwrap();
    metered.vault.with(|v| v.secret().len()).unwrap();

    let report = metered.vault.report().unwrap();
    assert_eq!(report.accesses, 3);
    assert_eq!(report.denied, 0);
    assert!(report.subject.contains("Vault"));
    assert!(report.impl_name.contains("FileVault"));
}

#[test]
fn test_access_log_records_each_access() {
    #[derive(Default)]
    struct Logged {
        vault: Injected<dyn Vault>,
    }

    impl Wirable for Logged {
        fn shape() -> TypeShape {
            TypeShape::of::<Self>()
                .member("vault", ProxyFlags::none().logging(), |l: &mut Logged, v: Injected<dyn Vault>| {
                    l.vault = v;
                })
                .finish()
        }
    }

    let activator = vault_bindings().build();

    let mut logged = Logged::default();
    activator.activate(&mut logged).unwrap();

    logged.vault.get().unwrap();
    logged.vault.get().unwrap();

    let log = logged.vault.access_log();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].seq, 0);
    assert_eq!(log[1].seq, 1);
    assert!(log.iter().all(|r| r.outcome == AccessOutcome::Granted));
    assert!(log[0].impl_name.contains("FileVault"));

    // Counters need the metrics flag
    assert!(logged.vault.report().is_none());
}

struct BlockVaults;

impl SecurityRule for BlockVaults {
    fn check(&self, ctx: &AccessContext) -> Result<(), String> {
        if ctx.impl_name.contains("FileVault") {
            Err("vault access is blocked".to_string())
        } else {
            Ok(())
        }
    }
}

#[test]
fn test_security_rule_denies_access() {
    #[derive(Default)]
    struct Secured {
        vault: Injected<dyn Vault>,
    }

    impl Wirable for Secured {
        fn shape() -> TypeShape {
            TypeShape::of::<Self>()
                .member(
                    "vault",
                    ProxyFlags::none().secure().metrics().logging(),
                    |s: &mut Secured, v: Injected<dyn Vault>| s.vault = v,
                )
                .finish()
        }
    }

    let mut bindings = vault_bindings();
    bindings.add_security_rule(Arc::new(BlockVaults));
    let activator = bindings.build();

    let mut secured = Secured::default();
    activator.activate(&mut secured).unwrap(); // Wiring itself is not an access

    match secured.vault.get() {
        Err(WireError::AccessDenied { subject, rule }) => {
            assert!(subject.contains("Vault"));
            assert_eq!(rule, "vault access is blocked");
        }
        _ => panic!("Expected AccessDenied error"),
    }

    let report = secured.vault.report().unwrap();
    assert_eq!(report.accesses, 0);
    assert_eq!(report.denied, 1);
    assert_eq!(secured.vault.access_log()[0].outcome, AccessOutcome::Denied);
}

#[test]
fn test_secure_member_without_matching_rule_grants() {
    struct BlockPostgres;

    impl SecurityRule for BlockPostgres {
        fn check(&self, ctx: &AccessContext) -> Result<(), String> {
            if ctx.impl_name.contains("Postgres") {
                Err("wrong backend".to_string())
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct Secured {
        vault: Injected<dyn Vault>,
    }

    impl Wirable for Secured {
        fn shape() -> TypeShape {
            TypeShape::of::<Self>()
                .member("vault", ProxyFlags::none().secure(), |s: &mut Secured, v: Injected<dyn Vault>| {
                    s.vault = v;
                })
                .finish()
        }
    }

    let mut bindings = vault_bindings();
    bindings.add_security_rule(Arc::new(BlockPostgres));
    let activator = bindings.build();

    let mut secured = Secured::default();
    activator.activate(&mut secured).unwrap();
    assert_eq!(secured.vault.get().unwrap().secret(), "hunter2");
}

#[test]
fn test_rules_only_apply_to_secure_members() {
    struct DenyEverything;

    impl SecurityRule for DenyEverything {
        fn check(&self, _ctx: &AccessContext) -> Result<(), String> {
            Err("no access at all".to_string())
        }
    }

    #[derive(Default)]
    struct Plain {
        vault: Injected<dyn Vault>,
    }

    impl Wirable for Plain {
        fn shape() -> TypeShape {
            TypeShape::of::<Self>()
                .member("vault", ProxyFlags::none().metrics(), |p: &mut Plain, v: Injected<dyn Vault>| {
                    p.vault = v;
                })
                .finish()
        }
    }

    let mut bindings = vault_bindings();
    bindings.add_security_rule(Arc::new(DenyEverything));
    let activator = bindings.build();

    let mut plain = Plain::default();
    activator.activate(&mut plain).unwrap();

    // Rule not consulted without the secure flag
    plain.vault.get().unwrap();
    assert_eq!(plain.vault.report().unwrap().accesses, 1);
}

#[test]
fn test_concurrent_gate_serializes_scoped_access() {
    #[derive(Default)]
    struct Gated {
        vault: Injected<dyn Vault>,
    }

    impl Wirable for Gated {
        fn shape() -> TypeShape {
            TypeShape::of::<Self>()
                .member("vault", ProxyFlags::none().concurrent(), |g: &mut Gated, v: Injected<dyn Vault>| {
                    g.vault = v;
                })
                .finish()
        }
    }

    let activator = vault_bindings().build();

    let mut gated = Gated::default();
    activator.activate(&mut gated).unwrap();

    let inside = AtomicUsize::new(0);
    let peak = AtomicUsize::new(0);
    let slot = &gated.vault;

    std::thread::scope(|s| {
        for _ in 0..4 {
            let inside = &inside;
            let peak = &peak;
            s.spawn(move || {
                for _ in 0..8 {
                    slot.with(|_vault| {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        std::thread::sleep(Duration::from_millis(1));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    })
                    .unwrap();
                }
            });
        }
    });

    assert_eq!(peak.load(Ordering::SeqCst), 1); // The gate admits one scoped access at a time
}

#[test]
fn test_lazy_member_keeps_its_aspects() {
    #[derive(Default)]
    struct LazyMetered {
        vault: Injected<dyn Vault>,
    }

    impl Wirable for LazyMetered {
        fn shape() -> TypeShape {
            TypeShape::of::<Self>()
                .member(
                    "vault",
                    ProxyFlags::none().lazy().metrics().logging(),
                    |l: &mut LazyMetered, v: Injected<dyn Vault>| l.vault = v,
                )
                .finish()
        }
    }

    let activator = vault_bindings().build();

    let mut host = LazyMetered::default();
    activator.activate(&mut host).unwrap();

    // Aspects exist before the value does
    assert!(host.vault.is_lazy());
    assert!(host.vault.has_aspects());
    assert!(!host.vault.materialized());
    assert_eq!(host.vault.report().unwrap().accesses, 0);

    host.vault.get().unwrap();
    assert_eq!(host.vault.report().unwrap().accesses, 1);
    assert_eq!(host.vault.access_log().len(), 1);
}
