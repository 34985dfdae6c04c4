use wirework::{Bindings, Injected, ProxyFlags, TypeShape, Wirable};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

// One host type whose member flags are read from a static, so a single
// fixture covers every flag combination.
static FLAG_BITS: AtomicU8 = AtomicU8::new(0);

const LAZY: u8 = 1;
const CONCURRENT: u8 = 1 << 1;
const METRICS: u8 = 1 << 2;
const SECURE: u8 = 1 << 3;
const LOGGING: u8 = 1 << 4;

fn current_flags() -> ProxyFlags {
    let bits = FLAG_BITS.load(Ordering::SeqCst);
    let mut flags = ProxyFlags::none();
    if bits & LAZY != 0 {
        flags = flags.lazy();
    }
    if bits & CONCURRENT != 0 {
        flags = flags.concurrent();
    }
    if bits & METRICS != 0 {
        flags = flags.metrics();
    }
    if bits & SECURE != 0 {
        flags = flags.secure();
    }
    if bits & LOGGING != 0 {
        flags = flags.logging();
    }
    flags
}

trait Widget: Send + Sync {
    fn id(&self) -> u32;
}

#[derive(Default)]
struct StockWidget;

impl Widget for StockWidget {
    fn id(&self) -> u32 {
        7
    }
}

impl Wirable for StockWidget {
    fn shape() -> TypeShape {
        TypeShape::of::<Self>().finish()
    }
}

#[derive(Default)]
struct Panel {
    widget: Injected<dyn Widget>,
}

impl Wirable for Panel {
    fn shape() -> TypeShape {
        TypeShape::of::<Self>()
            .member("widget", current_flags(), |p: &mut Panel, v: Injected<dyn Widget>| {
                p.widget = v;
            })
            .finish()
    }
}

#[test]
fn test_every_flag_combination_wires_and_serves() {
    for bits in 0u8..32 {
        FLAG_BITS.store(bits, Ordering::SeqCst);

        let mut bindings = Bindings::new();
        bindings.bind_as(|w: Arc<StockWidget>| w as Arc<dyn Widget>);
        let activator = bindings.build();

        let mut panel = Panel::default();
        activator
            .activate(&mut panel)
            .unwrap_or_else(|e| panic!("activation failed for bits {:#07b}: {}", bits, e));

        let lazy = bits & LAZY != 0;
        let shelled = bits & (CONCURRENT | METRICS | SECURE | LOGGING) != 0;

        assert!(panel.widget.wired(), "bits {:#07b}", bits);
        assert_eq!(panel.widget.is_lazy(), lazy, "bits {:#07b}", bits);
        assert_eq!(panel.widget.materialized(), !lazy, "bits {:#07b}", bits);
        assert_eq!(panel.widget.has_aspects(), shelled, "bits {:#07b}", bits);

        // Access works under every combination; with no rules registered,
        // secure members grant
        let widget = panel
            .widget
            .get()
            .unwrap_or_else(|e| panic!("access failed for bits {:#07b}: {}", bits, e));
        assert_eq!(widget.id(), 7);
        assert!(panel.widget.materialized(), "bits {:#07b}", bits);

        assert_eq!(panel.widget.report().is_some(), bits & METRICS != 0, "bits {:#07b}", bits);
        if bits & METRICS != 0 {
            assert_eq!(panel.widget.report().unwrap().accesses, 1);
        }
        let expected_log = if bits & LOGGING != 0 { 1 } else { 0 };
        assert_eq!(panel.widget.access_log().len(), expected_log, "bits {:#07b}", bits);
    }
}

#[test]
fn test_flag_builder_composition() {
    let flags = ProxyFlags::none().lazy().metrics();
    assert!(flags.lazy);
    assert!(flags.metrics);
    assert!(!flags.concurrent);
    assert!(!flags.secure);
    assert!(!flags.logging);
    assert!(flags.wants_shell());

    // Lazy alone never builds an access shell
    assert!(!ProxyFlags::none().lazy().wants_shell());
    assert_eq!(ProxyFlags::none(), ProxyFlags::default());
}
