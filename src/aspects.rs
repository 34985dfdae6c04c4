//! Cross-cutting access behaviors layered on wired members.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::error::{WireError, WireResult};
use crate::shape::ProxyFlags;

const ACCESS_LOG_CAP: usize = 1024;

/// What a security rule sees when it is consulted.
#[derive(Debug, Clone, Copy)]
pub struct AccessContext {
    /// Subject of the accessed member.
    pub subject: &'static str,
    /// Type name of the wired implementation.
    pub impl_name: &'static str,
}

/// A veto consulted on every access through a `secure` member.
///
/// Rules are registered on [`Bindings`](crate::Bindings) and apply to every
/// member wired with the `secure` flag. Rules are additive vetoes: an empty
/// rule set grants, the first failing rule denies with its reason.
///
/// # Examples
///
/// ```rust
/// use wirework::{AccessContext, SecurityRule};
///
/// struct BlockSecrets;
///
/// impl SecurityRule for BlockSecrets {
///     fn check(&self, ctx: &AccessContext) -> Result<(), String> {
///         if ctx.impl_name.contains("Secret") {
///             Err(format!("implementation {} is off limits", ctx.impl_name))
///         } else {
///             Ok(())
///         }
///     }
/// }
/// ```
pub trait SecurityRule: Send + Sync {
    /// Returns `Err` with a reason to deny the access.
    fn check(&self, ctx: &AccessContext) -> Result<(), String>;
}

/// Outcome of one recorded access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    /// The access passed every rule and yielded the value.
    Granted,
    /// A security rule vetoed the access.
    Denied,
}

/// One entry of a `logging` member's access log.
#[derive(Debug, Clone)]
pub struct AccessRecord {
    /// Subject of the accessed member.
    pub subject: &'static str,
    /// Type name of the wired implementation.
    pub impl_name: &'static str,
    /// Position in the member's access sequence, starting at 0.
    pub seq: u64,
    /// Whether the access was granted or denied.
    pub outcome: AccessOutcome,
}

/// Counter snapshot for a `metrics` member.
#[derive(Debug, Clone)]
pub struct AccessReport {
    /// Subject of the member.
    pub subject: &'static str,
    /// Type name of the wired implementation.
    pub impl_name: &'static str,
    /// Granted accesses so far.
    pub accesses: u64,
    /// Denied accesses so far.
    pub denied: u64,
}

struct AccessMetrics {
    accesses: AtomicU64,
    denied: AtomicU64,
}

impl AccessMetrics {
    fn new() -> Self {
        Self {
            accesses: AtomicU64::new(0),
            denied: AtomicU64::new(0),
        }
    }
}

// Bounded: the oldest record falls out once the cap is reached.
struct AccessLog {
    records: Mutex<VecDeque<AccessRecord>>,
    seq: AtomicU64,
}

impl AccessLog {
    fn new() -> Self {
        Self {
            records: Mutex::new(VecDeque::new()),
            seq: AtomicU64::new(0),
        }
    }

    fn append(&self, subject: &'static str, impl_name: &'static str, outcome: AccessOutcome) {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let mut records = self.records.lock();
        if records.len() == ACCESS_LOG_CAP {
            records.pop_front();
        }
        records.push_back(AccessRecord {
            subject,
            impl_name,
            seq,
            outcome,
        });
    }

    fn snapshot(&self) -> Vec<AccessRecord> {
        self.records.lock().iter().cloned().collect()
    }
}

/// The cross-cutting layers a member's access boundary carries.
///
/// Built per wired member from its proxy flags. Each capability exists only
/// when its flag is set; `for_flags` returns `None` when no capability is
/// requested, so unflagged members pay nothing.
pub(crate) struct AspectShell {
    subject: &'static str,
    impl_name: &'static str,
    gate: Option<Mutex<()>>,
    metrics: Option<AccessMetrics>,
    rules: Option<Arc<[Arc<dyn SecurityRule>]>>,
    log: Option<AccessLog>,
}

impl AspectShell {
    pub(crate) fn for_flags(
        subject: &'static str,
        impl_name: &'static str,
        flags: ProxyFlags,
        rules: &[Arc<dyn SecurityRule>],
    ) -> Option<AspectShell> {
        if !flags.wants_shell() {
            return None;
        }
        Some(AspectShell {
            subject,
            impl_name,
            gate: flags.concurrent.then(|| Mutex::new(())),
            metrics: flags.metrics.then(AccessMetrics::new),
            rules: flags.secure.then(|| rules.to_vec().into()),
            log: flags.logging.then(AccessLog::new),
        })
    }

    pub(crate) fn lock_gate(&self) -> Option<MutexGuard<'_, ()>> {
        self.gate.as_ref().map(|gate| gate.lock())
    }

    pub(crate) fn authorize(&self) -> WireResult<()> {
        if let Some(rules) = &self.rules {
            let ctx = AccessContext {
                subject: self.subject,
                impl_name: self.impl_name,
            };
            for rule in rules.iter() {
                if let Err(reason) = rule.check(&ctx) {
                    if let Some(metrics) = &self.metrics {
                        metrics.denied.fetch_add(1, Ordering::Relaxed);
                    }
                    if let Some(log) = &self.log {
                        log.append(self.subject, self.impl_name, AccessOutcome::Denied);
                    }
                    tracing::warn!(
                        subject = self.subject,
                        impl_name = self.impl_name,
                        reason = %reason,
                        "access denied"
                    );
                    return Err(WireError::AccessDenied {
                        subject: self.subject,
                        rule: reason,
                    });
                }
            }
        }
        Ok(())
    }

    pub(crate) fn record_granted(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.accesses.fetch_add(1, Ordering::Relaxed);
        }
        if let Some(log) = &self.log {
            log.append(self.subject, self.impl_name, AccessOutcome::Granted);
            tracing::debug!(
                subject = self.subject,
                impl_name = self.impl_name,
                "access granted"
            );
        }
    }

    pub(crate) fn report(&self) -> Option<AccessReport> {
        self.metrics.as_ref().map(|metrics| AccessReport {
            subject: self.subject,
            impl_name: self.impl_name,
            accesses: metrics.accesses.load(Ordering::Relaxed),
            denied: metrics.denied.load(Ordering::Relaxed),
        })
    }

    pub(crate) fn log_records(&self) -> Vec<AccessRecord> {
        self.log.as_ref().map(AccessLog::snapshot).unwrap_or_default()
    }
}
