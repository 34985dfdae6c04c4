//! Cycle and depth tracking for a single activation.

use crate::error::{WireError, WireResult};

const MAX_DEPTH: usize = 1024;

/// In-progress construction stack for one activation.
///
/// Every activation owns its session; the stack is threaded by `&mut` through
/// recursive construction, so unrelated activations never share cycle state.
/// Deferred materialization opens a fresh session.
#[derive(Debug, Default)]
pub(crate) struct WiringSession {
    stack: Vec<&'static str>,
}

impl WiringSession {
    pub(crate) fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Marks a concrete type as under construction.
    ///
    /// Fails with the full path (in-progress chain plus the repeated entry)
    /// when the type is already on the stack, or with `DepthExceeded` when
    /// the chain outgrows the depth guard.
    pub(crate) fn enter(&mut self, name: &'static str) -> WireResult<()> {
        // Cycle detection BEFORE pushing the new name
        if self.stack.iter().any(|&n| n == name) {
            let mut path = self.stack.clone();
            path.push(name);
            return Err(WireError::Cyclic(path));
        }

        // Depth guard
        if self.stack.len() >= MAX_DEPTH {
            return Err(WireError::DepthExceeded(self.stack.len()));
        }

        self.stack.push(name);
        Ok(())
    }

    /// Unmarks the most recent entry. Callers pair this with `enter` around
    /// construction, including on the error path.
    pub(crate) fn exit(&mut self) {
        self.stack.pop();
    }
}
