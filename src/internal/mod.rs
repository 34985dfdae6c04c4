//! Internal implementation details.

pub(crate) mod session;

pub(crate) use session::WiringSession;
