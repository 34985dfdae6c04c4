//! Error types for the wiring engine.

use std::fmt;

/// Wiring errors
///
/// Represents the error conditions that can occur while registering bindings,
/// activating an object graph, or accessing a wired member in wirework.
///
/// # Examples
///
/// ```rust
/// use wirework::{Bindings, Injected, ProxyFlags, TypeShape, WireError, Wirable};
///
/// // Example of NotFound surfacing from activation
/// #[derive(Default)]
/// struct Lonely {
///     dep: Injected<u32>,
/// }
///
/// impl Wirable for Lonely {
///     fn shape() -> TypeShape {
///         TypeShape::of::<Self>()
///             .member("dep", ProxyFlags::default(), |s: &mut Lonely, v: Injected<u32>| {
///                 s.dep = v;
///             })
///             .finish()
///     }
/// }
///
/// let activator = Bindings::new().build();
/// let mut lonely = Lonely::default();
/// match activator.activate(&mut lonely) {
///     Err(WireError::NotFound(subject)) => assert_eq!(subject, "u32"),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use wirework::WireError;
///
/// // Examples of error values
/// let not_found = WireError::NotFound("app::Repository");
/// let ambiguous = WireError::Ambiguous("app::Repository", vec!["app::Sql", "app::InMemory"]);
/// let cyclic = WireError::Cyclic(vec!["app::A", "app::B", "app::A"]);
/// let depth = WireError::DepthExceeded(1024);
///
/// // All errors implement Display
/// println!("Error: {}", not_found);
/// println!("Error: {}", ambiguous);
/// println!("Error: {}", cyclic);
/// println!("Error: {}", depth);
/// ```
#[derive(Debug, Clone)]
pub enum WireError {
    /// No implementation bound for the requested subject
    NotFound(&'static str),
    /// More than one implementation bound for the subject (includes candidates)
    Ambiguous(&'static str, Vec<&'static str>),
    /// A constructor failed while producing an implementation
    Instantiation(&'static str, String),
    /// A member setter rejected the produced value
    MemberWrite {
        /// Type that declares the member
        owner: &'static str,
        /// Declared member name
        member: &'static str,
        /// Subject type the member expects
        expected: &'static str,
    },
    /// A lifecycle entry failed after wiring
    Lifecycle {
        /// Type that declares the entry
        owner: &'static str,
        /// Declared entry name
        member: &'static str,
        /// Failure reason reported by the entry
        reason: String,
    },
    /// Cyclic construction detected (includes path)
    Cyclic(Vec<&'static str>),
    /// Maximum recursion depth exceeded
    DepthExceeded(usize),
    /// A security rule vetoed an access through a secure member
    AccessDenied {
        /// Subject of the accessed member
        subject: &'static str,
        /// Reason reported by the vetoing rule
        rule: String,
    },
    /// Access through a member slot that was never wired
    Unset(&'static str),
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::NotFound(name) => write!(f, "No implementation bound for: {}", name),
            WireError::Ambiguous(name, candidates) => {
                write!(f, "Ambiguous subject {}: candidates {}", name, candidates.join(", "))
            }
            WireError::Instantiation(name, reason) => {
                write!(f, "Failed to construct {}: {}", name, reason)
            }
            WireError::MemberWrite { owner, member, expected } => {
                write!(f, "Cannot write member {}::{} (expected {})", owner, member, expected)
            }
            WireError::Lifecycle { owner, member, reason } => {
                write!(f, "Lifecycle entry {}::{} failed: {}", owner, member, reason)
            }
            WireError::Cyclic(path) => {
                write!(f, "Cyclic construction: {}", path.join(" -> "))
            }
            WireError::DepthExceeded(depth) => write!(f, "Max depth {} exceeded", depth),
            WireError::AccessDenied { subject, rule } => {
                write!(f, "Access to {} denied: {}", subject, rule)
            }
            WireError::Unset(name) => write!(f, "Member of subject {} was never wired", name),
        }
    }
}

impl std::error::Error for WireError {}

/// Result type for wiring operations
///
/// A convenience type alias for `Result<T, WireError>` used throughout
/// wirework, following the common Rust pattern of a crate-specific Result
/// type to reduce boilerplate in signatures.
///
/// # Examples
///
/// ```rust
/// use wirework::{WireError, WireResult};
///
/// fn lookup() -> WireResult<&'static str> {
///     Ok("found")
/// }
///
/// fn failing_lookup() -> WireResult<&'static str> {
///     Err(WireError::NotFound("some_subject"))
/// }
///
/// assert!(lookup().is_ok());
/// assert!(failing_lookup().is_err());
/// ```
pub type WireResult<T> = Result<T, WireError>;
