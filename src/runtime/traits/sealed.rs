// ABOUTME: Sealed trait pattern for engine traits.
// ABOUTME: Only runtimes defined in this crate may implement the capability traits.

/// Sealed trait to prevent external implementations.
///
/// New methods can be added to the capability traits without breaking
/// downstream code, because nothing outside the crate implements them.
pub trait Sealed {}
