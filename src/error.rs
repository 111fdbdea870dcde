//! Unified error type for hogp-host.
//!
//! We avoid `alloc` - all variants carry only fixed-size data.  Nothing in
//! this crate is fatal: the worst outcome is "no keys ever decoded", always
//! recoverable by restarting discovery.

/// Errors surfaced through the host API.
///
/// `E` is the transport's own error type; it appears when a command issued
/// to the BLE stack is rejected synchronously.  Session outcomes (scan
/// timeout, missing service, no input reports) are not errors: they arrive
/// asynchronously as [`HostEvent`](crate::host::HostEvent)s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostError<E> {
    /// A discovery session is already in progress; wait for it to finish
    /// (or time out) before starting a new one.
    Busy,

    /// The transport rejected a command.
    Transport(E),
}

impl<E> From<E> for HostError<E> {
    fn from(e: E) -> Self {
        HostError::Transport(e)
    }
}
