//! # Hook
//!
//! Hooks redirect execution from one address to another

pub mod jmphook;

use crate::addr::Addr;

/// Redirects execution from a source address to a destination address.
///
/// # Safety
///
/// Implementors must emit a valid instruction encoding for the target
/// architecture; a malformed redirect executes arbitrary bytes.
pub unsafe trait Hook {
    /// Errors that can occur while installing the hook
    type Error;
    /// Guard representing the installed hook; unhooks when dropped
    type Guard<'a>: HookGuard + 'a
    where
        Self: 'a;

    /// Installs a redirect so execution arriving at `source` continues at
    /// `destination`.
    ///
    /// # Safety
    ///
    /// - `source` must be mapped code of the current process with enough
    ///   room reserved for the redirect instruction
    /// - `destination` must be valid executable code
    /// - no thread may be executing inside the overwritten range
    unsafe fn hook(
        &self,
        source: Addr,
        destination: Addr,
    ) -> Result<Self::Guard<'_>, Self::Error>;
}

/// Guard for a currently installed hook.
///
/// # Safety
///
/// Implementors must fully unhook when dropped, whether through
/// [`HookGuard::unhook`] or a plain drop.
pub unsafe trait HookGuard: Sized {
    /// Removes the hook now instead of at end of scope
    fn unhook(self) {
        // removal lives in the Drop impl of most guards
    }
}
