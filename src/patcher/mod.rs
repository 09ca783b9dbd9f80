//! # Patcher
//!
//! Patchers overwrite locations in memory and hand back guards that restore
//! the original bytes

pub mod byte;
pub mod mem;

/// Writes byte patches into memory.
///
/// Every successful patch returns a guard; dropping the guard writes the
/// replaced bytes back.
///
/// # Safety
///
/// Implementors must write exactly `patch.len()` bytes at the target, and
/// their guards must restore exactly those bytes.
pub unsafe trait Patcher {
    /// Error produced when a patch cannot be applied. Patchers that always
    /// succeed use `()`.
    type Error;
    /// Guard returned on success; restores the patched location when dropped.
    type Guard<'a>: PatchGuard + 'a
    where
        Self: 'a;

    /// Copies `patch` over the bytes at `target`.
    ///
    /// # Safety
    ///
    /// `target` must be valid for reads and writes of `patch.len()` bytes
    /// under the supplied patcher's rules, and must stay mapped for the life
    /// of the returned guard.
    unsafe fn patch<'a>(
        &'a self,
        target: *mut u8,
        patch: &[u8],
    ) -> Result<Self::Guard<'a>, Self::Error>;
}

/// Guard for an applied patch.
///
/// # Safety
///
/// Implementors must fully restore the patched location when dropped, whether
/// through [`PatchGuard::restore`] or a plain drop.
pub unsafe trait PatchGuard: Sized {
    /// Restores the original bytes now instead of at end of scope
    fn restore(self) {
        // restoration lives in the Drop impl of most guards
    }
}
