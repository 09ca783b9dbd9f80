//! Plain byte patcher for memory that is already writable

use std::ptr;

use super::{PatchGuard, Patcher};

/// Copies patch bytes over a location that is already writable. Never fails.
///
/// For code or other protected memory, wrap it in a
/// [`PermissionWrapper`](crate::patcher::mem::PermissionWrapper).
#[derive(Debug, Default)]
pub struct BytePatcher;

impl BytePatcher {
    /// Creates a byte patcher
    pub fn new() -> Self {
        Self
    }
}

unsafe impl Patcher for BytePatcher {
    type Error = ();
    type Guard<'a> = ByteGuard where Self: 'a;

    unsafe fn patch<'a>(
        &'a self,
        target: *mut u8,
        patch: &[u8],
    ) -> Result<Self::Guard<'a>, Self::Error> {
        let mut original = vec![0u8; patch.len()];

        // Safety: caller guarantees `target` is readable and writable for
        // `patch.len()` bytes
        ptr::copy(target, original.as_mut_ptr(), patch.len());
        ptr::copy(patch.as_ptr(), target, patch.len());

        Ok(ByteGuard { original, target })
    }
}

/// Restores the bytes a [`BytePatcher`] overwrote
pub struct ByteGuard {
    /// Bytes that were at the target before the patch
    original: Vec<u8>,
    /// Location of the patch
    target: *mut u8,
}

impl ByteGuard {
    /// The bytes the patch replaced
    pub fn original(&self) -> &[u8] {
        &self.original
    }
}

unsafe impl PatchGuard for ByteGuard {}

impl Drop for ByteGuard {
    fn drop(&mut self) {
        // Safety: creator guarantees `target` stays valid and writable for
        // the guard's lifetime
        unsafe {
            ptr::copy(self.original.as_ptr(), self.target, self.original.len());
        }
    }
}
