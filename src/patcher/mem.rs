//! Protection-aware patching: the one path that may write into memory that
//! is not currently writable

use log::{error, info};
use region::Protection;
use thiserror::Error;

use crate::addr::display_ptr;

use super::{PatchGuard, Patcher};

/// Errors from patching through a [`PermissionWrapper`]
#[derive(Debug, Error)]
pub enum PermissionError<E> {
    /// The platform refused to change the target region's protection
    #[error("error setting memory protections")]
    Protection(#[from] region::Error),
    /// Error from the wrapped patcher
    #[error("{0}")]
    Patcher(E),
}

/// Runs any patcher against memory that is not normally writable.
///
/// For each patch the target range is switched to read-write-execute, the
/// wrapped patcher performs the copy, and the captured prior protection is
/// put back before the call returns. A failed protection change is logged
/// and returned as an error, and the region is left untouched in its
/// original protection state.
///
/// The copy itself is a plain byte write with no atomicity across the range;
/// a thread executing inside the range concurrently can observe a
/// half-written instruction, so patching is single-threaded-only.
pub struct PermissionWrapper<P> {
    /// Patcher that performs the copy once the region is writable
    patcher: P,
}

impl<P> PermissionWrapper<P> {
    /// Wraps `patcher` with protection handling
    pub fn new(patcher: P) -> Self {
        Self { patcher }
    }
}

unsafe impl<P: Patcher> Patcher for PermissionWrapper<P> {
    type Error = PermissionError<P::Error>;
    type Guard<'a> = PermissionGuard<P::Guard<'a>> where Self: 'a;

    unsafe fn patch<'a>(
        &'a self,
        target: *mut u8,
        patch: &[u8],
    ) -> Result<Self::Guard<'a>, Self::Error> {
        // open a writable window, keeping the prior protection for restore
        let window = match region::protect_with_handle(
            target,
            patch.len(),
            Protection::READ_WRITE_EXECUTE,
        ) {
            Ok(window) => window,
            Err(err) => {
                error!(
                    "error while patching address {}: {err}",
                    display_ptr(target)
                );
                return Err(err.into());
            }
        };

        let guard = match self.patcher.patch(target, patch) {
            Ok(guard) => guard,
            Err(err) => return Err(PermissionError::Patcher(err)),
        };

        // prior protection goes back before success is reported
        drop(window);
        info!(
            "memory patched successfully at address {}",
            display_ptr(target)
        );

        Ok(PermissionGuard::new(guard, target, patch.len()))
    }
}

/// Restores a patch applied through a [`PermissionWrapper`].
///
/// The target range is re-opened for the restore and put back to its prior
/// protection afterwards. When the range can no longer be made writable the
/// restore is skipped and logged rather than faulting on a protected page.
pub struct PermissionGuard<G: PatchGuard> {
    /// Guard of the wrapped patcher; taken exactly once on drop
    guard: Option<G>,
    /// Location of the patch
    target: *const u8,
    /// Length of the patch
    len: usize,
}

impl<G: PatchGuard> PermissionGuard<G> {
    /// Wraps the inner patcher's guard
    fn new(guard: G, target: *const u8, len: usize) -> Self {
        Self {
            guard: Some(guard),
            target,
            len,
        }
    }
}

unsafe impl<G: PatchGuard> PatchGuard for PermissionGuard<G> {}

impl<G: PatchGuard> Drop for PermissionGuard<G> {
    fn drop(&mut self) {
        let Some(guard) = self.guard.take() else {
            return;
        };

        // Safety: the target was valid when the patch was applied and the
        // creator keeps it mapped for the guard's lifetime
        match unsafe {
            region::protect_with_handle(self.target, self.len, Protection::READ_WRITE_EXECUTE)
        } {
            Ok(window) => {
                guard.restore();
                drop(window);
            }
            Err(err) => {
                error!(
                    "error while restoring address {}: {err}",
                    display_ptr(self.target)
                );
                std::mem::forget(guard);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ptr;
    use std::slice;

    use region::Protection;

    use super::*;
    use crate::patcher::byte::BytePatcher;

    /// Protection flags of every page backing `len` bytes at `target`
    fn protections(target: *const u8, len: usize) -> Vec<Protection> {
        region::query_range(target, len)
            .unwrap()
            .map(|result| result.unwrap().protection())
            .collect()
    }

    #[test]
    /// Read-only static data can be patched, and both the bytes and the
    /// page protections round-trip
    fn patches_read_only_data_and_restores_protection() {
        // a static byte string lands in a read-only section of the binary,
        // so this write only works because the wrapper opens the page first
        let data: &'static [u8; 4] = b"hook";
        let target = data.as_ptr();

        let before = protections(target, data.len());
        assert!(before.iter().all(|p| !p.contains(Protection::WRITE)));

        let wrapper = PermissionWrapper::new(BytePatcher::new());
        let guard = unsafe { wrapper.patch(target as *mut u8, &[1, 2, 3, 4]) }.unwrap();

        assert_eq!(unsafe { slice::from_raw_parts(target, 4) }, [1, 2, 3, 4]);
        assert_eq!(protections(target, data.len()), before);

        guard.restore();
        // can't compare against a second b"hook" literal: the linker may fold
        // it into the very bytes this test patches
        assert_eq!(
            unsafe { slice::from_raw_parts(target, 4) },
            [b'h', b'o', b'o', b'k']
        );
        assert_eq!(protections(target, data.len()), before);
    }

    #[test]
    /// On already-writable memory the wrapper behaves like a plain patcher
    fn heap_patch_round_trips() {
        let target = Box::into_raw(vec![0xAAu8; 8].into_boxed_slice()) as *mut u8;
        let wrapper = PermissionWrapper::new(BytePatcher::new());

        let guard = unsafe { wrapper.patch(target, &[0x55; 8]) }.unwrap();
        assert_eq!(unsafe { slice::from_raw_parts(target, 8) }, [0x55; 8]);

        drop(guard);
        assert_eq!(unsafe { slice::from_raw_parts(target, 8) }, [0xAA; 8]);

        drop(unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(target, 8)) });
    }
}
