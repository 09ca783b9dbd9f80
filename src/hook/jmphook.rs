//! # Jump hook
//!
//! Reroutes execution with a 5-byte `jmp rel32` written over the hook site

use log::info;

use crate::addr::Addr;
use crate::code::x86::jmp_rel32;
use crate::patcher::{PatchGuard, Patcher};

use super::{Hook, HookGuard};

/// Placeholder used in diagnostics when a reroute carries no label
const UNNAMED_TARGET: &str = "target function";

/// Reroutes functions by overwriting their first bytes with a near jump.
///
/// The hook site must have at least 5 contiguous bytes reserved for the
/// overwrite and nothing may branch into the middle of that range; a jump
/// written over the tail of a shorter instruction corrupts the code that
/// follows it.
pub struct JmpHook<P> {
    /// Patcher that writes the jump instruction
    patcher: P,
}

impl<P: Patcher> JmpHook<P> {
    /// Creates a jump hook that writes through `patcher`
    pub fn new(patcher: P) -> Self {
        Self { patcher }
    }

    /// Installs the jump from `site` to `target`, labelling `target` as
    /// `name` in the diagnostic trace.
    ///
    /// The encoding is deterministic: rerouting the same pair twice produces
    /// byte-identical patches (and a second set of trace lines).
    ///
    /// # Safety
    ///
    /// Same contract as [`Hook::hook`].
    pub unsafe fn reroute(
        &self,
        site: Addr,
        target: Addr,
        name: Option<&str>,
    ) -> Result<JmpHookGuard<P::Guard<'_>>, P::Error> {
        info!("rerouting starting at address {site}");
        info!("address of {}: {target}", name.unwrap_or(UNNAMED_TARGET));

        let patch = self
            .patcher
            .patch(site.as_mut_ptr(), &jmp_rel32(site, target))?;

        Ok(JmpHookGuard::new(patch))
    }
}

unsafe impl<P: Patcher> Hook for JmpHook<P> {
    type Error = P::Error;
    type Guard<'a> = JmpHookGuard<P::Guard<'a>> where Self: 'a;

    unsafe fn hook(
        &self,
        source: Addr,
        destination: Addr,
    ) -> Result<Self::Guard<'_>, Self::Error> {
        self.reroute(source, destination, None)
    }
}

/// Guard for an installed jump hook
pub struct JmpHookGuard<G: PatchGuard> {
    /// Patch guard holding the overwritten bytes
    guard: G,
}

impl<G: PatchGuard> JmpHookGuard<G> {
    /// Wraps the patch guard of the written jump
    fn new(guard: G) -> Self {
        Self { guard }
    }

    /// The underlying patch guard, for inspecting the overwritten bytes
    pub fn patch(&self) -> &G {
        &self.guard
    }
}

unsafe impl<G: PatchGuard> HookGuard for JmpHookGuard<G> {}
