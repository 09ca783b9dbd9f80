//! # Registers
//!
//! Snapshot and restore of the volatile registers around hand-written
//! trampolines

/// Snapshot of the three volatile general-purpose registers.
///
/// EAX, ECX and EDX are the registers a call is free to clobber under the
/// prevailing 32-bit conventions, so a trampoline that takes over a
/// function's first instructions has to park them before running hook logic
/// and put them back before jumping on to the original code. The snapshot is
/// caller-owned: each save/restore pair works on the instance the caller
/// passes in. One snapshot belongs to one pair at a time; nesting pairs on
/// the same instance, or sharing it between threads, overwrites the earlier
/// save.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegisterFile {
    /// Saved EAX
    pub eax: u32,
    /// Saved ECX
    pub ecx: u32,
    /// Saved EDX
    pub edx: u32,
}

impl RegisterFile {
    /// A zeroed snapshot
    pub const fn new() -> Self {
        Self {
            eax: 0,
            ecx: 0,
            edx: 0,
        }
    }
}

#[cfg(target_arch = "x86")]
pub use self::x86::{restore_volatile, save_volatile};

/// The naked save/restore routines, compiled for 32-bit x86 only; everything
/// else in the crate is host-agnostic
#[cfg(target_arch = "x86")]
mod x86 {
    use core::arch::naked_asm;

    use super::RegisterFile;

    /// Copies EAX, ECX and EDX into `regs` and leaves all three unchanged.
    ///
    /// Naked routine: no prologue touches the registers before they are
    /// read, and it returns with a bare `ret`. The snapshot pointer is read
    /// from the stack, so a trampoline stages it with a `push` (which
    /// clobbers no register) and cleans the slot up after the matching
    /// [`restore_volatile`]:
    ///
    /// ```text
    /// push offset snapshot
    /// call save_volatile
    /// ; hook logic, EAX/ECX/EDX free
    /// call restore_volatile
    /// add  esp, 4
    /// jmp  original_code
    /// ```
    ///
    /// # Safety
    ///
    /// `regs` must point to a writable [`RegisterFile`] that no other
    /// save/restore pair is currently using.
    #[unsafe(naked)]
    pub unsafe extern "C" fn save_volatile(regs: *mut RegisterFile) {
        naked_asm!(
            "push eax",
            "mov eax, [esp + 8]",
            "mov [eax + 4], ecx",
            "mov [eax + 8], edx",
            "pop ecx",
            "mov [eax], ecx",
            "mov ecx, [eax + 4]",
            "mov eax, [eax]",
            "ret",
        )
    }

    /// Copies the snapshot in `regs` back into EAX, ECX and EDX.
    ///
    /// Counterpart of [`save_volatile`]; call it immediately before the
    /// trampoline hands control back, so the instructions the hook displaced
    /// see the registers they depended on.
    ///
    /// # Safety
    ///
    /// `regs` must point to the [`RegisterFile`] filled by the matching
    /// [`save_volatile`], with no intervening save on the same snapshot.
    #[unsafe(naked)]
    pub unsafe extern "C" fn restore_volatile(regs: *const RegisterFile) {
        naked_asm!(
            "mov eax, [esp + 4]",
            "mov ecx, [eax + 4]",
            "mov edx, [eax + 8]",
            "mov eax, [eax]",
            "ret",
        )
    }
}
