//! # Address
//!
//! 32-bit process addresses and their diagnostic rendering

use std::fmt;

use thiserror::Error;

/// Error when a native pointer does not fit the 32-bit address space
#[derive(Debug, Error)]
#[error("pointer {0:#x} does not fit in the 32-bit address space")]
pub struct AddrOutOfRange(pub usize);

/// A byte location in a 32-bit process address space.
///
/// A bare numeric value with no ownership semantics: it stays meaningful only
/// while the referenced region remains mapped with the expected layout, and
/// nothing here validates liveness. Renders as `0x` followed by exactly
/// 8 lowercase, zero-padded hex digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Addr(u32);

impl Addr {
    /// Creates an address from its numeric value
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Numeric value of the address
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Reinterprets a native pointer's bit pattern as a 32-bit address.
    ///
    /// Fails when the pointer does not fit in 32 bits, which can only happen
    /// on hosts with wider pointers than the 32-bit targets this crate
    /// patches.
    pub fn from_ptr<T>(ptr: *const T) -> Result<Self, AddrOutOfRange> {
        let value = ptr as usize;
        u32::try_from(value)
            .map(Self)
            .map_err(|_| AddrOutOfRange(value))
    }

    /// The address as a const pointer
    pub fn as_ptr(self) -> *const u8 {
        self.0 as usize as *const u8
    }

    /// The address as a mutable pointer.
    ///
    /// The pointer is only as valid as the address itself; writing through it
    /// still requires the region to be mapped writable.
    pub fn as_mut_ptr(self) -> *mut u8 {
        self.0 as usize as *mut u8
    }
}

impl From<u32> for Addr {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Renders a native pointer for diagnostics: the 32-bit form when it fits,
/// the full pointer width otherwise (dev hosts with 64-bit pointers)
pub(crate) fn display_ptr<T>(ptr: *const T) -> String {
    match Addr::from_ptr(ptr) {
        Ok(addr) => addr.to_string(),
        Err(AddrOutOfRange(value)) => format!("{value:#x}"),
    }
}
