#![warn(clippy::missing_docs_in_private_items)]
#![warn(rustdoc::missing_crate_level_docs)]
#![doc = include_str!("../README.md")]

pub mod addr;
pub mod code;
pub mod hook;
pub mod patcher;
pub mod regs;

pub use addr::Addr;
