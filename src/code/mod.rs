//! # Code
//!
//! Instruction encodings emitted by hooks

pub mod x86;
