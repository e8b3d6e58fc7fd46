//! The TPM 2.0 type catalog: constants, newtype aliases, sized buffers,
//! fixed structures, counted lists and externally-selected unions, each with
//! its bit-exact wire codec.

pub mod base;
pub mod buffers;
pub mod constants;
pub mod lists;
pub mod structures;
pub mod unions;

pub use base::*;
pub use buffers::*;
pub use constants::*;
pub use lists::*;
pub use structures::*;
pub use unions::*;
