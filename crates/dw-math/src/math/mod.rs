//! Core math modules.

pub mod describe;
pub mod reduce;
