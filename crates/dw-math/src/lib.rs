//! dumpwatch math utilities.

pub mod math;

pub use math::reduce::*;
pub use math::describe::*;
