pub mod indicators;
pub mod proxy;
pub mod source;

#[cfg(test)]
mod indicators_tests;

pub use indicators::*;
pub use source::*;
