//! Common test utilities and fixtures.

pub mod catalogue;
pub mod fixtures;

#[allow(unused_imports)]
pub use catalogue::*;
#[allow(unused_imports)]
pub use fixtures::*;
