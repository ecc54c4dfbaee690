pub mod bricks;
pub mod fixtures;

#[allow(unused_imports)]
pub use bricks::*;
#[allow(unused_imports)]
pub use fixtures::*;
