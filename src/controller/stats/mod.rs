pub mod derived;
pub mod display;

pub use derived::*;
pub use display::*;
