pub mod cache;
pub mod client;
pub mod endpoint;
pub mod retry;

pub use cache::*;
pub use client::*;
pub use endpoint::*;
pub use retry::*;
