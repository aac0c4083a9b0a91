pub mod args;
pub mod error;
pub mod model;
pub mod controller {
    pub mod context;
    pub mod export;
    pub mod http_handlers;
    pub mod nba;
    pub mod players;
    pub mod stats;
    pub mod teams;
}
pub mod view {
    pub mod index;
}

pub use controller::context::{ServiceSettings, StatsContext};
pub use error::StatsError;
