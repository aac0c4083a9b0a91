pub mod result_set;
pub mod season;
pub mod stat_row;

pub use result_set::*;
pub use season::*;
pub use stat_row::*;
