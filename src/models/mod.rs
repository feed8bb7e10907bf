pub mod auth;
pub mod common;
pub mod raffle;

pub use auth::*;
pub use common::*;
pub use raffle::*;
