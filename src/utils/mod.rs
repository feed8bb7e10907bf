pub mod event_id;
pub mod jwt;
pub mod password;

pub use event_id::*;
pub use jwt::*;
pub use password::*;
