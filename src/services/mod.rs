pub mod allocator;
pub mod assignment_cache;
pub mod auth_service;
pub mod draw_service;
pub mod event_service;
pub mod visitor_service;

pub use allocator::*;
pub use assignment_cache::*;
pub use auth_service::*;
pub use draw_service::*;
pub use event_service::*;
pub use visitor_service::*;
