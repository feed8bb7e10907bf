pub mod admin_users;
pub mod raffle_numbers;

pub use admin_users as admin_user_entity;
pub use raffle_numbers as raffle_number_entity;
