pub mod admin;
pub mod contest;
pub mod team;
