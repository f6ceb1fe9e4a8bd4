pub mod contest;
pub mod entry;
pub mod fixture;
pub mod player;
pub mod response;
pub mod schema;
pub mod user;
