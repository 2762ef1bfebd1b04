pub mod auth;
pub mod blog;
pub mod comment;
pub mod shared;
pub mod user;
