pub mod blog;
pub mod comment;
pub mod role;
pub mod user;
