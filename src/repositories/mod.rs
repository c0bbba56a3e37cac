pub mod contact_repository;
pub mod user_repository;

pub use contact_repository::{ContactRepository, SqliteContactRepository};
pub use user_repository::{SqliteUserRepository, UserRepository};
