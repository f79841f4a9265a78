//! Local user accounts and their storage.

mod model;
mod repository;
mod store;

pub use model::{CreateUserOverwriteOptions, LoginType, User, UserMeta};
pub use repository::SqliteUserStore;
pub use store::{StoreError, UserStore};
