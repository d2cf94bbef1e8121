pub mod models;
pub mod postgres;
pub mod store;

pub use postgres::PgStore;
pub use store::{Store, StoreError};
