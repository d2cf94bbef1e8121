mod create;
mod delete;
mod get;
pub mod schemas;
mod update;

pub use create::create_application;
pub use delete::delete_application;
pub use get::{get_application, list_applications};
pub use update::update_application;
