mod admin;
mod auth;
mod books;
mod covers;

pub use admin::health;
pub use auth::check_auth;
pub use books::{create_book, delete_book, list_books, update_book};
pub use covers::get_cover;
