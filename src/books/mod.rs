pub mod model;
pub mod repository;

pub use model::{Book, BookCreate, BookStatus, BookUpdate, NewBook};
pub use repository::BookRepository;

/// Table backing the book records in the external store.
pub const BOOKS_TABLE: &str = "books";
