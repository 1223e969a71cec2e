//! Data models for the library catalog

pub mod author;
pub mod book;
pub mod category;

// Re-export commonly used types
pub use author::{Author, AuthorInput, AuthorPatch};
pub use book::{Book, BookInput, BookPatch, EntityRef};
pub use category::{Category, CategoryInput, CategoryPatch};
