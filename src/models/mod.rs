//! Data models for the LocalLibrary catalogue

pub mod author;
pub mod book;
pub mod genre;
pub mod instance;
pub mod loan;
pub mod page;
pub mod summary;
pub mod user;

// Re-export commonly used types
pub use author::Author;
pub use book::Book;
pub use genre::Genre;
pub use instance::{BookInstance, LoanStatus};
pub use loan::LoanDetails;
pub use user::{User, UserClaims};
