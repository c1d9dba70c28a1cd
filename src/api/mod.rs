pub mod error;
pub mod page;
