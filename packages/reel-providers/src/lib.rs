pub mod opensearch;
pub mod slack;

mod error;

pub use error::{Error, Result};
