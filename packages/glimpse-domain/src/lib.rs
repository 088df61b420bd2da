pub mod classify;
pub mod content;
pub mod facet;
pub mod folder;
pub mod ranking;

mod error;

pub use error::{Error, Result};
