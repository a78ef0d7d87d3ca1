pub mod aggregate;
pub mod chart;
pub mod config;
pub mod error;
pub mod fetch;
pub mod gviz;
pub mod pipeline;

pub use error::{Result, SheetError};
