pub mod aggregation;
pub mod error;
mod service;

pub use aggregation::*;
pub use error::*;
pub use service::*;
