pub mod client;
pub mod error;
pub mod staging;

pub use client::DapClient;
pub use error::{DapError, Result};
