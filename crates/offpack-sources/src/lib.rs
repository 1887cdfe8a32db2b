//! Source connectivity checks for offpack

pub mod error;
pub mod handler;
pub mod url;

pub use error::{CheckError, Result};
pub use handler::{ConnectivityCheck, CheckResult};
pub use url::HttpChecker;
