//! Connectivity check trait

use async_trait::async_trait;

use crate::Result;

/// Outcome of probing a source URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub success: bool,
    /// HTTP status, absent when the request never got a response
    pub status: Option<u16>,
    pub message: String,
}

impl CheckResult {
    pub fn reachable(status: u16) -> Self {
        Self {
            success: true,
            status: Some(status),
            message: "Connection successful".to_string(),
        }
    }

    pub fn rejected(status: u16) -> Self {
        Self {
            success: false,
            status: Some(status),
            message: format!("Connection failed: {status}"),
        }
    }

    pub fn unreachable(reason: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            status: None,
            message: format!("Connection failed: {reason}"),
        }
    }
}

/// Checks whether a source endpoint answers.
///
/// Only input validation errors are returned as `Err`; an unreachable or
/// rejecting endpoint is a failed [`CheckResult`].
#[async_trait]
pub trait ConnectivityCheck: Send + Sync {
    async fn check(&self, url: &str) -> Result<CheckResult>;
}
