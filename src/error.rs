// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failures surfaced by the Stock Note API client and the notification stream.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{method} {url} returned HTTP {status}")]
    Status {
        method: String,
        url: String,
        status: u16,
    },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0} requires a signed-in session (run `stocknote login`)")]
    Unauthenticated(&'static str),
    #[error("notification stream: {0}")]
    Stream(String),
}

impl ApiError {
    /// True for 401/403 responses, so callers can tell an expired token apart
    /// from other HTTP failures.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Status { status: 401 | 403, .. })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_are_distinguished() {
        let unauthorized = ApiError::Status {
            method: "GET".into(),
            url: "http://localhost:8090/notifications/comment".into(),
            status: 401,
        };
        let missing = ApiError::Status {
            method: "GET".into(),
            url: "http://localhost:8090/api/v1/posts/9".into(),
            status: 404,
        };
        assert!(unauthorized.is_auth_failure());
        assert!(!missing.is_auth_failure());
        assert!(!ApiError::Unauthenticated("like").is_auth_failure());
        assert_eq!(
            missing.to_string(),
            "GET http://localhost:8090/api/v1/posts/9 returned HTTP 404"
        );
    }
}
