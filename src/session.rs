// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{ApiError, ApiResult};
use crate::models::User;

/// Who is calling the API. Passed explicitly to every data-access call
/// instead of living in process-wide state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    access_token: Option<String>,
    user: Option<User>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new(access_token: impl Into<String>, user: Option<User>) -> Self {
        let token = access_token.into();
        let token = token.trim();
        Self {
            access_token: (!token.is_empty()).then(|| token.to_string()),
            user,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn require_token(&self, operation: &'static str) -> ApiResult<&str> {
        self.token().ok_or(ApiError::Unauthenticated(operation))
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn member_id(&self) -> Option<i64> {
        self.user.as_ref().map(|u| u.id)
    }

    /// Whether `author_id` names the signed-in user.
    pub fn is_author(&self, author_id: Option<i64>) -> bool {
        matches!((self.member_id(), author_id), (Some(me), Some(author)) if me == author)
    }
}
