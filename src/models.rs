// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Lifecycle shared by every view: nothing requested yet, request in flight,
/// last request succeeded, last request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Comment,
    Keyword,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 2] = [NotificationKind::Comment, NotificationKind::Keyword];

    pub fn path_segment(self) -> &'static str {
        match self {
            NotificationKind::Comment => "comment",
            NotificationKind::Keyword => "keyword",
        }
    }

    /// Named SSE event carrying this category.
    pub fn event_name(self) -> &'static str {
        match self {
            NotificationKind::Comment => "commentNotification",
            NotificationKind::Keyword => "keywordNotification",
        }
    }

    pub fn from_event_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.event_name() == name)
    }

    pub fn label(self) -> &'static str {
        match self {
            NotificationKind::Comment => "Activity",
            NotificationKind::Keyword => "Keyword",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for NotificationKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "comment" | "activity" => Ok(NotificationKind::Comment),
            "keyword" => Ok(NotificationKind::Keyword),
            other => Err(anyhow!(
                "Unknown notification kind '{}' (use comment|keyword)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub post_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    #[serde(default)]
    pub author_id: Option<i64>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default, deserialize_with = "nullable_default")]
    pub hashtags: BTreeSet<String>,
    #[serde(default)]
    pub author_id: Option<i64>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, deserialize_with = "nullable_default")]
    pub like_count: i64,
    #[serde(default, deserialize_with = "nullable_default")]
    pub comments: Vec<Comment>,
}

impl Post {
    pub fn comment(&self, comment_id: i64) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }
}

/// One row of a post search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, deserialize_with = "nullable_default")]
    pub like_count: i64,
    #[serde(default, deserialize_with = "nullable_default")]
    pub hashtags: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SearchType {
    #[default]
    All,
    Title,
    Body,
    Hashtag,
    Author,
}

impl SearchType {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchType::All => "ALL",
            SearchType::Title => "TITLE",
            SearchType::Body => "BODY",
            SearchType::Hashtag => "HASHTAG",
            SearchType::Author => "AUTHOR",
        }
    }
}

impl FromStr for SearchType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "ALL" => Ok(SearchType::All),
            "TITLE" => Ok(SearchType::Title),
            "BODY" => Ok(SearchType::Body),
            "HASHTAG" => Ok(SearchType::Hashtag),
            "AUTHOR" => Ok(SearchType::Author),
            other => Err(anyhow!(
                "Unknown search type '{}' (use all|title|body|hashtag|author)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "nullable_default")]
    pub description: String,
    #[serde(default)]
    pub total_asset: Option<Decimal>,
    #[serde(default)]
    pub total_profit: Option<Decimal>,
}

impl Portfolio {
    pub fn asset(&self) -> Decimal {
        self.total_asset.unwrap_or(Decimal::ZERO)
    }

    pub fn profit(&self) -> Decimal {
        self.total_profit.unwrap_or(Decimal::ZERO)
    }
}

/// Payload for `POST /api/v1/portfolios`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PortfolioDraft {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTotals {
    pub total_assets: Decimal,
    pub total_profits: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub profile: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Kakao,
}

impl OAuthProvider {
    pub const ALL: [OAuthProvider; 2] = [OAuthProvider::Google, OAuthProvider::Kakao];

    pub fn as_str(self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Kakao => "kakao",
        }
    }
}

impl FromStr for OAuthProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "google" => Ok(OAuthProvider::Google),
            "kakao" => Ok(OAuthProvider::Kakao),
            other => Err(anyhow!("Unknown provider '{}' (use google|kakao)", other)),
        }
    }
}

// Treats an explicit JSON null the same as a missing field.
fn nullable_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
