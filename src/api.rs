// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    Notification, NotificationKind, OAuthProvider, Portfolio, PortfolioDraft, Post, PostSummary,
    SearchType,
};
use crate::session::Session;
use crate::utils::http_client;

/// Posts, comments, likes and search.
pub trait CommunityApi {
    fn fetch_post(&self, post_id: i64) -> ApiResult<Post>;
    fn check_like(&self, session: &Session, post_id: i64) -> ApiResult<bool>;
    fn like_post(&self, session: &Session, post_id: i64) -> ApiResult<()>;
    fn unlike_post(&self, session: &Session, post_id: i64) -> ApiResult<()>;
    fn delete_post(&self, session: &Session, post_id: i64) -> ApiResult<()>;
    fn create_comment(&self, session: &Session, post_id: i64, body: &str) -> ApiResult<()>;
    fn edit_comment(
        &self,
        session: &Session,
        post_id: i64,
        comment_id: i64,
        body: &str,
    ) -> ApiResult<()>;
    fn delete_comment(&self, session: &Session, post_id: i64, comment_id: i64) -> ApiResult<()>;
    fn search_posts(&self, keyword: &str, search_type: SearchType)
    -> ApiResult<Vec<PostSummary>>;
}

pub trait NotificationApi {
    fn fetch_notifications(
        &self,
        session: &Session,
        kind: NotificationKind,
    ) -> ApiResult<Vec<Notification>>;
    fn mark_notification_read(
        &self,
        session: &Session,
        kind: NotificationKind,
        notification_id: i64,
    ) -> ApiResult<()>;
}

pub trait PortfolioApi {
    fn fetch_portfolios(&self, session: &Session) -> ApiResult<Vec<Portfolio>>;
    fn create_portfolio(&self, session: &Session, draft: &PortfolioDraft) -> ApiResult<()>;
}

/// Where a browser should be sent to start the OAuth2 login flow.
pub fn oauth_login_url(base_url: &str, provider: OAuthProvider) -> String {
    format!("{}/oauth2/authorization/{}", base_url, provider.as_str())
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    content: Vec<T>,
}

/// Blocking client for the Stock Note REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> ApiResult<Self> {
        let http = http_client(config.timeout).map_err(|source| ApiError::Transport {
            url: config.base_url.clone(),
            source,
        })?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn oauth_login_url(&self, provider: OAuthProvider) -> String {
        oauth_login_url(&self.base_url, provider)
    }

    fn request(&self, method: Method, url: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match token {
            Some(t) => builder.bearer_auth(t),
            None => builder,
        }
    }

    fn execute(&self, builder: RequestBuilder, method: &Method, url: &str) -> ApiResult<Response> {
        log::debug!("{} {}", method, url);
        let resp = builder.send().map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;
        let status = resp.status();
        if !status.is_success() {
            log::debug!("{} {} -> {}", method, url, status);
            return Err(ApiError::Status {
                method: method.to_string(),
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp)
    }

    fn decode<T: DeserializeOwned>(resp: Response, url: &str) -> ApiResult<T> {
        let text = resp.text().map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> ApiResult<T> {
        let url = self.url(path);
        let resp = self.execute(self.request(Method::GET, &url, token), &Method::GET, &url)?;
        Self::decode(resp, &url)
    }

    /// Fires a mutation and discards the response body.
    fn send_json(
        &self,
        method: Method,
        path: &str,
        token: &str,
        body: Option<serde_json::Value>,
    ) -> ApiResult<()> {
        let url = self.url(path);
        let mut builder = self.request(method.clone(), &url, Some(token));
        if let Some(body) = body {
            builder = builder.json(&body);
        }
        self.execute(builder, &method, &url)?;
        Ok(())
    }
}

impl CommunityApi for ApiClient {
    fn fetch_post(&self, post_id: i64) -> ApiResult<Post> {
        let env: Envelope<Post> = self.get_json(&format!("/api/v1/posts/{}", post_id), None)?;
        Ok(env.data)
    }

    fn check_like(&self, session: &Session, post_id: i64) -> ApiResult<bool> {
        let token = session.require_token("checking like status")?;
        let env: Envelope<Option<bool>> = self.get_json(
            &format!("/api/v1/posts/{}/likes/check", post_id),
            Some(token),
        )?;
        Ok(env.data.unwrap_or(false))
    }

    fn like_post(&self, session: &Session, post_id: i64) -> ApiResult<()> {
        let token = session.require_token("liking a post")?;
        self.send_json(
            Method::POST,
            &format!("/api/v1/posts/{}/like", post_id),
            token,
            Some(json!({})),
        )
    }

    fn unlike_post(&self, session: &Session, post_id: i64) -> ApiResult<()> {
        let token = session.require_token("unliking a post")?;
        self.send_json(
            Method::POST,
            &format!("/api/v1/posts/{}/unlike", post_id),
            token,
            Some(json!({})),
        )
    }

    fn delete_post(&self, session: &Session, post_id: i64) -> ApiResult<()> {
        let token = session.require_token("deleting a post")?;
        self.send_json(
            Method::DELETE,
            &format!("/api/v1/posts/{}", post_id),
            token,
            None,
        )
    }

    fn create_comment(&self, session: &Session, post_id: i64, body: &str) -> ApiResult<()> {
        let token = session.require_token("commenting")?;
        self.send_json(
            Method::POST,
            &format!("/api/v1/posts/{}/comments", post_id),
            token,
            Some(json!({ "body": body })),
        )
    }

    fn edit_comment(
        &self,
        session: &Session,
        post_id: i64,
        comment_id: i64,
        body: &str,
    ) -> ApiResult<()> {
        let token = session.require_token("editing a comment")?;
        self.send_json(
            Method::PATCH,
            &format!("/api/v1/posts/{}/comments/{}", post_id, comment_id),
            token,
            Some(json!({ "body": body })),
        )
    }

    fn delete_comment(&self, session: &Session, post_id: i64, comment_id: i64) -> ApiResult<()> {
        let token = session.require_token("deleting a comment")?;
        self.send_json(
            Method::DELETE,
            &format!("/api/v1/posts/{}/comments/{}", post_id, comment_id),
            token,
            None,
        )
    }

    fn search_posts(
        &self,
        keyword: &str,
        search_type: SearchType,
    ) -> ApiResult<Vec<PostSummary>> {
        let url = self.url("/api/v1/posts/search");
        let builder = self
            .request(Method::GET, &url, None)
            .query(&[("keyword", keyword), ("searchType", search_type.as_str())]);
        let resp = self.execute(builder, &Method::GET, &url)?;
        let env: Envelope<Option<Page<PostSummary>>> = Self::decode(resp, &url)?;
        Ok(env.data.map(|p| p.content).unwrap_or_default())
    }
}

impl NotificationApi for ApiClient {
    fn fetch_notifications(
        &self,
        session: &Session,
        kind: NotificationKind,
    ) -> ApiResult<Vec<Notification>> {
        let token = session.require_token("reading notifications")?;
        self.get_json(&format!("/notifications/{}", kind.path_segment()), Some(token))
    }

    fn mark_notification_read(
        &self,
        session: &Session,
        kind: NotificationKind,
        notification_id: i64,
    ) -> ApiResult<()> {
        let token = session.require_token("marking a notification read")?;
        self.send_json(
            Method::PATCH,
            &format!(
                "/notifications/{}/{}/read",
                kind.path_segment(),
                notification_id
            ),
            token,
            Some(json!({})),
        )
    }
}

impl PortfolioApi for ApiClient {
    fn fetch_portfolios(&self, session: &Session) -> ApiResult<Vec<Portfolio>> {
        let env: Envelope<Option<Vec<Portfolio>>> =
            self.get_json("/api/v1/portfolios", session.token())?;
        Ok(env.data.unwrap_or_default())
    }

    fn create_portfolio(&self, session: &Session, draft: &PortfolioDraft) -> ApiResult<()> {
        let url = self.url("/api/v1/portfolios");
        let builder = self
            .request(Method::POST, &url, session.token())
            .json(draft);
        self.execute(builder, &Method::POST, &url)?;
        Ok(())
    }
}
