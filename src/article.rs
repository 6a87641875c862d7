// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::CommunityApi;
use crate::error::ApiResult;
use crate::models::{Comment, LoadState, Post, PostSummary, SearchType};
use crate::session::Session;

/// Result of a user action that may need a login or a confirmation first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// No request was sent; the user must sign in (show the login prompt).
    LoginRequired,
    /// The user declined the confirmation prompt.
    Cancelled,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchView {
    pub active: bool,
    pub keyword: String,
    pub search_type: SearchType,
    pub results: Vec<PostSummary>,
}

/// State behind the article page: the post with its comments, the viewer's
/// like flag, and the embedded search results.
#[derive(Debug, Clone)]
pub struct ArticleView {
    post_id: i64,
    post: Option<Post>,
    is_liked: bool,
    state: LoadState,
    search: SearchView,
}

impl ArticleView {
    pub fn new(post_id: i64) -> Self {
        Self {
            post_id,
            post: None,
            is_liked: false,
            state: LoadState::Idle,
            search: SearchView::default(),
        }
    }

    pub fn post_id(&self) -> i64 {
        self.post_id
    }

    pub fn post(&self) -> Option<&Post> {
        self.post.as_ref()
    }

    pub fn is_liked(&self) -> bool {
        self.is_liked
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn search_view(&self) -> &SearchView {
        &self.search
    }

    /// Switches to another post, dropping everything loaded for the old one.
    pub fn set_post_id(&mut self, post_id: i64) {
        if post_id == self.post_id {
            return;
        }
        self.post_id = post_id;
        self.post = None;
        self.is_liked = false;
        self.state = LoadState::Idle;
    }

    /// Fetches the post, then the viewer's like status when signed in. A
    /// failed like check is logged and shows the post as not liked.
    pub fn load(&mut self, api: &impl CommunityApi, session: &Session) -> ApiResult<()> {
        self.refetch(api)?;
        self.is_liked = false;
        if session.is_authenticated() {
            match api.check_like(session, self.post_id) {
                Ok(liked) => self.is_liked = liked,
                Err(e) => {
                    log::error!("Failed to check like status of post {}: {}", self.post_id, e);
                }
            }
        }
        Ok(())
    }

    fn refetch(&mut self, api: &impl CommunityApi) -> ApiResult<()> {
        self.state = LoadState::Loading;
        match api.fetch_post(self.post_id) {
            Ok(post) => {
                self.post = Some(post);
                self.state = LoadState::Loaded;
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load post {}: {}", self.post_id, e);
                self.state = LoadState::Failed;
                Err(e)
            }
        }
    }

    /// Likes or unlikes depending on the current flag. The flag flips once the
    /// server accepts the request; the post is then re-fetched for its count.
    pub fn toggle_like(&mut self, api: &impl CommunityApi, session: &Session) -> ApiResult<Outcome> {
        if !session.is_authenticated() {
            return Ok(Outcome::LoginRequired);
        }
        let sent = if self.is_liked {
            api.unlike_post(session, self.post_id)
        } else {
            api.like_post(session, self.post_id)
        };
        if let Err(e) = sent {
            log::error!("Failed to toggle like on post {}: {}", self.post_id, e);
            return Err(e);
        }
        self.is_liked = !self.is_liked;
        self.refetch(api)?;
        Ok(Outcome::Done)
    }

    pub fn add_comment(
        &mut self,
        api: &impl CommunityApi,
        session: &Session,
        body: &str,
    ) -> ApiResult<Outcome> {
        if !session.is_authenticated() {
            return Ok(Outcome::LoginRequired);
        }
        if let Err(e) = api.create_comment(session, self.post_id, body) {
            log::error!("Failed to add comment to post {}: {}", self.post_id, e);
            return Err(e);
        }
        self.refetch(api)?;
        Ok(Outcome::Done)
    }

    pub fn edit_comment(
        &mut self,
        api: &impl CommunityApi,
        session: &Session,
        comment_id: i64,
        body: &str,
    ) -> ApiResult<Outcome> {
        if !session.is_authenticated() {
            return Ok(Outcome::LoginRequired);
        }
        if let Err(e) = api.edit_comment(session, self.post_id, comment_id, body) {
            log::error!("Failed to edit comment {}: {}", comment_id, e);
            return Err(e);
        }
        self.refetch(api)?;
        Ok(Outcome::Done)
    }

    pub fn delete_comment(
        &mut self,
        api: &impl CommunityApi,
        session: &Session,
        comment_id: i64,
    ) -> ApiResult<Outcome> {
        if !session.is_authenticated() {
            return Ok(Outcome::LoginRequired);
        }
        if let Err(e) = api.delete_comment(session, self.post_id, comment_id) {
            log::error!("Failed to delete comment {}: {}", comment_id, e);
            return Err(e);
        }
        self.refetch(api)?;
        Ok(Outcome::Done)
    }

    /// Deletes the post once `confirm` agrees. Nothing is sent when it
    /// declines.
    pub fn delete_post<F>(
        &mut self,
        api: &impl CommunityApi,
        session: &Session,
        confirm: F,
    ) -> ApiResult<Outcome>
    where
        F: FnOnce(Option<&Post>) -> bool,
    {
        if !session.is_authenticated() {
            return Ok(Outcome::LoginRequired);
        }
        if !confirm(self.post.as_ref()) {
            return Ok(Outcome::Cancelled);
        }
        if let Err(e) = api.delete_post(session, self.post_id) {
            log::error!("Failed to delete post {}: {}", self.post_id, e);
            return Err(e);
        }
        self.post = None;
        self.is_liked = false;
        self.state = LoadState::Idle;
        Ok(Outcome::Done)
    }

    /// Runs a search. A blank keyword leaves search mode without a request;
    /// a failed search keeps search mode open with no results.
    pub fn search(
        &mut self,
        api: &impl CommunityApi,
        keyword: &str,
        search_type: SearchType,
    ) -> ApiResult<()> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            self.close_search();
            return Ok(());
        }
        self.search.active = true;
        self.search.keyword = keyword.to_string();
        self.search.search_type = search_type;
        match api.search_posts(keyword, search_type) {
            Ok(results) => {
                self.search.results = results;
                Ok(())
            }
            Err(e) => {
                log::error!("Search for '{}' failed: {}", keyword, e);
                self.search.results.clear();
                Err(e)
            }
        }
    }

    pub fn close_search(&mut self) {
        self.search = SearchView::default();
    }

    /// Opens a search hit: switches post and leaves search mode.
    pub fn open_search_result(&mut self, post_id: i64) {
        self.set_post_id(post_id);
        self.close_search();
    }

    pub fn is_own_post(&self, session: &Session) -> bool {
        self.post
            .as_ref()
            .is_some_and(|p| session.is_author(p.author_id))
    }

    pub fn is_own_comment(session: &Session, comment: &Comment) -> bool {
        session.is_author(comment.author_id)
    }
}
