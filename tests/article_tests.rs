// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;

use stocknote::api::CommunityApi;
use stocknote::article::{ArticleView, Outcome};
use stocknote::error::{ApiError, ApiResult};
use stocknote::models::{Comment, LoadState, Post, PostSummary, SearchType, User};
use stocknote::session::Session;

/// In-memory community backend that records every call it receives.
#[derive(Default)]
struct FakeCommunity {
    likes: Cell<i64>,
    liked: Cell<bool>,
    comments: RefCell<Vec<Comment>>,
    calls: RefCell<Vec<String>>,
    fail_search: bool,
    fail_like: bool,
    fail_check: bool,
}

impl FakeCommunity {
    fn record(&self, call: &str) {
        self.calls.borrow_mut().push(call.to_string());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn mutations(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| !matches!(c.as_str(), "fetch_post" | "check_like" | "search"))
            .count()
    }

    fn server_error(status: u16) -> ApiError {
        ApiError::Status {
            method: "POST".into(),
            url: "http://localhost:8090/api/v1/posts/1".into(),
            status,
        }
    }
}

impl CommunityApi for FakeCommunity {
    fn fetch_post(&self, post_id: i64) -> ApiResult<Post> {
        self.record("fetch_post");
        Ok(Post {
            id: post_id,
            title: "Chip stocks after earnings".into(),
            body: "Thoughts?".into(),
            hashtags: BTreeSet::from(["semis".to_string()]),
            author_id: Some(1),
            username: "author".into(),
            profile: None,
            created_at: "2025-04-02T08:30:00".into(),
            like_count: self.likes.get(),
            comments: self.comments.borrow().clone(),
        })
    }

    fn check_like(&self, session: &Session, _post_id: i64) -> ApiResult<bool> {
        session.require_token("checking like status")?;
        self.record("check_like");
        if self.fail_check {
            return Err(Self::server_error(401));
        }
        Ok(self.liked.get())
    }

    fn like_post(&self, session: &Session, _post_id: i64) -> ApiResult<()> {
        session.require_token("liking a post")?;
        self.record("like");
        if self.fail_like {
            return Err(Self::server_error(500));
        }
        self.liked.set(true);
        self.likes.set(self.likes.get() + 1);
        Ok(())
    }

    fn unlike_post(&self, session: &Session, _post_id: i64) -> ApiResult<()> {
        session.require_token("unliking a post")?;
        self.record("unlike");
        self.liked.set(false);
        self.likes.set(self.likes.get() - 1);
        Ok(())
    }

    fn delete_post(&self, session: &Session, _post_id: i64) -> ApiResult<()> {
        session.require_token("deleting a post")?;
        self.record("delete_post");
        Ok(())
    }

    fn create_comment(&self, session: &Session, _post_id: i64, body: &str) -> ApiResult<()> {
        session.require_token("commenting")?;
        self.record("create_comment");
        let mut comments = self.comments.borrow_mut();
        let id = comments.len() as i64 + 1;
        comments.push(Comment {
            id,
            author_id: session.member_id(),
            author: "me".into(),
            body: body.to_string(),
            profile: None,
            created_at: "2025-04-02T09:00:00".into(),
        });
        Ok(())
    }

    fn edit_comment(
        &self,
        session: &Session,
        _post_id: i64,
        comment_id: i64,
        body: &str,
    ) -> ApiResult<()> {
        session.require_token("editing a comment")?;
        self.record("edit_comment");
        let mut comments = self.comments.borrow_mut();
        match comments.iter_mut().find(|c| c.id == comment_id) {
            Some(c) => {
                c.body = body.to_string();
                Ok(())
            }
            None => Err(Self::server_error(404)),
        }
    }

    fn delete_comment(&self, session: &Session, _post_id: i64, comment_id: i64) -> ApiResult<()> {
        session.require_token("deleting a comment")?;
        self.record("delete_comment");
        self.comments.borrow_mut().retain(|c| c.id != comment_id);
        Ok(())
    }

    fn search_posts(
        &self,
        keyword: &str,
        search_type: SearchType,
    ) -> ApiResult<Vec<PostSummary>> {
        self.record("search");
        if self.fail_search {
            return Err(Self::server_error(503));
        }
        Ok(vec![PostSummary {
            id: 33,
            title: format!("{} ({})", keyword, search_type.as_str()),
            username: "someone".into(),
            created_at: "2025-04-01T00:00:00".into(),
            like_count: 2,
            hashtags: BTreeSet::new(),
        }])
    }
}

fn signed_in(id: i64) -> Session {
    Session::new(
        "tok",
        Some(User {
            id,
            name: "reader".into(),
            profile: None,
        }),
    )
}

#[test]
fn load_fetches_post_and_like_status_when_signed_in() {
    let api = FakeCommunity::default();
    api.liked.set(true);
    let mut view = ArticleView::new(1);
    view.load(&api, &signed_in(2)).unwrap();
    assert_eq!(view.state(), LoadState::Loaded);
    assert!(view.is_liked());
    assert_eq!(api.calls(), vec!["fetch_post", "check_like"]);
}

#[test]
fn rejected_like_check_still_shows_the_post() {
    let api = FakeCommunity {
        fail_check: true,
        ..Default::default()
    };
    api.liked.set(true);
    let mut view = ArticleView::new(1);
    view.load(&api, &signed_in(2)).unwrap();
    assert_eq!(view.state(), LoadState::Loaded);
    assert_eq!(view.post().unwrap().title, "Chip stocks after earnings");
    assert!(!view.is_liked());
    assert_eq!(api.calls(), vec!["fetch_post", "check_like"]);
}

#[test]
fn anonymous_load_skips_like_check() {
    let api = FakeCommunity::default();
    let mut view = ArticleView::new(1);
    view.load(&api, &Session::anonymous()).unwrap();
    assert!(!view.is_liked());
    assert_eq!(api.calls(), vec!["fetch_post"]);
}

#[test]
fn toggling_like_twice_returns_to_start() {
    let api = FakeCommunity::default();
    let session = signed_in(2);
    let mut view = ArticleView::new(1);
    view.load(&api, &session).unwrap();

    assert_eq!(view.toggle_like(&api, &session).unwrap(), Outcome::Done);
    assert!(view.is_liked());
    assert_eq!(view.post().unwrap().like_count, 1);

    assert_eq!(view.toggle_like(&api, &session).unwrap(), Outcome::Done);
    assert!(!view.is_liked());
    assert_eq!(view.post().unwrap().like_count, 0);
    assert_eq!(api.calls().iter().filter(|c| *c == "fetch_post").count(), 3);
}

#[test]
fn rejected_like_keeps_flag() {
    let api = FakeCommunity {
        fail_like: true,
        ..Default::default()
    };
    let session = signed_in(2);
    let mut view = ArticleView::new(1);
    view.load(&api, &session).unwrap();
    assert!(view.toggle_like(&api, &session).is_err());
    assert!(!view.is_liked());
}

#[test]
fn anonymous_actions_send_nothing_and_ask_for_login() {
    let api = FakeCommunity::default();
    let anon = Session::anonymous();
    let mut view = ArticleView::new(1);
    view.load(&api, &anon).unwrap();

    assert_eq!(
        view.add_comment(&api, &anon, "hello").unwrap(),
        Outcome::LoginRequired
    );
    assert_eq!(view.toggle_like(&api, &anon).unwrap(), Outcome::LoginRequired);
    assert_eq!(
        view.delete_comment(&api, &anon, 1).unwrap(),
        Outcome::LoginRequired
    );
    assert_eq!(
        view.delete_post(&api, &anon, |_| true).unwrap(),
        Outcome::LoginRequired
    );
    assert_eq!(api.mutations(), 0);
}

#[test]
fn comment_lifecycle_refetches_the_post() {
    let api = FakeCommunity::default();
    let session = signed_in(2);
    let mut view = ArticleView::new(1);

    view.add_comment(&api, &session, "first!").unwrap();
    let post = view.post().unwrap();
    assert_eq!(post.comments.len(), 1);
    let comment = post.comments[0].clone();
    assert!(ArticleView::is_own_comment(&session, &comment));
    assert!(!ArticleView::is_own_comment(&signed_in(3), &comment));

    view.edit_comment(&api, &session, comment.id, "edited")
        .unwrap();
    assert_eq!(view.post().unwrap().comments[0].body, "edited");

    view.delete_comment(&api, &session, comment.id).unwrap();
    assert!(view.post().unwrap().comments.is_empty());
}

#[test]
fn declined_confirmation_sends_no_delete() {
    let api = FakeCommunity::default();
    let session = signed_in(1);
    let mut view = ArticleView::new(1);
    view.load(&api, &session).unwrap();
    assert!(view.is_own_post(&session));

    let mut asked_about = None;
    let outcome = view
        .delete_post(&api, &session, |post| {
            asked_about = post.map(|p| p.title.clone());
            false
        })
        .unwrap();
    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(asked_about.as_deref(), Some("Chip stocks after earnings"));
    assert!(!api.calls().contains(&"delete_post".to_string()));
    assert!(view.post().is_some());
}

#[test]
fn confirmed_delete_clears_the_page() {
    let api = FakeCommunity::default();
    let session = signed_in(1);
    let mut view = ArticleView::new(1);
    view.load(&api, &session).unwrap();
    assert_eq!(
        view.delete_post(&api, &session, |_| true).unwrap(),
        Outcome::Done
    );
    assert!(view.post().is_none());
    assert_eq!(view.state(), LoadState::Idle);
}

#[test]
fn blank_search_closes_without_request() {
    let api = FakeCommunity::default();
    let mut view = ArticleView::new(1);
    view.search(&api, "nvda", SearchType::Title).unwrap();
    assert!(view.search_view().active);
    assert_eq!(view.search_view().results.len(), 1);
    assert_eq!(view.search_view().results[0].title, "nvda (TITLE)");

    view.search(&api, "   ", SearchType::All).unwrap();
    assert!(!view.search_view().active);
    assert!(view.search_view().results.is_empty());
    assert_eq!(api.calls(), vec!["search"]);
}

#[test]
fn failed_search_stays_open_with_no_results() {
    let api = FakeCommunity {
        fail_search: true,
        ..Default::default()
    };
    let mut view = ArticleView::new(1);
    assert!(view.search(&api, "tsla", SearchType::All).is_err());
    assert!(view.search_view().active);
    assert_eq!(view.search_view().keyword, "tsla");
    assert!(view.search_view().results.is_empty());
}

#[test]
fn opening_a_result_switches_post_and_leaves_search() {
    let api = FakeCommunity::default();
    let mut view = ArticleView::new(1);
    view.load(&api, &Session::anonymous()).unwrap();
    view.search(&api, "nvda", SearchType::All).unwrap();

    view.open_search_result(33);
    assert_eq!(view.post_id(), 33);
    assert!(view.post().is_none());
    assert!(!view.search_view().active);
}
