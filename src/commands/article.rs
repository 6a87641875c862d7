// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use serde_json::json;
use std::io::{self, BufRead, Write};

use crate::api::CommunityApi;
use crate::article::{ArticleView, Outcome};
use crate::commands::auth::print_login_prompt;
use crate::models::{Post, SearchType};
use crate::session::Session;
use crate::utils::{fmt_timestamp, maybe_print_json, parse_id, pretty_table, truncate};

pub fn handle(
    api: &impl CommunityApi,
    base_url: &str,
    session: &Session,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(api, session, sub)?,
        Some(("like", sub)) => {
            let mut view = load_view(api, session, sub)?;
            let outcome = view.toggle_like(api, session).context("Could not toggle like")?;
            report(outcome, base_url, || {
                let count = view.post().map(|p| p.like_count).unwrap_or_default();
                if view.is_liked() {
                    println!("Liked post {} ({} likes)", view.post_id(), count);
                } else {
                    println!("Unliked post {} ({} likes)", view.post_id(), count);
                }
            });
        }
        Some(("comment", sub)) => comment(api, base_url, session, sub)?,
        Some(("delete", sub)) => {
            let mut view = load_view(api, session, sub)?;
            let skip_prompt = sub.get_flag("yes");
            let outcome = view
                .delete_post(api, session, |post| skip_prompt || confirm_delete(post))
                .context("Could not delete the post")?;
            let post_id = view.post_id();
            match outcome {
                Outcome::Cancelled => println!("Kept post {}", post_id),
                other => report(other, base_url, || println!("Deleted post {}", post_id)),
            }
        }
        Some(("search", sub)) => search(api, sub)?,
        _ => {}
    }
    Ok(())
}

fn load_view(
    api: &impl CommunityApi,
    session: &Session,
    sub: &clap::ArgMatches,
) -> Result<ArticleView> {
    let post_id = parse_id(sub.get_one::<String>("id").unwrap(), "post id")?;
    let mut view = ArticleView::new(post_id);
    view.load(api, session)
        .with_context(|| format!("Could not load post {}", post_id))?;
    Ok(view)
}

fn report(outcome: Outcome, base_url: &str, on_done: impl FnOnce()) {
    match outcome {
        Outcome::Done => on_done(),
        Outcome::LoginRequired => print_login_prompt(base_url),
        Outcome::Cancelled => {}
    }
}

fn show(api: &impl CommunityApi, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let view = load_view(api, session, sub)?;
    if let Some(post) = view.post() {
        let v = json!({ "post": post, "isLiked": view.is_liked() });
        if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &v)? {
            return Ok(());
        }
    }
    print_article(&view, session);
    Ok(())
}

pub fn print_article(view: &ArticleView, session: &Session) {
    let Some(post) = view.post() else {
        println!("Post {} is not loaded", view.post_id());
        return;
    };
    println!("{}", post.title);
    println!(
        "by {}  ·  {}{}",
        post.username,
        fmt_timestamp(&post.created_at),
        if view.is_own_post(session) { "  (yours)" } else { "" }
    );
    println!();
    println!("{}", post.body);
    println!();
    if !post.hashtags.is_empty() {
        let tags: Vec<String> = post.hashtags.iter().map(|t| format!("#{}", t)).collect();
        println!("{}", tags.join(" "));
    }
    println!(
        "{} {}",
        if view.is_liked() { "♥" } else { "♡" },
        post.like_count
    );
    println!("Comments ({})", post.comments.len());
    if post.comments.is_empty() {
        return;
    }
    let rows = post
        .comments
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.author.clone(),
                truncate(&c.body, 70),
                fmt_timestamp(&c.created_at),
                if ArticleView::is_own_comment(session, c) {
                    "yes".into()
                } else {
                    String::new()
                },
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Id", "Author", "Comment", "Created", "Mine"], rows)
    );
}

fn comment(
    api: &impl CommunityApi,
    base_url: &str,
    session: &Session,
    m: &clap::ArgMatches,
) -> Result<()> {
    let Some((action, sub)) = m.subcommand() else {
        return Ok(());
    };
    let post_id = parse_id(sub.get_one::<String>("id").unwrap(), "post id")?;
    let mut view = ArticleView::new(post_id);
    let outcome = match action {
        "add" => {
            let body = sub.get_one::<String>("body").unwrap();
            view.add_comment(api, session, body)
                .context("Could not add the comment")?
        }
        "edit" => {
            let comment_id = parse_id(sub.get_one::<String>("comment").unwrap(), "comment id")?;
            let body = sub.get_one::<String>("body").unwrap();
            view.edit_comment(api, session, comment_id, body)
                .context("Could not edit the comment")?
        }
        "rm" => {
            let comment_id = parse_id(sub.get_one::<String>("comment").unwrap(), "comment id")?;
            view.delete_comment(api, session, comment_id)
                .context("Could not delete the comment")?
        }
        _ => return Ok(()),
    };
    report(outcome, base_url, || print_article(&view, session));
    Ok(())
}

fn search(api: &impl CommunityApi, sub: &clap::ArgMatches) -> Result<()> {
    let keyword = sub.get_one::<String>("keyword").unwrap();
    let search_type: SearchType = sub.get_one::<String>("type").unwrap().parse()?;
    // Search is embedded in the article page; no post needs to be open.
    let mut view = ArticleView::new(0);
    view.search(api, keyword, search_type)
        .with_context(|| format!("Search for '{}' failed", keyword.trim()))?;
    let results = &view.search_view().results;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), results)? {
        return Ok(());
    }
    if !view.search_view().active {
        println!("Empty keyword; search cleared.");
        return Ok(());
    }
    if results.is_empty() {
        println!("No posts match '{}'", keyword.trim());
        return Ok(());
    }
    let rows = results
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                truncate(&p.title, 50),
                p.username.clone(),
                p.like_count.to_string(),
                fmt_timestamp(&p.created_at),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Id", "Title", "Author", "Likes", "Created"], rows)
    );
    Ok(())
}

fn confirm_delete(post: Option<&Post>) -> bool {
    let title = post.map(|p| p.title.as_str()).unwrap_or("this post");
    print!("Delete '{}'? [y/N] ", title);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
