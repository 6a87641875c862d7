// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use std::time::{Duration, Instant};

use crate::api::{CommunityApi, NotificationApi};
use crate::article::ArticleView;
use crate::commands::article::print_article;
use crate::config::Config;
use crate::feed::Feed;
use crate::layout::{article_route, tab_labels, unread_badge};
use crate::models::{Notification, NotificationKind};
use crate::session::Session;
use crate::sse::FeedEvent;
use crate::utils::{fmt_timestamp, maybe_print_json, parse_id, pretty_table, truncate};

const WATCH_TICK: Duration = Duration::from_millis(500);

pub fn handle<A>(api: &A, config: &Config, session: &Session, m: &clap::ArgMatches) -> Result<()>
where
    A: NotificationApi + CommunityApi,
{
    match m.subcommand() {
        Some(("list", sub)) => list(api, session, sub)?,
        Some(("read", sub)) => read(api, session, sub)?,
        Some(("watch", sub)) => watch(api, config, session, sub)?,
        _ => {}
    }
    Ok(())
}

fn kinds_for(sub: &clap::ArgMatches) -> Result<Vec<NotificationKind>> {
    match sub.get_one::<String>("kind") {
        Some(raw) => Ok(vec![raw.parse()?]),
        None => Ok(NotificationKind::ALL.to_vec()),
    }
}

/// Rows shown in the notification panel. Unread only unless `include_read`.
pub fn collect_rows<'a>(
    feed: &'a Feed,
    kinds: &[NotificationKind],
    include_read: bool,
) -> Vec<(NotificationKind, &'a Notification)> {
    let mut out = Vec::new();
    for &kind in kinds {
        if include_read {
            out.extend(feed.state().entries(kind).iter().map(|n| (kind, n)));
        } else {
            out.extend(feed.state().unread(kind).into_iter().map(|n| (kind, n)));
        }
    }
    out
}

fn list<A: NotificationApi>(api: &A, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let kinds = kinds_for(sub)?;
    let mut feed = Feed::new();
    feed.load_history(api, session)
        .context("Could not load notifications")?;

    let rows = collect_rows(&feed, &kinds, sub.get_flag("all"));
    let json_rows: Vec<serde_json::Value> = rows
        .iter()
        .map(|(kind, n)| {
            let mut v = serde_json::to_value(n).unwrap_or_default();
            if let Some(obj) = v.as_object_mut() {
                obj.insert("kind".into(), serde_json::json!(kind));
            }
            v
        })
        .collect();
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &json_rows)? {
        return Ok(());
    }

    if rows.is_empty() {
        println!("No new notifications.");
        return Ok(());
    }
    let table_rows = rows
        .into_iter()
        .map(|(kind, n)| {
            vec![
                kind.label().to_string(),
                n.id.to_string(),
                truncate(&n.content, 60),
                fmt_timestamp(&n.created_at),
                n.post_id.map(|p| p.to_string()).unwrap_or_default(),
                if n.is_read { "yes".into() } else { "".into() },
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Kind", "Id", "Content", "Created", "Post", "Read"], table_rows)
    );
    println!("{}", tab_labels(feed.state()).join("  "));
    Ok(())
}

fn read<A>(api: &A, session: &Session, sub: &clap::ArgMatches) -> Result<()>
where
    A: NotificationApi + CommunityApi,
{
    let kind: NotificationKind = sub.get_one::<String>("kind").unwrap().parse()?;
    let id = parse_id(sub.get_one::<String>("id").unwrap(), "notification id")?;

    let mut feed = Feed::new();
    if let Err(e) = feed.load_history(api, session) {
        log::warn!("Continuing without notification history: {}", e);
    }
    let target = feed
        .mark_read(api, session, kind, id)
        .with_context(|| format!("Could not mark {} notification {} read", kind, id))?;
    println!("Marked {} notification {} read", kind, id);

    if let Some(post_id) = target {
        println!("Opening {}", article_route(post_id));
        let mut view = ArticleView::new(post_id);
        view.load(api, session)
            .with_context(|| format!("Could not load post {}", post_id))?;
        print_article(&view, session);
    }
    Ok(())
}

fn watch<A: NotificationApi>(
    api: &A,
    config: &Config,
    session: &Session,
    sub: &clap::ArgMatches,
) -> Result<()> {
    if session.member_id().is_none() {
        return Err(anyhow!(
            "Live notifications need a member id; run `stocknote login --token <T> --member-id <ID>`"
        ));
    }
    let deadline = sub
        .get_one::<u64>("seconds")
        .map(|s| Instant::now() + Duration::from_secs(*s));

    let mut feed = Feed::new();
    feed.attach(config, session)
        .context("Could not open notification streams")?;
    if let Err(e) = feed.load_history(api, session) {
        log::warn!("Notification history unavailable: {}", e);
    }
    print_unread(&feed);

    loop {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }
        let Some(event) = feed.next_event(WATCH_TICK) else {
            continue;
        };
        match event {
            FeedEvent::Connected(kind) => println!("[{}] connected", kind),
            FeedEvent::Disconnected { kind, reason } => {
                println!("[{}] disconnected: {}", kind, reason)
            }
            FeedEvent::Notification(kind, n) => {
                println!(
                    "[{}] #{} {} ({})",
                    kind,
                    n.id,
                    truncate(&n.content, 80),
                    fmt_timestamp(&n.created_at)
                );
                print_unread(&feed);
            }
        }
    }
    feed.detach();
    Ok(())
}

fn print_unread(feed: &Feed) {
    match unread_badge(feed.state().unread_count()) {
        Some(badge) => println!("{}  {}", badge, tab_labels(feed.state()).join("  ")),
        None => println!("No unread notifications"),
    }
}
