// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::feed::NotificationFeed;
use crate::models::NotificationKind;
use crate::session::Session;

pub const PRODUCT_NAME: &str = "Stock Note";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub href: &'static str,
}

pub const NAV_ITEMS: [NavItem; 3] = [
    NavItem {
        label: "Portfolio",
        href: "/portfolio",
    },
    NavItem {
        label: "Watchlist",
        href: "/stocks",
    },
    NavItem {
        label: "Community",
        href: "/community/articles",
    },
];

pub const FOOTER_LINKS: [&str; 4] = [
    "Privacy Policy",
    "Terms & Conditions",
    "Cookie Policy",
    "Contact",
];

/// Route of a single community article.
pub fn article_route(post_id: i64) -> String {
    format!("/community/article/{}", post_id)
}

/// Bell badge text; hidden when nothing is unread.
pub fn unread_badge(unread: usize) -> Option<String> {
    (unread > 0).then(|| format!("🔔 {}", unread))
}

pub fn header_line(session: &Session, feed: &NotificationFeed) -> String {
    let mut line = String::from(PRODUCT_NAME);
    line.push_str("  |  ");
    let nav: Vec<&str> = NAV_ITEMS.iter().map(|i| i.label).collect();
    line.push_str(&nav.join("  "));
    line.push_str("  |  ");
    if !session.is_authenticated() {
        line.push_str("Log in");
        return line;
    }
    let name = session
        .user()
        .map(|u| u.name.as_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("User");
    line.push_str(name);
    if let Some(badge) = unread_badge(feed.unread_count()) {
        line.push_str("  ");
        line.push_str(&badge);
    }
    line
}

/// Per-tab unread counts, as shown on the notification panel tabs.
pub fn tab_labels(feed: &NotificationFeed) -> Vec<String> {
    NotificationKind::ALL
        .into_iter()
        .map(|kind| match feed.unread_count_for(kind) {
            0 => kind.label().to_string(),
            n => format!("{} ({})", kind.label(), n),
        })
        .collect()
}

pub fn footer_line() -> String {
    format!(
        "{}  |  © {}. All rights reserved.",
        FOOTER_LINKS.join("  ·  "),
        PRODUCT_NAME
    )
}
