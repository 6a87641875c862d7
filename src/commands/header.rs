// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::api::NotificationApi;
use crate::feed::Feed;
use crate::layout::{NAV_ITEMS, footer_line, header_line};
use crate::session::Session;
use crate::utils::pretty_table;

pub fn handle(api: &impl NotificationApi, session: &Session) -> Result<()> {
    let mut feed = Feed::new();
    if session.is_authenticated() {
        // The header still renders when history is unavailable.
        if let Err(e) = feed.load_history(api, session) {
            log::warn!("Header shown without notification counts: {}", e);
        }
    }

    println!("{}", header_line(session, feed.state()));
    let rows = NAV_ITEMS
        .iter()
        .map(|item| vec![item.label.to_string(), item.href.to_string()])
        .collect();
    println!("{}", pretty_table(&["Menu", "Route"], rows));
    println!("{}", footer_line());
    Ok(())
}
