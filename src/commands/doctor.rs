// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::Config;
use crate::session::Session;
use crate::utils::pretty_table;
use anyhow::Result;
use std::path::Path;

pub fn diagnose(config: &Config, session: &Session, db_path: Option<&Path>) -> Vec<Vec<String>> {
    let mut rows = Vec::new();

    // 1) API endpoint
    if !(config.base_url.starts_with("http://") || config.base_url.starts_with("https://")) {
        rows.push(vec!["base_url_scheme".into(), config.base_url.clone()]);
    }

    // 2) Session completeness
    if !session.is_authenticated() {
        rows.push(vec![
            "no_access_token".into(),
            "run `stocknote login --token <TOKEN>`".into(),
        ]);
    } else if session.member_id().is_none() {
        rows.push(vec![
            "no_member_id".into(),
            "live notifications are disabled".into(),
        ]);
    }

    // 3) Local store; it is created on startup, so only a missing data dir
    // is worth reporting.
    if db_path.is_none() {
        rows.push(vec!["store_path".into(), "no home directory".into()]);
    }

    rows
}

pub fn handle(config: &Config, session: &Session, db_path: Option<&Path>) -> Result<()> {
    let rows = diagnose(config, session, db_path);
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
