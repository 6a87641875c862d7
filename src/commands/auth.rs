// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::api::oauth_login_url;
use crate::db;
use crate::models::{OAuthProvider, User};
use crate::session::Session;
use crate::utils::{parse_id, pretty_table};

pub fn login(conn: &mut Connection, m: &clap::ArgMatches) -> Result<Session> {
    let token = m.get_one::<String>("token").unwrap();
    let user = match m.get_one::<String>("member-id") {
        Some(raw) => Some(User {
            id: parse_id(raw, "member id")?,
            name: m
                .get_one::<String>("name")
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
            profile: m
                .get_one::<String>("profile")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }),
        None => None,
    };
    let session = Session::new(token.as_str(), user);
    if !session.is_authenticated() {
        anyhow::bail!("Access token is empty");
    }
    db::save_session(conn, &session)?;
    match session.user() {
        Some(u) => println!("Signed in as {} (member {})", display_name(u), u.id),
        None => println!("Token stored; pass --member-id to enable live notifications"),
    }
    Ok(session)
}

pub fn login_url(base_url: &str, m: &clap::ArgMatches) -> Result<()> {
    let provider: OAuthProvider = m.get_one::<String>("provider").unwrap().parse()?;
    println!("{}", oauth_login_url(base_url, provider));
    Ok(())
}

pub fn logout(conn: &mut Connection) -> Result<()> {
    db::clear_session(conn)?;
    println!("Signed out");
    Ok(())
}

pub fn whoami(session: &Session) -> Result<()> {
    if !session.is_authenticated() {
        println!("Not signed in");
        return Ok(());
    }
    let rows = match session.user() {
        Some(u) => vec![vec![
            u.id.to_string(),
            display_name(u).to_string(),
            u.profile.clone().unwrap_or_default(),
        ]],
        None => vec![vec!["-".into(), "(token only)".into(), String::new()]],
    };
    println!("{}", pretty_table(&["Member", "Name", "Profile"], rows));
    Ok(())
}

/// The login dialog: one URL per OAuth provider.
pub fn print_login_prompt(base_url: &str) {
    println!("Sign in first. Open one of these in a browser, then run `stocknote login --token <TOKEN>`:");
    for provider in OAuthProvider::ALL {
        println!("  {:<7} {}", provider.as_str(), oauth_login_url(base_url, provider));
    }
}

fn display_name(u: &User) -> &str {
    if u.name.is_empty() { "User" } else { &u.name }
}
