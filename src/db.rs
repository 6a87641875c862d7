// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};
use std::fs;
use std::path::PathBuf;

use crate::models::User;
use crate::session::Session;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("dev", "StockNote", "stocknote"));

const KEY_ACCESS_TOKEN: &str = "access_token";
const KEY_MEMBER_ID: &str = "member_id";
const KEY_MEMBER_NAME: &str = "member_name";
const KEY_MEMBER_PROFILE: &str = "member_profile";

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("stocknote.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
    "#,
    )?;
    Ok(())
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

/// Restores the persisted session. Missing token means anonymous; a stored
/// member id without a token is ignored. An unreadable member id keeps the
/// token but drops the identity, so `login` can still repair it.
pub fn load_session(conn: &Connection) -> Result<Session> {
    let Some(token) = get_setting(conn, KEY_ACCESS_TOKEN)? else {
        return Ok(Session::anonymous());
    };
    let id = match get_setting(conn, KEY_MEMBER_ID)? {
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(id) => Some(id),
            Err(e) => {
                log::warn!("Ignoring invalid stored member id '{}': {}", raw, e);
                None
            }
        },
        None => None,
    };
    let user = match id {
        Some(id) => Some(User {
            id,
            name: get_setting(conn, KEY_MEMBER_NAME)?.unwrap_or_default(),
            profile: get_setting(conn, KEY_MEMBER_PROFILE)?,
        }),
        None => None,
    };
    Ok(Session::new(token, user))
}

pub fn save_session(conn: &mut Connection, session: &Session) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute(
        "DELETE FROM settings WHERE key IN (?1, ?2, ?3, ?4)",
        params![
            KEY_ACCESS_TOKEN,
            KEY_MEMBER_ID,
            KEY_MEMBER_NAME,
            KEY_MEMBER_PROFILE
        ],
    )?;
    if let Some(token) = session.token() {
        set_setting(&tx, KEY_ACCESS_TOKEN, token)?;
    }
    if let Some(user) = session.user() {
        set_setting(&tx, KEY_MEMBER_ID, &user.id.to_string())?;
        set_setting(&tx, KEY_MEMBER_NAME, &user.name)?;
        if let Some(profile) = &user.profile {
            set_setting(&tx, KEY_MEMBER_PROFILE, profile)?;
        }
    }
    tx.commit()?;
    Ok(())
}

pub fn clear_session(conn: &mut Connection) -> Result<()> {
    save_session(conn, &Session::anonymous())
}
