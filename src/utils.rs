// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;
use std::time::Duration;

const UA: &str = concat!(
    "stocknote/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/stocknote)"
);

pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(UA)
        .build()
}

/// Client for long-lived event streams: connect timeout only, the body may
/// stay open indefinitely.
pub fn stream_client(connect_timeout: Duration) -> reqwest::Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(None)
        .connect_timeout(connect_timeout)
        .user_agent(UA)
        .build()
}

pub fn parse_id(s: &str, what: &str) -> Result<i64> {
    s.trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid {} '{}', expected an integer id", what, s))
}

/// Accepts RFC 3339 timestamps and the zone-less ISO form the API emits.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

pub fn fmt_timestamp(s: &str) -> String {
    match parse_timestamp(s) {
        Some(ts) => ts.format("%Y-%m-%d %H:%M").to_string(),
        None => s.to_string(),
    }
}

/// Whole-unit amount with thousands separators, e.g. `-1,234,500`.
pub fn fmt_amount(d: &Decimal) -> String {
    let rounded = d.round_dp(0);
    let digits = rounded.abs().trunc().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.insert(0, '-');
    }
    out
}

/// Like `fmt_amount` but always carries a sign for non-negative values.
pub fn fmt_signed_amount(d: &Decimal) -> String {
    if d.is_sign_negative() && !d.round_dp(0).is_zero() {
        fmt_amount(d)
    } else {
        format!("+{}", fmt_amount(d))
    }
}

pub fn truncate(s: &str, max_chars: usize) -> String {
    let flat = s.replace(['\n', '\r'], " ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut out: String = flat.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // Arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
