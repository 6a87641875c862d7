// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use serde_json::json;

use crate::api::PortfolioApi;
use crate::portfolio::PortfolioView;
use crate::session::Session;
use crate::utils::{fmt_amount, fmt_signed_amount, maybe_print_json, pretty_table};

pub fn handle(api: &impl PortfolioApi, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(api, session, sub)?,
        Some(("add", sub)) => add(api, session, sub)?,
        _ => {}
    }
    Ok(())
}

fn list(api: &impl PortfolioApi, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let mut view = PortfolioView::new();
    view.refresh(api, session)
        .context("Could not load portfolios")?;

    let v = json!({ "portfolios": view.portfolios(), "totals": view.totals() });
    if maybe_print_json(sub.get_flag("json"), false, &v)? {
        return Ok(());
    }
    if maybe_print_json(false, sub.get_flag("jsonl"), &view.portfolios())? {
        return Ok(());
    }

    print_summary(&view);
    Ok(())
}

pub fn print_summary(view: &PortfolioView) {
    let totals = view.totals();
    println!("Total assets: {}", fmt_amount(&totals.total_assets));
    println!("Total profit: {}", fmt_signed_amount(&totals.total_profits));
    if view.portfolios().is_empty() {
        println!("No portfolios yet. Add one with `stocknote portfolio add --name <NAME>`.");
        return;
    }
    let rows = view
        .portfolios()
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.name.clone(),
                p.description.clone(),
                fmt_amount(&p.asset()),
                fmt_signed_amount(&p.profit()),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Id", "Name", "Description", "Asset", "Profit"], rows)
    );
}

fn add(api: &impl PortfolioApi, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub
        .get_one::<String>("name")
        .map(|s| s.trim().to_string())
        .unwrap();
    if name.is_empty() {
        anyhow::bail!("Portfolio name must not be empty");
    }
    let description = sub
        .get_one::<String>("description")
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let mut view = PortfolioView::new();
    view.open_modal();
    view.set_draft_name(&name);
    view.set_draft_description(&description);
    view.submit(api, session)
        .with_context(|| format!("Could not create portfolio '{}'", name))?;
    println!("Added portfolio '{}'", name);
    print_summary(&view);
    Ok(())
}
