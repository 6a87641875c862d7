// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use serde_json::json;

use crate::api::PortfolioApi;
use crate::portfolio::totals;
use crate::session::Session;

pub fn handle(api: &impl PortfolioApi, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("portfolios", sub)) => export_portfolios(api, session, sub),
        _ => Ok(()),
    }
}

fn export_portfolios(
    api: &impl PortfolioApi,
    session: &Session,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    if !matches!(fmt.as_str(), "csv" | "json") {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let portfolios = api
        .fetch_portfolios(session)
        .context("Could not load portfolios")?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["id", "name", "description", "total_asset", "total_profit"])?;
            for p in &portfolios {
                wtr.write_record([
                    p.id.to_string(),
                    p.name.clone(),
                    p.description.clone(),
                    p.asset().to_string(),
                    p.profit().to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            let doc = json!({
                "portfolios": portfolios,
                "totals": totals(&portfolios),
            });
            std::fs::write(out, serde_json::to_string_pretty(&doc)?)?;
        }
    }
    println!("Exported {} portfolios to {}", portfolios.len(), out);
    Ok(())
}
