// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use stocknote::api::ApiClient;
use stocknote::config::Config;
use stocknote::error::ApiError;
use stocknote::session::Session;
use stocknote::{cli, commands, db};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut config = Config::from_env();
    if let Some(url) = matches.get_one::<String>("base-url") {
        config = config.with_base_url(url);
    }

    let mut conn = db::open_or_init()?;
    let session = db::load_session(&conn)?;

    let result = dispatch(&matches, &config, &mut conn, &session);
    if let Err(e) = &result {
        let rejected = e
            .chain()
            .filter_map(|c| c.downcast_ref::<ApiError>())
            .any(ApiError::is_auth_failure);
        if rejected {
            eprintln!("The server rejected the stored session; sign in again with `stocknote login`.");
        }
    }
    result
}

fn dispatch(
    matches: &clap::ArgMatches,
    config: &Config,
    conn: &mut Connection,
    session: &Session,
) -> Result<()> {
    let api = ApiClient::new(config)?;
    log::debug!("Using API at {}", api.base_url());

    match matches.subcommand() {
        Some(("login", sub)) => {
            commands::auth::login(conn, sub)?;
        }
        Some(("login-url", sub)) => commands::auth::login_url(api.base_url(), sub)?,
        Some(("logout", _)) => commands::auth::logout(conn)?,
        Some(("whoami", _)) => commands::auth::whoami(session)?,
        Some(("notifications", sub)) => {
            commands::notifications::handle(&api, config, session, sub)?
        }
        Some(("article", sub)) => commands::article::handle(&api, api.base_url(), session, sub)?,
        Some(("portfolio", sub)) => commands::portfolio::handle(&api, session, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&api, session, sub)?,
        Some(("header", _)) => commands::header::handle(&api, session)?,
        Some(("doctor", _)) => {
            let path = db::db_path().ok();
            commands::doctor::handle(config, session, path.as_deref())?
        }
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
