// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;

use crate::api::PortfolioApi;
use crate::error::ApiResult;
use crate::models::{LoadState, Portfolio, PortfolioDraft, PortfolioTotals};
use crate::session::Session;

/// Sums asset and profit over all portfolios; absent amounts count as zero.
/// A sum beyond the `Decimal` range is clamped to its bound.
pub fn totals(portfolios: &[Portfolio]) -> PortfolioTotals {
    portfolios.iter().fold(
        PortfolioTotals {
            total_assets: Decimal::ZERO,
            total_profits: Decimal::ZERO,
        },
        |acc, p| PortfolioTotals {
            total_assets: add_clamped(acc.total_assets, p.asset(), p.id),
            total_profits: add_clamped(acc.total_profits, p.profit(), p.id),
        },
    )
}

fn add_clamped(acc: Decimal, amount: Decimal, portfolio_id: i64) -> Decimal {
    acc.checked_add(amount).unwrap_or_else(|| {
        log::warn!(
            "Portfolio {} pushes the total out of range; clamping",
            portfolio_id
        );
        acc.saturating_add(amount)
    })
}

#[derive(Debug, Clone, Default)]
pub struct PortfolioView {
    portfolios: Vec<Portfolio>,
    totals: PortfolioTotals,
    state: LoadState,
    modal_open: bool,
    draft: PortfolioDraft,
}

impl PortfolioView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn portfolios(&self) -> &[Portfolio] {
        &self.portfolios
    }

    pub fn totals(&self) -> PortfolioTotals {
        self.totals
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal_open
    }

    pub fn draft(&self) -> &PortfolioDraft {
        &self.draft
    }

    pub fn open_modal(&mut self) {
        self.modal_open = true;
    }

    /// Closes the creation dialog; the draft is kept for the next open.
    pub fn close_modal(&mut self) {
        self.modal_open = false;
    }

    pub fn set_draft_name(&mut self, name: &str) {
        self.draft.name = name.to_string();
    }

    pub fn set_draft_description(&mut self, description: &str) {
        self.draft.description = description.to_string();
    }

    fn set_portfolios(&mut self, portfolios: Vec<Portfolio>) {
        self.totals = totals(&portfolios);
        self.portfolios = portfolios;
    }

    /// Re-fetches the list. On failure the previous list stays visible.
    pub fn refresh(&mut self, api: &impl PortfolioApi, session: &Session) -> ApiResult<()> {
        self.state = LoadState::Loading;
        match api.fetch_portfolios(session) {
            Ok(list) => {
                self.set_portfolios(list);
                self.state = LoadState::Loaded;
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load portfolios: {}", e);
                self.state = LoadState::Failed;
                Err(e)
            }
        }
    }

    /// Creates a portfolio from the draft. Success resets the draft, closes
    /// the dialog and re-fetches; failure leaves both untouched.
    pub fn submit(&mut self, api: &impl PortfolioApi, session: &Session) -> ApiResult<()> {
        if let Err(e) = api.create_portfolio(session, &self.draft) {
            log::error!("Failed to create portfolio '{}': {}", self.draft.name, e);
            return Err(e);
        }
        self.draft = PortfolioDraft::default();
        self.modal_open = false;
        self.refresh(api, session)
    }
}
