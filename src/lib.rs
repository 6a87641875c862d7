// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod api;
pub mod article;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod layout;
pub mod models;
pub mod portfolio;
pub mod session;
pub mod sse;
pub mod utils;
