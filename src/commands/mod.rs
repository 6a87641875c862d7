// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod article;
pub mod auth;
pub mod doctor;
pub mod exporter;
pub mod header;
pub mod notifications;
pub mod portfolio;
