// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Wolfpack integration tests.
//!
//! Provides mock collaborators and a harness that assembles the full service
//! graph over a temp SQLite database and a manual clock.
//!
//! # Components
//!
//! - [`TestHarness`] - Full stack with seeded venue and known identities
//! - [`MockTabs`] - Billing collaborator with per-user tab state
//! - [`MockNotifier`] - Push collaborator that captures notifications

pub mod harness;
pub mod mock_notifier;
pub mod mock_tabs;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_notifier::MockNotifier;
pub use mock_tabs::MockTabs;
