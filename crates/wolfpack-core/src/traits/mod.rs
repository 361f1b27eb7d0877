// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams to the persistent store and external collaborators.
//!
//! Every service takes these as `Arc<dyn Trait>` constructor arguments and
//! uses `#[async_trait]` for dynamic dispatch compatibility.

pub mod billing;
pub mod compatibility;
pub mod identity;
pub mod notify;
pub mod storage;

pub use billing::{CatalogProvider, TabProvider};
pub use compatibility::CompatibilityRules;
pub use identity::IdentityProvider;
pub use notify::{Notification, PushNotifier};
pub use storage::{AdmitOutcome, PackStorage};
