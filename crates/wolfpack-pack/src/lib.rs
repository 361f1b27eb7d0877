// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wolf pack services: geofenced admission, presence, access policy,
//! directed interactions, chat, votes, and the expiry sweep.
//!
//! Every service takes its store, bus, and clock handles at construction.
//! [`Pack`] wires them together for the server and the CLI.

pub mod chat;
pub mod collaborators;
pub mod ledger;
pub mod membership;
pub mod pack;
pub mod policy;
pub mod presence;
pub mod reaper;
pub mod rules;
pub mod votes;

pub use chat::ChatService;
pub use collaborators::{Collaborators, LogNotifier, OpenTabs, StaticCatalog, StaticIdentityProvider};
pub use ledger::InteractionLedger;
pub use membership::MembershipStore;
pub use pack::Pack;
pub use policy::PolicyEvaluator;
pub use presence::{PresenceDirectory, PresenceStream};
pub use reaper::{Reaper, SweepReport};
pub use rules::RuleTable;
pub use votes::VoteService;
