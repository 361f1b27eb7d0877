// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the complete pack service graph with mock billing
//! and push collaborators, a temp SQLite database, a manual clock, one seeded
//! venue, and a handful of known bearer tokens.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use wolfpack_config::WolfpackConfig;
use wolfpack_config::model::{CompatibilityRuleConfig, LocationConfig, StorageConfig, TokenConfig};
use wolfpack_core::geofence::meters_to_latitude_degrees;
use wolfpack_core::types::{Coordinates, Gender, Identity, MemberAttributes, MembershipSession, Role};
use wolfpack_core::{ManualClock, PackStorage, WolfpackError};
use wolfpack_pack::{Collaborators, Pack, RuleTable, StaticCatalog, StaticIdentityProvider};
use wolfpack_storage::SqliteStorage;

use crate::mock_notifier::MockNotifier;
use crate::mock_tabs::MockTabs;

/// Id of the venue every harness seeds.
pub const VENUE_ID: &str = "den";
pub const VENUE_LAT: f64 = 34.0522;
pub const VENUE_LON: f64 = -118.2437;
pub const VENUE_RADIUS_METERS: f64 = 100.0;

/// Known users: `(user_id, role, gender)`. Each gets the token `token-<user_id>`.
const USERS: &[(&str, Role, Gender)] = &[
    ("alice", Role::Member, Gender::Male),
    ("bob", Role::Member, Gender::Male),
    ("carol", Role::Member, Gender::Female),
    ("dj", Role::Dj, Gender::Unspecified),
    ("barkeep", Role::Bartender, Gender::Unspecified),
    ("admin", Role::Admin, Gender::Unspecified),
];

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: WolfpackConfig,
    start: DateTime<Utc>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        let mut config = WolfpackConfig::default();
        config.locations = vec![LocationConfig {
            id: VENUE_ID.into(),
            name: "The Den".into(),
            latitude: VENUE_LAT,
            longitude: VENUE_LON,
            radius_meters: VENUE_RADIUS_METERS,
        }];
        config.tokens = USERS
            .iter()
            .map(|(user, role, gender)| TokenConfig {
                token: format!("token-{user}"),
                user_id: user.to_string(),
                role: *role,
                gender: *gender,
                display_name: None,
            })
            .collect();
        Self {
            config,
            start: Utc
                .with_ymd_and_hms(2026, 5, 1, 21, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
        }
    }

    /// Add a compatibility rule (appended after any existing ones).
    pub fn with_rule(mut self, rule: CompatibilityRuleConfig) -> Self {
        self.config.compatibility.rules.push(rule);
        self
    }

    /// Mark a catalog item as unavailable.
    pub fn with_unavailable_item(mut self, item_id: &str) -> Self {
        self.config.policy.unavailable_items.push(item_id.to_string());
        self
    }

    /// Arbitrary config changes applied before the stack is built.
    pub fn with_config(mut self, tweak: impl FnOnce(&mut WolfpackConfig)) -> Self {
        tweak(&mut self.config);
        self
    }

    /// Start the manual clock at `start`.
    pub fn starting_at(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    /// Build the harness, creating the temp database and every subsystem.
    pub async fn build(mut self) -> Result<TestHarness, WolfpackError> {
        let temp_dir = tempfile::TempDir::new().map_err(|e| WolfpackError::Storage {
            source: Box::new(e),
        })?;
        self.config.storage = StorageConfig {
            database_path: temp_dir.path().join("test.db").to_string_lossy().into_owned(),
            ..StorageConfig::default()
        };

        let sqlite = SqliteStorage::open(&self.config.storage).await?;
        let storage: Arc<dyn PackStorage> = Arc::new(sqlite.clone());
        let clock = Arc::new(ManualClock::new(self.start));
        let tabs = Arc::new(MockTabs::new());
        let notifier = Arc::new(MockNotifier::new());

        let collaborators = Collaborators {
            identities: Arc::new(StaticIdentityProvider::from_tokens(&self.config.tokens)),
            tabs: tabs.clone(),
            catalog: Arc::new(StaticCatalog::new(
                self.config.policy.unavailable_items.iter().cloned(),
            )),
            notifier: notifier.clone(),
            rules: Arc::new(RuleTable::from_config(&self.config.compatibility)),
        };

        let pack = Arc::new(Pack::new(&self.config, storage, clock.clone(), collaborators));
        pack.seed_locations(&self.config.locations).await?;

        Ok(TestHarness {
            pack,
            sqlite,
            clock,
            tabs,
            notifier,
            config: self.config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock collaborators and temp storage.
pub struct TestHarness {
    /// The assembled services.
    pub pack: Arc<Pack>,
    /// Concrete store behind `pack.storage`, for lifecycle calls.
    pub sqlite: SqliteStorage,
    /// Manual clock shared by every service.
    pub clock: Arc<ManualClock>,
    pub tabs: Arc<MockTabs>,
    pub notifier: Arc<MockNotifier>,
    pub config: WolfpackConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with default settings.
    pub async fn new() -> Result<Self, WolfpackError> {
        Self::builder().build().await
    }

    /// Identity of one of the known users. Unknown ids get a plain member.
    pub fn identity(&self, user_id: &str) -> Identity {
        self.config
            .tokens
            .iter()
            .find(|t| t.user_id == user_id)
            .map(|t| Identity {
                user_id: t.user_id.clone(),
                role: t.role,
                attributes: MemberAttributes { gender: t.gender },
                display_name: t.display_name.clone(),
            })
            .unwrap_or_else(|| Identity::member(user_id))
    }

    /// Bearer token of a known user.
    pub fn token(&self, user_id: &str) -> String {
        format!("token-{user_id}")
    }

    /// The venue center.
    pub fn venue(&self) -> Coordinates {
        Coordinates::new(VENUE_LAT, VENUE_LON)
    }

    /// A point `meters` due north of the venue center.
    pub fn north_of_venue(&self, meters: f64) -> Coordinates {
        Coordinates::new(VENUE_LAT + meters_to_latitude_degrees(meters), VENUE_LON)
    }

    /// Admit `user_id` at the venue center.
    pub async fn admit(&self, user_id: &str) -> Result<MembershipSession, WolfpackError> {
        self.pack
            .membership
            .admit(user_id, VENUE_ID, self.venue())
            .await
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }
}
