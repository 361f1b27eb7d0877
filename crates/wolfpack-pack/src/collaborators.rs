// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Handles to external collaborators, plus static implementations for local
//! runs: config tokens for identity, an always-open tab, a catalog with an
//! unavailable-item list, and a notifier that only logs.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use wolfpack_config::WolfpackConfig;
use wolfpack_config::model::TokenConfig;
use wolfpack_core::traits::Notification;
use wolfpack_core::types::{Identity, MemberAttributes};
use wolfpack_core::{
    CatalogProvider, CompatibilityRules, IdentityProvider, PushNotifier, TabProvider,
    WolfpackError,
};

use crate::rules::RuleTable;

/// Every collaborator the pack services consult.
#[derive(Clone)]
pub struct Collaborators {
    pub identities: Arc<dyn IdentityProvider>,
    pub tabs: Arc<dyn TabProvider>,
    pub catalog: Arc<dyn CatalogProvider>,
    pub notifier: Arc<dyn PushNotifier>,
    pub rules: Arc<dyn CompatibilityRules>,
}

impl Collaborators {
    /// Static collaborators built from configuration.
    pub fn from_config(config: &WolfpackConfig) -> Self {
        Self {
            identities: Arc::new(StaticIdentityProvider::from_tokens(&config.tokens)),
            tabs: Arc::new(OpenTabs),
            catalog: Arc::new(StaticCatalog::new(
                config.policy.unavailable_items.iter().cloned(),
            )),
            notifier: Arc::new(LogNotifier),
            rules: Arc::new(RuleTable::from_config(&config.compatibility)),
        }
    }
}

/// Bearer tokens mapped to identities, from `[[tokens]]`.
#[derive(Debug, Default)]
pub struct StaticIdentityProvider {
    by_token: HashMap<String, Identity>,
    by_user: HashMap<String, Identity>,
}

impl StaticIdentityProvider {
    pub fn from_tokens(tokens: &[TokenConfig]) -> Self {
        let mut provider = Self::default();
        for t in tokens {
            let identity = Identity {
                user_id: t.user_id.clone(),
                role: t.role,
                attributes: MemberAttributes { gender: t.gender },
                display_name: t.display_name.clone(),
            };
            provider.insert(t.token.clone(), identity);
        }
        provider
    }

    pub fn insert(&mut self, token: impl Into<String>, identity: Identity) {
        self.by_user
            .insert(identity.user_id.clone(), identity.clone());
        self.by_token.insert(token.into(), identity);
    }

    pub fn len(&self) -> usize {
        self.by_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_token.is_empty()
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn authenticate(&self, token: &str) -> Result<Option<Identity>, WolfpackError> {
        Ok(self.by_token.get(token).cloned())
    }

    async fn lookup(&self, user_id: &str) -> Result<Option<Identity>, WolfpackError> {
        Ok(self.by_user.get(user_id).cloned())
    }
}

/// Every user has an open tab and no pending orders.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenTabs;

#[async_trait]
impl TabProvider for OpenTabs {
    async fn has_open_tab(&self, _user_id: &str, _location_id: &str) -> Result<bool, WolfpackError> {
        Ok(true)
    }

    async fn pending_orders(
        &self,
        _user_id: &str,
        _location_id: &str,
    ) -> Result<u32, WolfpackError> {
        Ok(0)
    }
}

/// Everything is orderable except the listed item ids.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    unavailable: HashSet<String>,
}

impl StaticCatalog {
    pub fn new(unavailable: impl IntoIterator<Item = String>) -> Self {
        Self {
            unavailable: unavailable.into_iter().collect(),
        }
    }
}

#[async_trait]
impl CatalogProvider for StaticCatalog {
    async fn is_orderable(&self, item_id: &str) -> Result<bool, WolfpackError> {
        Ok(!self.unavailable.contains(item_id))
    }
}

/// Logs notifications instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl PushNotifier for LogNotifier {
    async fn notify(&self, user_id: &str, notification: Notification) -> Result<(), WolfpackError> {
        info!(
            user_id,
            event_type = %notification.event_type,
            reference_id = %notification.reference_id,
            "push notification (log only)"
        );
        Ok(())
    }
}
