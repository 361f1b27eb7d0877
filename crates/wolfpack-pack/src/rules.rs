// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config-driven compatibility rule table.
//!
//! Rules are matched top to bottom and the first match decides. A rule field
//! left unset matches anything; an empty `kinds` list matches every kind.

use wolfpack_config::model::{CompatibilityConfig, CompatibilityRuleConfig};
use wolfpack_core::CompatibilityRules;
use wolfpack_core::types::{Gender, InteractionKind, MemberAttributes};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub sender: Option<Gender>,
    pub receiver: Option<Gender>,
    pub kinds: Vec<InteractionKind>,
    pub allow: bool,
}

impl Rule {
    fn matches(
        &self,
        sender: &MemberAttributes,
        receiver: &MemberAttributes,
        kind: InteractionKind,
    ) -> bool {
        self.sender.is_none_or(|g| g == sender.gender)
            && self.receiver.is_none_or(|g| g == receiver.gender)
            && (self.kinds.is_empty() || self.kinds.contains(&kind))
    }
}

impl From<&CompatibilityRuleConfig> for Rule {
    fn from(cfg: &CompatibilityRuleConfig) -> Self {
        Self {
            sender: cfg.sender,
            receiver: cfg.receiver,
            kinds: cfg.kinds.clone(),
            allow: cfg.allow,
        }
    }
}

/// Ordered rule list with a fallback verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<Rule>,
    default_allow: bool,
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>, default_allow: bool) -> Self {
        Self {
            rules,
            default_allow,
        }
    }

    pub fn from_config(config: &CompatibilityConfig) -> Self {
        Self::new(
            config.rules.iter().map(Rule::from).collect(),
            config.default_allow,
        )
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl CompatibilityRules for RuleTable {
    fn permits(
        &self,
        sender: &MemberAttributes,
        receiver: &MemberAttributes,
        kind: InteractionKind,
    ) -> bool {
        self.rules
            .iter()
            .find(|rule| rule.matches(sender, receiver, kind))
            .map_or(self.default_allow, |rule| rule.allow)
    }
}
