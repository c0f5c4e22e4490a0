//! Per-resource-kind set policies.
//!
//! Database, domain, account, secret, SSH key and cloud provider sets share
//! one shape: checkout rules plus the challenge rules and default profile
//! guarding checkout. System sets add login and privilege elevation rules
//! on top of that shape.

use super::SettingsBlock;
use crate::challenge::{ChallengeRules, expand_challenge_rules, with_challenge_rules};
use serde::{Deserialize, Serialize};
use vaultconf_kernel::{Record, RecordBuilder, Result, TreeReader};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResourceSetPolicy {
    /// Minutes.
    pub checkout_lifetime: i64,
    pub allow_multiple_checkouts: bool,
    pub enable_password_rotation: bool,
    /// Days.
    pub password_rotate_interval: i64,
    pub default_profile_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_rules: Option<ChallengeRules>,
}

impl SettingsBlock for ResourceSetPolicy {
    fn expand(block: &TreeReader<'_>) -> Result<Self> {
        Ok(Self {
            checkout_lifetime: block.int("checkout_lifetime")?,
            allow_multiple_checkouts: block.bool("allow_multiple_checkouts")?,
            enable_password_rotation: block.bool("enable_password_rotation")?,
            password_rotate_interval: block.int("password_rotate_interval")?,
            default_profile_id: block.string("default_profile_id")?,
            challenge_rules: expand_challenge_rules(block, "challenge_rule")?,
        })
    }

    fn flatten(&self) -> Record {
        let builder = RecordBuilder::new()
            .int("checkout_lifetime", self.checkout_lifetime)
            .bool("allow_multiple_checkouts", self.allow_multiple_checkouts)
            .bool("enable_password_rotation", self.enable_password_rotation)
            .int("password_rotate_interval", self.password_rotate_interval)
            .string("default_profile_id", self.default_profile_id.clone());
        with_challenge_rules(builder, "challenge_rule", self.challenge_rules.as_ref()).build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SystemSetPolicy {
    #[serde(flatten)]
    pub checkout: ResourceSetPolicy,
    pub allow_remote_access: bool,
    pub allow_rdp_clipboard: bool,
    pub local_account_automatic_maintenance: bool,
    pub local_account_manual_unlock: bool,
    pub privilege_elevation_default_profile_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privilege_elevation_rules: Option<ChallengeRules>,
}

impl SettingsBlock for SystemSetPolicy {
    fn expand(block: &TreeReader<'_>) -> Result<Self> {
        Ok(Self {
            checkout: ResourceSetPolicy::expand(block)?,
            allow_remote_access: block.bool("allow_remote_access")?,
            allow_rdp_clipboard: block.bool("allow_rdp_clipboard")?,
            local_account_automatic_maintenance: block
                .bool("local_account_automatic_maintenance")?,
            local_account_manual_unlock: block.bool("local_account_manual_unlock")?,
            privilege_elevation_default_profile_id: block
                .string("privilege_elevation_default_profile_id")?,
            privilege_elevation_rules: expand_challenge_rules(block, "privilege_elevation_rule")?,
        })
    }

    fn flatten(&self) -> Record {
        let builder = RecordBuilder::from(self.checkout.flatten())
            .bool("allow_remote_access", self.allow_remote_access)
            .bool("allow_rdp_clipboard", self.allow_rdp_clipboard)
            .bool(
                "local_account_automatic_maintenance",
                self.local_account_automatic_maintenance,
            )
            .bool("local_account_manual_unlock", self.local_account_manual_unlock)
            .string(
                "privilege_elevation_default_profile_id",
                self.privilege_elevation_default_profile_id.clone(),
            );
        with_challenge_rules(
            builder,
            "privilege_elevation_rule",
            self.privilege_elevation_rules.as_ref(),
        )
        .build()
    }
}
