//! Login blocks: the portal login service and the desktop client.

use super::SettingsBlock;
use crate::challenge::{ChallengeRules, expand_challenge_rules, with_challenge_rules};
use serde::{Deserialize, Serialize};
use vaultconf_kernel::{Record, RecordBuilder, Result, TreeReader};

/// `centrify_services`: interactive login to the portal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CentrifyServicesSettings {
    pub authentication_enabled: bool,
    pub default_profile_id: String,
    /// Hours.
    pub session_lifespan: i64,
    pub allow_session_persist: bool,
    pub default_session_persist: bool,
    /// Hours.
    pub persist_session_lifespan: i64,
    pub allow_iwa: bool,
    pub iwa_set_cookie: bool,
    pub iwa_satisfies_all: bool,
    pub use_certauth: bool,
    pub certauth_skip_challenge: bool,
    pub certauth_set_cookie: bool,
    pub certauth_satisfies_all: bool,
    pub allow_no_mfa_mech: bool,
    pub auth_rule_federated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_rules: Option<ChallengeRules>,
}

impl SettingsBlock for CentrifyServicesSettings {
    fn expand(block: &TreeReader<'_>) -> Result<Self> {
        Ok(Self {
            authentication_enabled: block.bool("authentication_enabled")?,
            default_profile_id: block.string("default_profile_id")?,
            session_lifespan: block.int("session_lifespan")?,
            allow_session_persist: block.bool("allow_session_persist")?,
            default_session_persist: block.bool("default_session_persist")?,
            persist_session_lifespan: block.int("persist_session_lifespan")?,
            allow_iwa: block.bool("allow_iwa")?,
            iwa_set_cookie: block.bool("iwa_set_cookie")?,
            iwa_satisfies_all: block.bool("iwa_satisfies_all")?,
            use_certauth: block.bool("use_certauth")?,
            certauth_skip_challenge: block.bool("certauth_skip_challenge")?,
            certauth_set_cookie: block.bool("certauth_set_cookie")?,
            certauth_satisfies_all: block.bool("certauth_satisfies_all")?,
            allow_no_mfa_mech: block.bool("allow_no_mfa_mech")?,
            auth_rule_federated: block.bool("auth_rule_federated")?,
            challenge_rules: expand_challenge_rules(block, "challenge_rule")?,
        })
    }

    fn flatten(&self) -> Record {
        let builder = RecordBuilder::new()
            .bool("authentication_enabled", self.authentication_enabled)
            .string("default_profile_id", self.default_profile_id.clone())
            .int("session_lifespan", self.session_lifespan)
            .bool("allow_session_persist", self.allow_session_persist)
            .bool("default_session_persist", self.default_session_persist)
            .int("persist_session_lifespan", self.persist_session_lifespan)
            .bool("allow_iwa", self.allow_iwa)
            .bool("iwa_set_cookie", self.iwa_set_cookie)
            .bool("iwa_satisfies_all", self.iwa_satisfies_all)
            .bool("use_certauth", self.use_certauth)
            .bool("certauth_skip_challenge", self.certauth_skip_challenge)
            .bool("certauth_set_cookie", self.certauth_set_cookie)
            .bool("certauth_satisfies_all", self.certauth_satisfies_all)
            .bool("allow_no_mfa_mech", self.allow_no_mfa_mech)
            .bool("auth_rule_federated", self.auth_rule_federated);
        with_challenge_rules(builder, "challenge_rule", self.challenge_rules.as_ref()).build()
    }
}

/// `centrify_client`: login through the desktop client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CentrifyClientSettings {
    pub authentication_enabled: bool,
    pub default_profile_id: String,
    pub allow_no_mfa_mech: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_rules: Option<ChallengeRules>,
}

impl SettingsBlock for CentrifyClientSettings {
    fn expand(block: &TreeReader<'_>) -> Result<Self> {
        Ok(Self {
            authentication_enabled: block.bool("authentication_enabled")?,
            default_profile_id: block.string("default_profile_id")?,
            allow_no_mfa_mech: block.bool("allow_no_mfa_mech")?,
            challenge_rules: expand_challenge_rules(block, "challenge_rule")?,
        })
    }

    fn flatten(&self) -> Record {
        let builder = RecordBuilder::new()
            .bool("authentication_enabled", self.authentication_enabled)
            .string("default_profile_id", self.default_profile_id.clone())
            .bool("allow_no_mfa_mech", self.allow_no_mfa_mech);
        with_challenge_rules(builder, "challenge_rule", self.challenge_rules.as_ref()).build()
    }
}
