//! Self-service and password policy blocks.

use super::SettingsBlock;
use serde::{Deserialize, Serialize};
use vaultconf_kernel::{Record, RecordBuilder, Result, TreeReader};

/// A secret travels as a typed envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretValue {
    #[serde(rename = "_Type")]
    pub secret_type: String,
    #[serde(rename = "_Value")]
    pub value: String,
}

impl SettingsBlock for SecretValue {
    fn expand(block: &TreeReader<'_>) -> Result<Self> {
        Ok(Self {
            secret_type: block.string("type")?,
            value: block.string("value")?,
        })
    }

    fn flatten(&self) -> Record {
        RecordBuilder::new()
            .string("type", self.secret_type.clone())
            .string("value", self.value.clone())
            .build()
    }
}

/// `self_service`: password reset and account unlock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SelfServiceSettings {
    pub account_selfservice_enabled: bool,
    pub password_reset_enabled: bool,
    pub pwreset_allow_for_aduser: bool,
    pub pwreset_with_cookie_only: bool,
    pub login_after_reset: bool,
    pub pwreset_auth_profile_id: String,
    pub max_reset_attempts: i64,
    pub account_unlock_enabled: bool,
    pub unlock_allow_for_aduser: bool,
    pub unlock_with_cookie_only: bool,
    pub show_locked_message: bool,
    pub unlock_auth_profile_id: String,
    pub use_ad_admin: bool,
    pub ad_admin_user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_user_password: Option<SecretValue>,
    pub admin_email: String,
}

impl SettingsBlock for SelfServiceSettings {
    fn expand(block: &TreeReader<'_>) -> Result<Self> {
        Ok(Self {
            account_selfservice_enabled: block.bool("account_selfservice_enabled")?,
            password_reset_enabled: block.bool("password_reset_enabled")?,
            pwreset_allow_for_aduser: block.bool("pwreset_allow_for_aduser")?,
            pwreset_with_cookie_only: block.bool("pwreset_with_cookie_only")?,
            login_after_reset: block.bool("login_after_reset")?,
            pwreset_auth_profile_id: block.string("pwreset_auth_profile_id")?,
            max_reset_attempts: block.int("max_reset_attempts")?,
            account_unlock_enabled: block.bool("account_unlock_enabled")?,
            unlock_allow_for_aduser: block.bool("unlock_allow_for_aduser")?,
            unlock_with_cookie_only: block.bool("unlock_with_cookie_only")?,
            show_locked_message: block.bool("show_locked_message")?,
            unlock_auth_profile_id: block.string("unlock_auth_profile_id")?,
            use_ad_admin: block.bool("use_ad_admin")?,
            ad_admin_user: block.string("ad_admin_user")?,
            admin_user_password: block
                .expand_singleton("admin_user_password", SecretValue::expand)?,
            admin_email: block.string("admin_email")?,
        })
    }

    fn flatten(&self) -> Record {
        RecordBuilder::new()
            .bool("account_selfservice_enabled", self.account_selfservice_enabled)
            .bool("password_reset_enabled", self.password_reset_enabled)
            .bool("pwreset_allow_for_aduser", self.pwreset_allow_for_aduser)
            .bool("pwreset_with_cookie_only", self.pwreset_with_cookie_only)
            .bool("login_after_reset", self.login_after_reset)
            .string("pwreset_auth_profile_id", self.pwreset_auth_profile_id.clone())
            .int("max_reset_attempts", self.max_reset_attempts)
            .bool("account_unlock_enabled", self.account_unlock_enabled)
            .bool("unlock_allow_for_aduser", self.unlock_allow_for_aduser)
            .bool("unlock_with_cookie_only", self.unlock_with_cookie_only)
            .bool("show_locked_message", self.show_locked_message)
            .string("unlock_auth_profile_id", self.unlock_auth_profile_id.clone())
            .bool("use_ad_admin", self.use_ad_admin)
            .string("ad_admin_user", self.ad_admin_user.clone())
            .singleton(
                "admin_user_password",
                self.admin_user_password.as_ref().map(SecretValue::flatten),
            )
            .string("admin_email", self.admin_email.clone())
            .build()
    }
}

/// `password_settings`: length and composition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PasswordSettings {
    pub min_length: i64,
    pub max_length: i64,
    pub require_digit: bool,
    pub require_mix_case: bool,
    pub require_symbol: bool,
    pub show_password_complexity: bool,
    pub complexity_hint: String,
    pub history: i64,
    /// Days.
    pub max_age: i64,
    pub lockout_attempts: i64,
    /// Minutes.
    pub lockout_duration: i64,
}

impl SettingsBlock for PasswordSettings {
    fn expand(block: &TreeReader<'_>) -> Result<Self> {
        Ok(Self {
            min_length: block.int("min_length")?,
            max_length: block.int("max_length")?,
            require_digit: block.bool("require_digit")?,
            require_mix_case: block.bool("require_mix_case")?,
            require_symbol: block.bool("require_symbol")?,
            show_password_complexity: block.bool("show_password_complexity")?,
            complexity_hint: block.string("complexity_hint")?,
            history: block.int("history")?,
            max_age: block.int("max_age")?,
            lockout_attempts: block.int("lockout_attempts")?,
            lockout_duration: block.int("lockout_duration")?,
        })
    }

    fn flatten(&self) -> Record {
        RecordBuilder::new()
            .int("min_length", self.min_length)
            .int("max_length", self.max_length)
            .bool("require_digit", self.require_digit)
            .bool("require_mix_case", self.require_mix_case)
            .bool("require_symbol", self.require_symbol)
            .bool("show_password_complexity", self.show_password_complexity)
            .string("complexity_hint", self.complexity_hint.clone())
            .int("history", self.history)
            .int("max_age", self.max_age)
            .int("lockout_attempts", self.lockout_attempts)
            .int("lockout_duration", self.lockout_duration)
            .build()
    }
}
