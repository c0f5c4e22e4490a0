//! End-user account blocks: OTP, RADIUS, account self-management, mobile
//! devices.

use super::SettingsBlock;
use serde::{Deserialize, Serialize};
use vaultconf_kernel::{Record, RecordBuilder, Result, TreeReader};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct OathOtpSettings {
    pub allow_otp: bool,
}

impl SettingsBlock for OathOtpSettings {
    fn expand(block: &TreeReader<'_>) -> Result<Self> {
        Ok(Self {
            allow_otp: block.bool("allow_otp")?,
        })
    }

    fn flatten(&self) -> Record {
        RecordBuilder::new().bool("allow_otp", self.allow_otp).build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RadiusSettings {
    pub allow_radius: bool,
    pub require_challenges: bool,
    pub default_profile_id: String,
    pub send_vendor_attributes: bool,
    pub allow_external_radius: bool,
}

impl SettingsBlock for RadiusSettings {
    fn expand(block: &TreeReader<'_>) -> Result<Self> {
        Ok(Self {
            allow_radius: block.bool("allow_radius")?,
            require_challenges: block.bool("require_challenges")?,
            default_profile_id: block.string("default_profile_id")?,
            send_vendor_attributes: block.bool("send_vendor_attributes")?,
            allow_external_radius: block.bool("allow_external_radius")?,
        })
    }

    fn flatten(&self) -> Record {
        RecordBuilder::new()
            .bool("allow_radius", self.allow_radius)
            .bool("require_challenges", self.require_challenges)
            .string("default_profile_id", self.default_profile_id.clone())
            .bool("send_vendor_attributes", self.send_vendor_attributes)
            .bool("allow_external_radius", self.allow_external_radius)
            .build()
    }
}

/// `user_account`: what users may change about their own account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserAccountSettings {
    pub user_change_password_allow: bool,
    pub password_change_auth_profile_id: String,
    pub show_fido2: bool,
    pub fido2_prompt: String,
    pub fido2_auth_profile_id: String,
    pub show_otp: bool,
    pub otp_prompt: String,
    pub otp_auth_profile_id: String,
    pub configure_security_questions: bool,
    pub prevent_dup_answers: bool,
    pub user_defined_questions: i64,
    pub admin_defined_questions: i64,
    pub min_char_in_answer: i64,
    pub question_auth_profile_id: String,
    pub allow_phone_pin_change: bool,
    pub min_phone_pin_length: i64,
    pub phone_pin_auth_profile_id: String,
    pub default_language: String,
}

impl SettingsBlock for UserAccountSettings {
    fn expand(block: &TreeReader<'_>) -> Result<Self> {
        Ok(Self {
            user_change_password_allow: block.bool("user_change_password_allow")?,
            password_change_auth_profile_id: block.string("password_change_auth_profile_id")?,
            show_fido2: block.bool("show_fido2")?,
            fido2_prompt: block.string("fido2_prompt")?,
            fido2_auth_profile_id: block.string("fido2_auth_profile_id")?,
            show_otp: block.bool("show_otp")?,
            otp_prompt: block.string("otp_prompt")?,
            otp_auth_profile_id: block.string("otp_auth_profile_id")?,
            configure_security_questions: block.bool("configure_security_questions")?,
            prevent_dup_answers: block.bool("prevent_dup_answers")?,
            user_defined_questions: block.int("user_defined_questions")?,
            admin_defined_questions: block.int("admin_defined_questions")?,
            min_char_in_answer: block.int("min_char_in_answer")?,
            question_auth_profile_id: block.string("question_auth_profile_id")?,
            allow_phone_pin_change: block.bool("allow_phone_pin_change")?,
            min_phone_pin_length: block.int("min_phone_pin_length")?,
            phone_pin_auth_profile_id: block.string("phone_pin_auth_profile_id")?,
            default_language: block.string("default_language")?,
        })
    }

    fn flatten(&self) -> Record {
        RecordBuilder::new()
            .bool("user_change_password_allow", self.user_change_password_allow)
            .string(
                "password_change_auth_profile_id",
                self.password_change_auth_profile_id.clone(),
            )
            .bool("show_fido2", self.show_fido2)
            .string("fido2_prompt", self.fido2_prompt.clone())
            .string("fido2_auth_profile_id", self.fido2_auth_profile_id.clone())
            .bool("show_otp", self.show_otp)
            .string("otp_prompt", self.otp_prompt.clone())
            .string("otp_auth_profile_id", self.otp_auth_profile_id.clone())
            .bool("configure_security_questions", self.configure_security_questions)
            .bool("prevent_dup_answers", self.prevent_dup_answers)
            .int("user_defined_questions", self.user_defined_questions)
            .int("admin_defined_questions", self.admin_defined_questions)
            .int("min_char_in_answer", self.min_char_in_answer)
            .string("question_auth_profile_id", self.question_auth_profile_id.clone())
            .bool("allow_phone_pin_change", self.allow_phone_pin_change)
            .int("min_phone_pin_length", self.min_phone_pin_length)
            .string("phone_pin_auth_profile_id", self.phone_pin_auth_profile_id.clone())
            .string("default_language", self.default_language.clone())
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MobileDeviceSettings {
    pub allow_enrollment: bool,
    pub permit_non_compliant_device: bool,
    pub enable_invite_enrollment: bool,
    pub allow_notify_multi_devices: bool,
    pub enable_debug: bool,
    pub location_tracking: bool,
    pub force_fingerprint: bool,
    pub allow_fallback_pin: bool,
    pub require_passcode: bool,
    /// Minutes.
    pub auto_lock_timeout: i64,
    pub lock_app_on_exit: bool,
}

impl SettingsBlock for MobileDeviceSettings {
    fn expand(block: &TreeReader<'_>) -> Result<Self> {
        Ok(Self {
            allow_enrollment: block.bool("allow_enrollment")?,
            permit_non_compliant_device: block.bool("permit_non_compliant_device")?,
            enable_invite_enrollment: block.bool("enable_invite_enrollment")?,
            allow_notify_multi_devices: block.bool("allow_notify_multi_devices")?,
            enable_debug: block.bool("enable_debug")?,
            location_tracking: block.bool("location_tracking")?,
            force_fingerprint: block.bool("force_fingerprint")?,
            allow_fallback_pin: block.bool("allow_fallback_pin")?,
            require_passcode: block.bool("require_passcode")?,
            auto_lock_timeout: block.int("auto_lock_timeout")?,
            lock_app_on_exit: block.bool("lock_app_on_exit")?,
        })
    }

    fn flatten(&self) -> Record {
        RecordBuilder::new()
            .bool("allow_enrollment", self.allow_enrollment)
            .bool("permit_non_compliant_device", self.permit_non_compliant_device)
            .bool("enable_invite_enrollment", self.enable_invite_enrollment)
            .bool("allow_notify_multi_devices", self.allow_notify_multi_devices)
            .bool("enable_debug", self.enable_debug)
            .bool("location_tracking", self.location_tracking)
            .bool("force_fingerprint", self.force_fingerprint)
            .bool("allow_fallback_pin", self.allow_fallback_pin)
            .bool("require_passcode", self.require_passcode)
            .int("auto_lock_timeout", self.auto_lock_timeout)
            .bool("lock_app_on_exit", self.lock_app_on_exit)
            .build()
    }
}
