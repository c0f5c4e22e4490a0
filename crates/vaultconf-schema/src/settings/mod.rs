//! Policy settings.
//!
//! A policy's `settings` block is a singleton holding one optional singleton
//! sub-block per governed service or resource category. Every sub-block is
//! a [`SettingsBlock`]; the table below is the whole tree surface.
//!
//! ```text
//! settings
//! ├── centrify_services     CentrifyServicesSettings   challenge_rule
//! ├── centrify_client       CentrifyClientSettings     challenge_rule
//! ├── self_service          SelfServiceSettings        admin_user_password
//! ├── password_settings     PasswordSettings
//! ├── oath_otp              OathOtpSettings
//! ├── radius                RadiusSettings
//! ├── user_account          UserAccountSettings
//! ├── system_set            SystemSetPolicy            challenge_rule, privilege_elevation_rule
//! ├── database_set ┐
//! ├── domain_set   │
//! ├── account_set  ├──────  ResourceSetPolicy          challenge_rule
//! ├── secret_set   │
//! ├── sshkey_set   │
//! ├── cloudproviders_set ┘
//! └── mobile_device         MobileDeviceSettings
//! ```

mod account;
mod login;
mod resource_set;
mod self_service;

pub use account::{MobileDeviceSettings, OathOtpSettings, RadiusSettings, UserAccountSettings};
pub use login::{CentrifyClientSettings, CentrifyServicesSettings};
pub use resource_set::{ResourceSetPolicy, SystemSetPolicy};
pub use self_service::{PasswordSettings, SecretValue, SelfServiceSettings};

use serde::{Deserialize, Serialize};
use vaultconf_kernel::{Record, RecordBuilder, Result, TreeReader};

/// One settings block, read from and written to a single tree block.
pub trait SettingsBlock: Sized {
    fn expand(block: &TreeReader<'_>) -> Result<Self>;

    fn flatten(&self) -> Record;
}

fn read<T: SettingsBlock>(settings: &TreeReader<'_>, field: &str) -> Result<Option<T>> {
    settings.expand_singleton(field, T::expand)
}

fn write<T: SettingsBlock>(
    builder: RecordBuilder,
    field: &str,
    block: Option<&T>,
) -> RecordBuilder {
    builder.singleton(field, block.map(T::flatten))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PolicySettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub centrify_services: Option<CentrifyServicesSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub centrify_client: Option<CentrifyClientSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_service: Option<SelfServiceSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_settings: Option<PasswordSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oath_otp: Option<OathOtpSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<RadiusSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_account: Option<UserAccountSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_set: Option<SystemSetPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_set: Option<ResourceSetPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_set: Option<ResourceSetPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_set: Option<ResourceSetPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_set: Option<ResourceSetPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sshkey_set: Option<ResourceSetPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloudproviders_set: Option<ResourceSetPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_device: Option<MobileDeviceSettings>,
}

impl SettingsBlock for PolicySettings {
    fn expand(settings: &TreeReader<'_>) -> Result<Self> {
        Ok(Self {
            centrify_services: read(settings, "centrify_services")?,
            centrify_client: read(settings, "centrify_client")?,
            self_service: read(settings, "self_service")?,
            password_settings: read(settings, "password_settings")?,
            oath_otp: read(settings, "oath_otp")?,
            radius: read(settings, "radius")?,
            user_account: read(settings, "user_account")?,
            system_set: read(settings, "system_set")?,
            database_set: read(settings, "database_set")?,
            domain_set: read(settings, "domain_set")?,
            account_set: read(settings, "account_set")?,
            secret_set: read(settings, "secret_set")?,
            sshkey_set: read(settings, "sshkey_set")?,
            cloudproviders_set: read(settings, "cloudproviders_set")?,
            mobile_device: read(settings, "mobile_device")?,
        })
    }

    fn flatten(&self) -> Record {
        let builder = RecordBuilder::new();
        let builder = write(builder, "centrify_services", self.centrify_services.as_ref());
        let builder = write(builder, "centrify_client", self.centrify_client.as_ref());
        let builder = write(builder, "self_service", self.self_service.as_ref());
        let builder = write(builder, "password_settings", self.password_settings.as_ref());
        let builder = write(builder, "oath_otp", self.oath_otp.as_ref());
        let builder = write(builder, "radius", self.radius.as_ref());
        let builder = write(builder, "user_account", self.user_account.as_ref());
        let builder = write(builder, "system_set", self.system_set.as_ref());
        let builder = write(builder, "database_set", self.database_set.as_ref());
        let builder = write(builder, "domain_set", self.domain_set.as_ref());
        let builder = write(builder, "account_set", self.account_set.as_ref());
        let builder = write(builder, "secret_set", self.secret_set.as_ref());
        let builder = write(builder, "sshkey_set", self.sshkey_set.as_ref());
        let builder = write(builder, "cloudproviders_set", self.cloudproviders_set.as_ref());
        write(builder, "mobile_device", self.mobile_device.as_ref()).build()
    }
}

/// Expand the `settings` singleton under `parent`. Absent yields `None`.
pub fn expand_policy_settings(
    parent: &TreeReader<'_>,
    field: &str,
) -> Result<Option<PolicySettings>> {
    read(parent, field)
}

pub fn flatten_policy_settings(settings: &PolicySettings) -> Record {
    settings.flatten()
}

/// Builder helper: write optional settings under `field`.
pub fn with_policy_settings(
    builder: RecordBuilder,
    field: &str,
    settings: Option<&PolicySettings>,
) -> RecordBuilder {
    write(builder, field, settings)
}
