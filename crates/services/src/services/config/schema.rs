use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub const CURRENT_CONFIG_VERSION: &str = "v3";

fn default_agency_name() -> String {
    "Roomery Lettings".to_string()
}

fn default_contact_email() -> String {
    "hello@roomery.uk".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct SiteConfig {
    #[serde(alias = "agencyName")]
    pub agency_name: String,
    #[serde(alias = "contactEmail")]
    pub contact_email: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            agency_name: default_agency_name(),
            contact_email: default_contact_email(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct NotificationConfig {
    #[serde(alias = "applicationEmailEndpoint")]
    pub application_email_endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessControlMode {
    #[default]
    Disabled,
    Token,
}

#[derive(Clone, Debug, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct AccessControlConfig {
    pub mode: AccessControlMode,
    pub token: Option<String>,
    #[serde(alias = "allowLocalhostBypass")]
    pub allow_localhost_bypass: bool,
}

impl Default for AccessControlConfig {
    fn default() -> Self {
        Self {
            mode: AccessControlMode::Disabled,
            token: None,
            allow_localhost_bypass: true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct Config {
    #[serde(alias = "configVersion")]
    pub config_version: String,
    pub site: SiteConfig,
    pub notifications: NotificationConfig,
    #[serde(alias = "accessControl")]
    pub access_control: AccessControlConfig,
    #[serde(alias = "publicBaseUrl")]
    pub public_base_url: Option<String>,
}

impl Config {
    pub fn from_raw(raw_config: &str) -> Self {
        match serde_json::from_str::<Config>(raw_config) {
            Ok(config) => config.normalized(),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse config (line {}, column {}): {}, using default",
                    e.line(),
                    e.column(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn normalized(mut self) -> Self {
        self.config_version = CURRENT_CONFIG_VERSION.to_string();

        if self.site.agency_name.trim().is_empty() {
            self.site.agency_name = default_agency_name();
        }
        if self.site.contact_email.trim().is_empty() {
            self.site.contact_email = default_contact_email();
        }

        if matches!(
            self.notifications.application_email_endpoint.as_deref(),
            Some(endpoint) if endpoint.trim().is_empty()
        ) {
            self.notifications.application_email_endpoint = None;
        }

        if matches!(
            self.access_control.token.as_deref(),
            Some(token) if token.trim().is_empty()
        ) {
            self.access_control.token = None;
        }
        if matches!(self.access_control.mode, AccessControlMode::Token)
            && self.access_control.token.is_none()
        {
            tracing::warn!("Access control mode TOKEN has no token, disabling");
            self.access_control.mode = AccessControlMode::Disabled;
        }

        if let Some(base) = self.public_base_url.take() {
            let trimmed = base.trim().trim_end_matches('/');
            if !trimmed.is_empty() {
                self.public_base_url = Some(trimmed.to_string());
            }
        }

        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_version: CURRENT_CONFIG_VERSION.to_string(),
            site: SiteConfig::default(),
            notifications: NotificationConfig::default(),
            access_control: AccessControlConfig::default(),
            public_base_url: None,
        }
    }
}
