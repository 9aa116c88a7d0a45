//! Application settings.
//!
//! Read from `config/settings.toml` when present, then overlaid by
//! environment variables such as `MARCENARIA__AUTH__SECRET`.
//! See `config/settings.example.toml` for every key.
use config::{Config, ConfigError, Environment, File};
use documents::{CompanyProfile, RESEND_ENDPOINT};
use serde::Deserialize;
use server::AuthSettings;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database: Database,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    10
}

#[derive(Debug, Default, Deserialize)]
pub struct Company {
    pub name: Option<String>,
    pub tax_id: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    /// IANA name, `America/Sao_Paulo` when absent.
    pub timezone: Option<String>,
}

impl Company {
    pub fn profile(self) -> Result<CompanyProfile, String> {
        let defaults = CompanyProfile::default();
        let timezone = match self.timezone {
            Some(name) => name
                .parse()
                .map_err(|err| format!("invalid company.timezone {name}: {err}"))?,
            None => defaults.timezone,
        };
        Ok(CompanyProfile {
            name: self.name.unwrap_or(defaults.name),
            tax_id: self.tax_id,
            phone: self.phone,
            email: self.email,
            address: self.address,
            timezone,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct Email {
    pub api_key: Option<String>,
    #[serde(default = "default_from")]
    pub from: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_email_timeout")]
    pub timeout_secs: u64,
}

impl Default for Email {
    fn default() -> Self {
        Self {
            api_key: None,
            from: default_from(),
            endpoint: default_endpoint(),
            timeout_secs: default_email_timeout(),
        }
    }
}

fn default_from() -> String {
    "Marcenaria MDF <onboarding@resend.dev>".to_string()
}

fn default_endpoint() -> String {
    RESEND_ENDPOINT.to_string()
}

fn default_email_timeout() -> u64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Server,
    pub auth: AuthSettings,
    #[serde(default)]
    pub company: Company,
    #[serde(default)]
    pub email: Email,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/settings").required(false))
            .add_source(
                Environment::with_prefix("MARCENARIA")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }
}
