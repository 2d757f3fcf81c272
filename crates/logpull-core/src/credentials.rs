use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};

use crate::error::ConfigError;

/// Account identifier and OAuth token used for every outbound call.
///
/// The identifier is the AppMetrica application id or the Metrica counter id,
/// depending on which client owns the credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    account_id: String,
    token: String,
}

impl Credentials {
    pub fn new(account_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            token: token.into(),
        }
    }

    /// Read both values from the environment.
    pub fn from_env(account_var: &str, token_var: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(read_env(account_var)?, read_env(token_var)?))
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn authorization(&self) -> String {
        format!("OAuth {}", self.token)
    }

    pub fn apply(&self, headers: &mut BTreeMap<String, String>) {
        headers.insert(String::from("authorization"), self.authorization());
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("account_id", &self.account_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

fn read_env(name: &str) -> Result<String, ConfigError> {
    let value = std::env::var(name).map_err(|_| ConfigError::MissingEnv {
        name: name.to_string(),
    })?;
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyEnv {
            name: name.to_string(),
        });
    }
    Ok(value)
}
