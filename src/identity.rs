use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "infinite-bookmarker";
const XUID_ENTRY: &str = "xuid";
const SPARTAN_TOKEN_ENTRY: &str = "spartan_token";

/// The signed-in player: Xbox network ID plus Spartan token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub xuid: String,
    pub spartan_token: String,
}

pub trait IdentityProvider {
    fn active_identity(&self) -> Result<Identity>;
}

/// Reads the identity from the OS keyring, letting `HALO_XUID` and
/// `HALO_SPARTAN_TOKEN` (passed in as overrides) win per field.
#[derive(Debug, Clone, Default)]
pub struct KeyringIdentity {
    xuid_override: Option<String>,
    token_override: Option<String>,
}

impl KeyringIdentity {
    pub fn new(xuid_override: Option<String>, token_override: Option<String>) -> Self {
        Self {
            xuid_override,
            token_override,
        }
    }

    pub fn store(&self, identity: &Identity) -> Result<()> {
        Entry::new(SERVICE_NAME, XUID_ENTRY)?
            .set_password(&identity.xuid)
            .context("Failed to store XUID")?;
        Entry::new(SERVICE_NAME, SPARTAN_TOKEN_ENTRY)?
            .set_password(&identity.spartan_token)
            .context("Failed to store Spartan token")?;
        tracing::info!(xuid = %identity.xuid, "identity stored");
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        for name in [XUID_ENTRY, SPARTAN_TOKEN_ENTRY] {
            let entry = Entry::new(SERVICE_NAME, name)?;
            match entry.delete_password() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => return Err(anyhow::anyhow!("Failed to remove {}: {}", name, e)),
            }
        }
        Ok(())
    }

    /// Whatever identity is available, or `None` when nothing is configured.
    pub fn current(&self) -> Result<Option<Identity>> {
        let xuid = match &self.xuid_override {
            Some(xuid) => Some(xuid.clone()),
            None => read_entry(XUID_ENTRY)?,
        };
        let spartan_token = match &self.token_override {
            Some(token) => Some(token.clone()),
            None => read_entry(SPARTAN_TOKEN_ENTRY)?,
        };
        Ok(combine(xuid, spartan_token))
    }
}

impl IdentityProvider for KeyringIdentity {
    fn active_identity(&self) -> Result<Identity> {
        self.current()?.context(
            "No active identity; run `infinite-bookmarker auth login --xuid <XUID> --spartan-token <TOKEN>`",
        )
    }
}

fn read_entry(name: &str) -> Result<Option<String>> {
    let entry = Entry::new(SERVICE_NAME, name)?;
    match entry.get_password() {
        Ok(value) => Ok(Some(value)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(anyhow::anyhow!("Failed to read {}: {}", name, e)),
    }
}

fn combine(xuid: Option<String>, spartan_token: Option<String>) -> Option<Identity> {
    let xuid = xuid.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())?;
    let spartan_token = spartan_token
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())?;
    Some(Identity {
        xuid,
        spartan_token,
    })
}

/// Show only the edges of a token, e.g. `v4=eyJ...x9Zq`.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
