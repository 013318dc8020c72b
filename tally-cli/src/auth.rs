use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};

use crate::config::Provider;
use crate::state::ensure_tally_home;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthState {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
}

impl AuthState {
    fn slot(&mut self, provider: Provider) -> &mut Option<String> {
        match provider {
            Provider::OpenAI => &mut self.openai_api_key,
            Provider::Anthropic => &mut self.anthropic_api_key,
            Provider::Gemini => &mut self.gemini_api_key,
        }
    }

    fn stored(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::OpenAI => self.openai_api_key.as_deref(),
            Provider::Anthropic => self.anthropic_api_key.as_deref(),
            Provider::Gemini => self.gemini_api_key.as_deref(),
        }
    }
}

fn auth_path() -> Result<std::path::PathBuf> {
    Ok(ensure_tally_home()?.join("auth.json"))
}

pub fn load_auth() -> Result<AuthState> {
    let p = auth_path()?;
    if !p.exists() {
        return Ok(AuthState::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_auth(auth: &AuthState) -> Result<()> {
    let p = auth_path()?;
    let s = serde_json::to_string_pretty(auth)?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

/// API key for `provider`: environment first, then auth.json.
pub fn api_key(provider: Provider) -> Result<Option<String>> {
    if let Ok(key) = std::env::var(provider.api_key_env()) {
        if !key.trim().is_empty() {
            return Ok(Some(key.trim().to_string()));
        }
    }
    let auth = load_auth()?;
    Ok(auth.stored(provider).map(str::to_string))
}

fn prompt_secret(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

/// Read a key from stdin and store it in auth.json.
pub fn paste_key(provider: Provider) -> Result<()> {
    let mut auth = load_auth()?;
    let key = prompt_secret(&format!("Paste {} API key", provider.name()))?;
    if key.is_empty() {
        bail!("no key entered");
    }
    if provider == Provider::Anthropic && !key.starts_with("sk-ant-") {
        bail!("key didn't look like an Anthropic key (expected prefix sk-ant-)");
    }
    *auth.slot(provider) = Some(key);
    save_auth(&auth)?;
    println!("Saved {} API key to auth.json", provider.name());
    Ok(())
}
