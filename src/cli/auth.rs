//! `auth` and `deauth` commands: manage the access token in the keyring.

use std::fmt;
use std::io::{self, BufRead, Write};

use tracing::info;

use crate::core::config::printing::mask_secret;
use crate::core::keyring::TokenStore;

const TOKEN_PROMPT: &str = "Enter your access token: ";

#[derive(Debug, Clone)]
pub struct AuthError {
    message: String,
}

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AuthError {}

/// Trim a pasted token and reject empty input.
pub fn parse_token(input: &str) -> Result<String, AuthError> {
    let token = input.trim();
    if token.is_empty() {
        return Err(AuthError::new("Token cannot be empty"));
    }
    if token.chars().any(char::is_whitespace) {
        return Err(AuthError::new("Token must not contain whitespace"));
    }
    Ok(token.to_string())
}

fn read_token(mut input: impl BufRead) -> Result<String, AuthError> {
    eprint!("{TOKEN_PROMPT}");
    io::stderr()
        .flush()
        .map_err(|e| AuthError::new(e.to_string()))?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(|e| AuthError::new(format!("Failed to read input: {e}")))?;
    parse_token(&line)
}

pub fn run_auth(env_only: bool) -> Result<(), AuthError> {
    if env_only {
        return Err(AuthError::new(
            "--env-only disables the keyring; set BEAUTYDESK_ACCESS_TOKEN instead",
        ));
    }

    println!("🔐 beautydesk authentication");
    let token = read_token(io::stdin().lock())?;

    TokenStore::new()
        .set_token(&token)
        .map_err(|e| AuthError::new(e.to_string()))?;
    info!("access token stored in keyring");
    println!("✅ Stored access token {}", mask_secret(&token));
    Ok(())
}

pub fn run_deauth(env_only: bool) -> Result<(), AuthError> {
    if env_only {
        return Err(AuthError::new("--env-only disables the keyring"));
    }

    let removed = TokenStore::new()
        .delete_token()
        .map_err(|e| AuthError::new(e.to_string()))?;
    if removed {
        info!("access token removed from keyring");
        println!("✅ Removed access token from keyring");
    } else {
        println!("No access token was stored.");
    }
    Ok(())
}
