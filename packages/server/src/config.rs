use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;

/// Approval threshold used when `APPROVAL_MIN_COUNT` is not set.
pub const DEFAULT_APPROVAL_MIN_COUNT: i32 = 3;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Minimum number of approvals before a review counts as approved
    pub approval_min_count: i32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            approval_min_count: parse_approval_min_count(env::var("APPROVAL_MIN_COUNT").ok())?,
        })
    }
}

/// Parse the approval threshold, falling back to the default when unset.
pub fn parse_approval_min_count(raw: Option<String>) -> Result<i32> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_APPROVAL_MIN_COUNT);
    };

    let count: i32 = raw
        .trim()
        .parse()
        .context("APPROVAL_MIN_COUNT must be a valid number")?;
    if count < 0 {
        bail!("APPROVAL_MIN_COUNT must not be negative (got {})", count);
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_min_count_uses_default() {
        assert_eq!(
            parse_approval_min_count(None).unwrap(),
            DEFAULT_APPROVAL_MIN_COUNT
        );
    }

    #[test]
    fn test_min_count_is_parsed() {
        assert_eq!(parse_approval_min_count(Some(" 2 ".into())).unwrap(), 2);
        assert_eq!(parse_approval_min_count(Some("0".into())).unwrap(), 0);
    }

    #[test]
    fn test_invalid_min_count_is_rejected() {
        assert!(parse_approval_min_count(Some("two".into())).is_err());
        assert!(parse_approval_min_count(Some("-1".into())).is_err());
    }
}
