use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use crate::analytics::{AnomalyOptions, DEFAULT_THRESHOLD, MAX_THRESHOLD};
use crate::models::currency;

pub(crate) const DEFAULT_CURRENCY: &str = "USD";
pub(crate) const DEFAULT_LOG_FILTER: &str = "warn";
const DEFAULT_BASELINE_MONTHS: u32 = 3;
const DEFAULT_RECENT_MONTHS: u32 = 1;
const DEFAULT_TREND_MONTHS: u32 = 6;
const DEFAULT_TOP_CATEGORIES: usize = 3;

/// Runtime settings. Every field can be overridden through a `FINDASH_*`
/// environment variable (or a `.env` file in the working directory).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub currency: String,
    pub anomaly: AnomalyOptions,
    pub trend_months: u32,
    pub top_categories: usize,
    pub log_filter: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        // A missing .env is the normal case.
        let _ = dotenvy::dotenv();
        let data_dir = default_data_dir()?;
        Self::from_lookup(data_dir, |key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        data_dir: PathBuf,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let db_path = lookup("FINDASH_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("findash.db"));

        let currency = lookup("FINDASH_CURRENCY")
            .map(|c| c.trim().to_uppercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        if !currency::is_supported(&currency) {
            bail!("Unsupported currency: {currency}");
        }

        let threshold = match lookup("FINDASH_ANOMALY_THRESHOLD") {
            Some(raw) => validate_threshold(
                raw.trim()
                    .parse()
                    .with_context(|| format!("Invalid FINDASH_ANOMALY_THRESHOLD: {raw}"))?,
            )?,
            None => DEFAULT_THRESHOLD,
        };

        let anomaly = AnomalyOptions {
            threshold,
            baseline_months: parse_positive(
                &lookup,
                "FINDASH_BASELINE_MONTHS",
                DEFAULT_BASELINE_MONTHS,
            )?,
            recent_months: parse_positive(&lookup, "FINDASH_RECENT_MONTHS", DEFAULT_RECENT_MONTHS)?,
        };

        Ok(Self {
            data_dir,
            db_path,
            currency,
            anomaly,
            trend_months: parse_positive(&lookup, "FINDASH_TREND_MONTHS", DEFAULT_TREND_MONTHS)?,
            top_categories: parse_positive(
                &lookup,
                "FINDASH_TOP_CATEGORIES",
                DEFAULT_TOP_CATEGORIES as u32,
            )? as usize,
            log_filter: lookup("FINDASH_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    pub fn currency_symbol(&self) -> &str {
        currency::symbol(&self.currency)
    }
}

/// Accept a user-supplied anomaly threshold in `(0, MAX_THRESHOLD]`.
pub(crate) fn validate_threshold(value: f64) -> Result<f64> {
    if value.is_nan() || value <= 0.0 || value > MAX_THRESHOLD {
        bail!("Threshold must be greater than 0 and at most {MAX_THRESHOLD}, got {value}");
    }
    Ok(value)
}

fn parse_positive(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u32,
) -> Result<u32> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let value: u32 = raw
        .trim()
        .parse()
        .with_context(|| format!("Invalid {key}: {raw}"))?;
    if value == 0 {
        bail!("{key} must be at least 1");
    }
    Ok(value)
}

fn default_data_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "findash", "FinDash")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(proj_dirs.data_dir().to_path_buf())
}
