use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use mint_core::pipeline::{PipelineOptions, DEFAULT_PREVIEW_PAGES};
use mint_core::{DOWNLOAD_COST, MIN_WITHDRAWAL, SIGNUP_BONUS};

/// Largest document body the HTTP surface accepts by default (64 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub s3_endpoint: String,
    pub s3_bucket: String,
    pub s3_region: String,
    pub download_cost: i64,
    pub signup_bonus: i64,
    pub min_withdrawal: i64,
    pub preview_pages: usize,
    pub watermark_text: String,
    pub brand_asset: Option<PathBuf>,
    pub storage_timeout: Duration,
    pub max_retries: u32,
    pub max_upload_bytes: usize,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok(); // Load .env if present

        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,

            s3_endpoint: env::var("S3_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:9000".to_string()),

            s3_bucket: env::var("S3_BUCKET")
                .unwrap_or_else(|_| "studymint-documents".to_string()),

            s3_region: env::var("AWS_REGION")
                .unwrap_or_else(|_| "us-east-1".to_string()),

            download_cost: parsed("MINT_DOWNLOAD_COST", DOWNLOAD_COST)?,
            signup_bonus: parsed("MINT_SIGNUP_BONUS", SIGNUP_BONUS)?,
            min_withdrawal: parsed("MINT_MIN_WITHDRAWAL", MIN_WITHDRAWAL)?,
            preview_pages: parsed("MINT_PREVIEW_PAGES", DEFAULT_PREVIEW_PAGES)?,

            watermark_text: env::var("MINT_WATERMARK_TEXT")
                .unwrap_or_else(|_| "StudyMint".to_string()),

            brand_asset: env::var("MINT_BRAND_ASSET").ok().filter(|p| !p.trim().is_empty()).map(PathBuf::from),

            storage_timeout: Duration::from_secs(parsed("MINT_STORAGE_TIMEOUT_SECS", 10)?),
            max_retries: parsed("MINT_MAX_RETRIES", 3)?,
            max_upload_bytes: parsed("MINT_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,

            bind_addr: env::var("MINT_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        })
    }

    pub fn policy(&self) -> Policy {
        Policy {
            download_cost: self.download_cost,
            signup_bonus: self.signup_bonus,
            min_withdrawal: self.min_withdrawal,
            storage_timeout: self.storage_timeout,
            max_retries: self.max_retries,
        }
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            preview_pages: self.preview_pages,
            watermark_text: self.watermark_text.clone(),
            ..PipelineOptions::default()
        }
    }
}

fn parsed<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().with_context(|| format!("{} is not a valid value: {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}

/// Business and storage knobs the service enforces.
#[derive(Clone, Debug)]
pub struct Policy {
    pub download_cost: i64,
    pub signup_bonus: i64,
    pub min_withdrawal: i64,
    /// Upper bound on any single storage call.
    pub storage_timeout: Duration,
    /// Extra attempts for idempotent calls that failed transiently.
    pub max_retries: u32,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            download_cost: DOWNLOAD_COST,
            signup_bonus: SIGNUP_BONUS,
            min_withdrawal: MIN_WITHDRAWAL,
            storage_timeout: Duration::from_secs(10),
            max_retries: 3,
        }
    }
}
