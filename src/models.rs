//! Data models and structures
//!
//! Defines sessions, classification results, the JSON payloads returned by
//! the HTTP surface, and the runtime configuration.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;
use uuid::Uuid;

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_HF_MODEL_URL: &str =
    "https://api-inference.huggingface.co/models/stabilityai/stable-diffusion-xl-base-1.0";

static NON_WORD_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W+").expect("static regex is valid"));

/// Identifier minted once per upload. Only ever used to name files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Collapse every run of non-word characters to a single `_` and lowercase.
pub fn clean_filename(text: &str) -> String {
    NON_WORD_RUN.replace_all(text, "_").to_lowercase()
}

/// What the vision model thinks the cloud looks like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Trimmed, lowercased model output. Used verbatim in the generation prompt.
    pub label: String,
    /// Filename-safe form of `label`.
    pub token: String,
}

impl Classification {
    pub fn from_raw(raw: &str) -> Option<Self> {
        let label = raw.trim().to_lowercase();
        if label.is_empty() {
            return None;
        }
        let token = clean_filename(&label);
        Some(Self { label, token })
    }
}

/// Body returned by `POST /process-cloud`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessCloudResponse {
    pub session_id: String,
    pub detected_object: String,
    pub caption: String,
    pub original_image_url: String,
    pub generated_image_url: String,
    pub download_url: String,
}

impl ProcessCloudResponse {
    pub fn new(
        session_id: SessionId,
        classification: &Classification,
        generated_filename: &str,
        caption: &str,
    ) -> Self {
        Self {
            session_id: session_id.to_string(),
            detected_object: classification.label.clone(),
            caption: caption.to_string(),
            original_image_url: format!("/images/original/{}", session_id),
            generated_image_url: format!("/images/generated/{}", generated_filename),
            download_url: format!("/download/{}", generated_filename),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub services: ServiceStatus,
    pub directories: DirectoryStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceStatus {
    pub gemini: String,
    pub huggingface: String,
}

impl ServiceStatus {
    pub fn from_flags(gemini: bool, huggingface: bool) -> Self {
        let label = |configured: bool| {
            let text = if configured { "configured" } else { "missing" };
            text.to_string()
        };
        Self {
            gemini: label(gemini),
            huggingface: label(huggingface),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DirectoryStatus {
    pub uploads: String,
    pub generated: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub detail: String,
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub hf_token: String,
    pub hf_model_url: String,
    pub allowed_origins: Vec<String>,
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub upload_dir: PathBuf,
    pub generated_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| crate::Error::Config(format!("{} not set", key)))
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| crate::Error::Config(format!("Invalid PORT '{}': {}", raw, e)))?,
            None => 8000,
        };

        Ok(Self {
            gemini_api_key: required("GEMINI_API_KEY")?,
            gemini_model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            hf_token: required("HF_TOKEN")?,
            hf_model_url: lookup("HF_MODEL_URL").unwrap_or_else(|| DEFAULT_HF_MODEL_URL.to_string()),
            allowed_origins: parse_origins(
                &lookup("ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string()),
            ),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            debug: lookup("DEBUG")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            upload_dir: PathBuf::from(lookup("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string())),
            generated_dir: PathBuf::from(
                lookup("GENERATED_DIR").unwrap_or_else(|| "generated".to_string()),
            ),
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
