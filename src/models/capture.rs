use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::estimator::{determine_category, estimate_tokens};
use crate::models::AiTool;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CaptureType {
    Prompt,
    Response,
}

impl CaptureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureType::Prompt => "prompt",
            CaptureType::Response => "response",
        }
    }

    pub fn from_str(value: &str) -> Result<Self> {
        match value {
            "prompt" => Ok(CaptureType::Prompt),
            "response" => Ok(CaptureType::Response),
            _ => Err(anyhow!("unknown capture type '{value}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Category {
    Security,
    Code,
    Cloud,
    #[serde(rename = "AI/ML")]
    AiMl,
    Data,
    General,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Security => "Security",
            Category::Code => "Code",
            Category::Cloud => "Cloud",
            Category::AiMl => "AI/ML",
            Category::Data => "Data",
            Category::General => "General",
        }
    }

    pub fn from_str(value: &str) -> Result<Self> {
        match value {
            "Security" => Ok(Category::Security),
            "Code" => Ok(Category::Code),
            "Cloud" => Ok(Category::Cloud),
            "AI/ML" => Ok(Category::AiMl),
            "Data" => Ok(Category::Data),
            "General" => Ok(Category::General),
            _ => Err(anyhow!("unknown category '{value}'")),
        }
    }
}

/// One persisted prompt or response. Immutable once stored; the store is the
/// sole owner after append.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: CaptureType,
    pub content: String,
    pub ai_tool: AiTool,
    pub timestamp: DateTime<Utc>,
    pub session_url: String,
    pub tokens: u32,
    pub category: Category,
}

impl CaptureRecord {
    /// Builds a record from captured text, running both estimators.
    /// Content is stored trimmed.
    pub fn new(kind: CaptureType, content: &str, ai_tool: AiTool, session_url: &str) -> Self {
        let content = content.trim().to_string();
        let tokens = estimate_tokens(&content);
        let category = determine_category(&content);

        Self {
            id: generate_id(),
            kind,
            content,
            ai_tool,
            timestamp: Utc::now(),
            session_url: session_url.to_string(),
            tokens,
            category,
        }
    }
}

/// Millisecond timestamp plus a 4-digit random suffix. Unique enough for a
/// single-owner store; never reused once issued.
fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("{millis}{suffix:04}")
}

/// Derived on demand from the store, never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub tokens: u64,
}
