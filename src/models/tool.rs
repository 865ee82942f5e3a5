use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// The AI chat product a page belongs to, sniffed from its hostname.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AiTool {
    #[serde(rename = "ChatGPT")]
    ChatGpt,
    Gemini,
    Claude,
    Perplexity,
    Copilot,
    #[serde(rename = "Unknown AI")]
    Unknown,
}

impl AiTool {
    /// Classifies a hostname into a tool identity. Substring checks run in a
    /// fixed order, so e.g. `gemini.google.com` resolves before the generic
    /// Microsoft match could ever see it.
    pub fn from_host(host: &str) -> Self {
        let host = host.to_lowercase();
        if host.contains("openai") || host.contains("chatgpt") {
            AiTool::ChatGpt
        } else if host.contains("google") || host.contains("gemini") {
            AiTool::Gemini
        } else if host.contains("claude") || host.contains("anthropic") {
            AiTool::Claude
        } else if host.contains("perplexity") {
            AiTool::Perplexity
        } else if host.contains("microsoft") || host.contains("copilot") || host.contains("bing") {
            AiTool::Copilot
        } else {
            AiTool::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AiTool::ChatGpt => "ChatGPT",
            AiTool::Gemini => "Gemini",
            AiTool::Claude => "Claude",
            AiTool::Perplexity => "Perplexity",
            AiTool::Copilot => "Copilot",
            AiTool::Unknown => "Unknown AI",
        }
    }

    pub fn from_str(value: &str) -> Result<Self> {
        match value {
            "ChatGPT" => Ok(AiTool::ChatGpt),
            "Gemini" => Ok(AiTool::Gemini),
            "Claude" => Ok(AiTool::Claude),
            "Perplexity" => Ok(AiTool::Perplexity),
            "Copilot" => Ok(AiTool::Copilot),
            "Unknown AI" => Ok(AiTool::Unknown),
            _ => Err(anyhow!("unknown ai tool '{value}'")),
        }
    }
}

/// Extracts the hostname from a page URL, enough for [`AiTool::from_host`].
/// Not a general URL parser; scheme, path, port and userinfo are stripped.
pub fn host_of(url: &str) -> &str {
    let rest = match url.find("//") {
        Some(idx) => &url[idx + 2..],
        None => url,
    };
    let rest = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    let rest = rest.rsplit('@').next().unwrap_or(rest);
    rest.split(':').next().unwrap_or(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_hosts() {
        assert_eq!(AiTool::from_host("chatgpt.com"), AiTool::ChatGpt);
        assert_eq!(AiTool::from_host("chat.openai.com"), AiTool::ChatGpt);
        assert_eq!(AiTool::from_host("gemini.google.com"), AiTool::Gemini);
        assert_eq!(AiTool::from_host("claude.ai"), AiTool::Claude);
        assert_eq!(AiTool::from_host("www.anthropic.com"), AiTool::Claude);
        assert_eq!(AiTool::from_host("www.perplexity.ai"), AiTool::Perplexity);
        assert_eq!(AiTool::from_host("copilot.microsoft.com"), AiTool::Copilot);
        assert_eq!(AiTool::from_host("www.bing.com"), AiTool::Copilot);
        assert_eq!(AiTool::from_host("example.com"), AiTool::Unknown);
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(AiTool::from_host("ChatGPT.com"), AiTool::ChatGpt);
    }

    #[test]
    fn host_extraction() {
        assert_eq!(host_of("https://chatgpt.com/c/abc?x=1"), "chatgpt.com");
        assert_eq!(host_of("http://localhost:8080/chat"), "localhost");
        assert_eq!(host_of("claude.ai/new"), "claude.ai");
    }

    #[test]
    fn unknown_serializes_with_space() {
        let json = serde_json::to_string(&AiTool::Unknown).unwrap();
        assert_eq!(json, "\"Unknown AI\"");
    }
}
