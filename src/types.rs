//! Shared types for the screening pipeline.
//!
//! These types form the data model used across all modules: the two-turn
//! conversation submitted to the generation engine, the sampling options
//! that accompany it, and the order-aligned result table.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// Message author role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single role-tagged message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// An ordered two-message conversation: one system instruction followed by
/// one user question. Built once per input drug and consumed once by the
/// generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(system: String, user: String) -> Self {
        Self {
            messages: vec![
                ChatMessage {
                    role: Role::System,
                    content: system,
                },
                ChatMessage {
                    role: Role::User,
                    content: user,
                },
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Sampling options forwarded verbatim to the generation engine.
///
/// Defaults follow the Llama 3 generation reference: temperature 0.6,
/// nucleus threshold 0.9.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingOptions {
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            temperature: 0.6,
            top_p: 0.9,
            max_tokens: 4096,
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// The assembled result table: one entry per input drug, order-aligned.
///
/// `probabilities[i]` and `responses[i]` both correspond to input drug `i`;
/// a `None` probability records a response the parser could not extract a
/// numeric estimate from.
#[derive(Debug, Clone, Default)]
pub struct EstimateReport {
    pub probabilities: Vec<Option<f64>>,
    pub responses: Vec<String>,
}

impl EstimateReport {
    /// Number of result rows.
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Count of rows where parsing failed (null probability).
    pub fn null_count(&self) -> usize {
        self.probabilities.iter().filter(|p| p.is_none()).count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_shape() {
        let conv = Conversation::new("sys".into(), "ask".into());
        assert_eq!(conv.messages.len(), 2);
        assert_eq!(conv.messages[0].role, Role::System);
        assert_eq!(conv.messages[1].role, Role::User);
        assert_eq!(conv.messages[1].content, "ask");
    }

    #[test]
    fn test_role_serialises_lowercase() {
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    }

    #[test]
    fn test_sampling_defaults() {
        let s = SamplingOptions::default();
        assert!((s.temperature - 0.6).abs() < 1e-12);
        assert!((s.top_p - 0.9).abs() < 1e-12);
        assert_eq!(s.max_tokens, 4096);
    }

    #[test]
    fn test_report_null_count() {
        let report = EstimateReport {
            probabilities: vec![Some(0.5), None, Some(0.9), None],
            responses: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        };
        assert_eq!(report.len(), 4);
        assert_eq!(report.null_count(), 2);
    }
}
