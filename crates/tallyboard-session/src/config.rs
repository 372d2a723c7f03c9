//! Sidebar configuration.

use serde::{Deserialize, Serialize};
use tallyboard_protocol::{Era, format::CODE_CHARS};

/// Configuration shared by every session a manager creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Most lines a sidebar may hold. The client renders 15.
    pub max_lines: usize,

    /// Whether title and line lengths are capped (32 and 30 characters).
    ///
    /// `None` derives it from the era: capped before 1.13. Set it when a
    /// protocol-bridging proxy sits between the host and its clients and
    /// the clients' limits differ from the host's.
    pub legacy_text_limits: Option<bool>,
}

impl SessionConfig {
    /// The usable line count. Every line needs its own formatting code as
    /// an entry name, so this never exceeds the number of codes.
    pub fn line_capacity(&self) -> usize {
        self.max_lines.min(CODE_CHARS.len())
    }

    /// Whether text limits apply on `era`.
    pub fn has_text_limits(&self, era: Era) -> bool {
        self.legacy_text_limits.unwrap_or_else(|| era.is_legacy())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_lines: 15,
            legacy_text_limits: None,
        }
    }
}
