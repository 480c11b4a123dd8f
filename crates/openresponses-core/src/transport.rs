//! Wire transports and rollout modes.

use crate::error::GatewayError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wire transport used to reach the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Server-sent events streaming baseline, always available
    Sse,
    /// Duplex socket transport
    Websocket,
}

impl TransportKind {
    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sse => "sse",
            Self::Websocket => "websocket",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportKind {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sse" => Ok(Self::Sse),
            "websocket" => Ok(Self::Websocket),
            _ => Err(GatewayError::UnknownVariant {
                kind: "transport",
                value: s.to_string(),
            }),
        }
    }
}

/// Requested rollout mode from the transport policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    /// Always use SSE
    #[default]
    Sse,
    /// Use the socket transport whenever the model supports it
    Websocket,
    /// Canary rollout of the socket transport
    Auto,
}

impl TransportMode {
    /// All modes accepted by the policy
    pub const ALL: [Self; 3] = [Self::Sse, Self::Websocket, Self::Auto];

    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sse => "sse",
            Self::Websocket => "websocket",
            Self::Auto => "auto",
        }
    }

    /// Parse a mode name, ignoring case and surrounding whitespace
    #[must_use]
    pub fn parse_lenient(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sse" => Some(Self::Sse),
            "websocket" => Some(Self::Websocket),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = GatewayError;

    /// Strict parse: exact lowercase names only
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| GatewayError::UnknownVariant {
                kind: "transport mode",
                value: s.to_string(),
            })
    }
}
