//! Client context captured alongside the timings.

use serde::{Deserialize, Serialize};

/// Width and height in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Device and network hints reported by the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceContext {
    /// Raw user agent string.
    pub user_agent: String,

    /// Approximate network class (e.g. "4g").
    #[serde(default)]
    pub connection_type: Option<String>,

    /// Device memory hint in GiB.
    #[serde(default)]
    pub device_memory: Option<f64>,

    #[serde(default)]
    pub viewport: Option<Dimensions>,

    #[serde(default)]
    pub screen: Option<Dimensions>,

    /// Preferred locale (e.g. "en-US").
    #[serde(default)]
    pub language: Option<String>,
}
