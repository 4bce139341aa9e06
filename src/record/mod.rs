//! Per-page-view metrics record.
//!
//! # Responsibilities
//! - Define the document shipped to the collection endpoint
//! - Enforce per-field update rules as observations arrive
//! - Track field-level error markers for unsupported observations
//!
//! # Update Rules
//! ```text
//! ttfb, fcp, fid  → set once, never overwritten
//! lcp             → later candidate wins, never a smaller render time;
//!                   an observed value always replaces the load-event fallback
//! cls             → cumulative sum of layout shifts
//! inp             → replaced by the aggregated interaction value
//! ```

pub mod device;
pub mod metric;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use device::{DeviceContext, Dimensions};
pub use metric::MetricName;

/// Rendering strategy of the page being measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageType {
    #[serde(rename = "SSR")]
    Ssr,
    #[serde(rename = "CSR")]
    Csr,
}

impl PageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Ssr => "SSR",
            PageType::Csr => "CSR",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SSR" => Ok(PageType::Ssr),
            "CSR" => Ok(PageType::Csr),
            other => Err(format!("unknown page type '{}', expected SSR or CSR", other)),
        }
    }
}

/// Where the LCP value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LcpSource {
    /// Reported by a largest-contentful-paint observation.
    Observed,
    /// Derived from the load-event timestamp.
    LoadEventFallback,
}

/// Field-level markers for observations the client could not provide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttfb_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lcp_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fcp_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cls_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fid_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inp_error: Option<String>,
}

impl FieldErrors {
    fn slot(&mut self, metric: MetricName) -> &mut Option<String> {
        match metric {
            MetricName::Ttfb => &mut self.ttfb_error,
            MetricName::Lcp => &mut self.lcp_error,
            MetricName::Fcp => &mut self.fcp_error,
            MetricName::Cls => &mut self.cls_error,
            MetricName::Fid => &mut self.fid_error,
            MetricName::Inp => &mut self.inp_error,
        }
    }

    /// Error marker for `metric`, if any.
    pub fn get(&self, metric: MetricName) -> Option<&str> {
        let slot = match metric {
            MetricName::Ttfb => &self.ttfb_error,
            MetricName::Lcp => &self.lcp_error,
            MetricName::Fcp => &self.fcp_error,
            MetricName::Cls => &self.cls_error,
            MetricName::Fid => &self.fid_error,
            MetricName::Inp => &self.inp_error,
        };
        slot.as_deref()
    }
}

/// One page view's worth of performance telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRecord {
    pub id: Uuid,
    pub page_url: String,
    pub page_type: PageType,
    /// Capture time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub device: DeviceContext,

    pub ttfb: Option<f64>,
    pub lcp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lcp_source: Option<LcpSource>,
    pub fcp: Option<f64>,
    pub cls: Option<f64>,
    pub fid: Option<f64>,
    pub inp: Option<f64>,

    /// Set when the record left before every field arrived.
    #[serde(default)]
    pub incomplete: bool,

    #[serde(flatten)]
    pub errors: FieldErrors,
}

impl MetricsRecord {
    /// Start a record for a new page view.
    pub fn new(page_url: impl Into<String>, page_type: PageType, device: DeviceContext) -> Self {
        Self {
            id: Uuid::new_v4(),
            page_url: page_url.into(),
            page_type,
            timestamp: chrono::Utc::now().timestamp_millis(),
            device,
            ttfb: None,
            lcp: None,
            lcp_source: None,
            fcp: None,
            cls: None,
            fid: None,
            inp: None,
            incomplete: false,
            errors: FieldErrors::default(),
        }
    }

    /// Current value of `metric`.
    pub fn get(&self, metric: MetricName) -> Option<f64> {
        match metric {
            MetricName::Ttfb => self.ttfb,
            MetricName::Lcp => self.lcp,
            MetricName::Fcp => self.fcp,
            MetricName::Cls => self.cls,
            MetricName::Fid => self.fid,
            MetricName::Inp => self.inp,
        }
    }

    /// Record TTFB. Returns false if it was already set or the value is invalid.
    pub fn set_ttfb(&mut self, value: f64) -> bool {
        set_once(&mut self.ttfb, value)
    }

    /// Record FCP. Returns false if it was already set or the value is invalid.
    pub fn set_fcp(&mut self, value: f64) -> bool {
        set_once(&mut self.fcp, value)
    }

    /// Record FID. Returns false if it was already set or the value is invalid.
    pub fn set_fid(&mut self, value: f64) -> bool {
        set_once(&mut self.fid, value)
    }

    /// Offer an LCP candidate.
    pub fn offer_lcp(&mut self, value: f64, source: LcpSource) -> bool {
        if !is_valid(value) {
            return false;
        }
        let accept = match (self.lcp, self.lcp_source, source) {
            (None, _, _) => true,
            (Some(_), Some(LcpSource::Observed), LcpSource::LoadEventFallback) => false,
            (Some(_), Some(LcpSource::LoadEventFallback), LcpSource::Observed) => true,
            (Some(current), _, _) => value >= current,
        };
        if accept {
            self.lcp = Some(value);
            self.lcp_source = Some(source);
        }
        accept
    }

    /// Add one layout shift score to the running CLS total.
    pub fn add_layout_shift(&mut self, score: f64) -> bool {
        if !is_valid(score) {
            return false;
        }
        self.cls = Some(self.cls.unwrap_or(0.0) + score);
        true
    }

    /// Replace INP with a freshly aggregated value.
    pub fn set_inp(&mut self, value: f64) -> bool {
        if !is_valid(value) {
            return false;
        }
        self.inp = Some(value);
        true
    }

    /// Mark `metric` as unavailable on this client.
    pub fn mark_unsupported(&mut self, metric: MetricName, reason: impl Into<String>) {
        *self.errors.slot(metric) = Some(reason.into());
    }

    /// A metric is settled once it has a value or an error marker.
    pub fn is_settled(&self, metric: MetricName) -> bool {
        self.get(metric).is_some() || self.errors.get(metric).is_some()
    }

    /// Metrics that are neither measured nor marked unsupported.
    pub fn missing(&self) -> Vec<MetricName> {
        MetricName::ALL
            .iter()
            .copied()
            .filter(|m| !self.is_settled(*m))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

fn is_valid(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn set_once(slot: &mut Option<f64>, value: f64) -> bool {
    if slot.is_some() || !is_valid(value) {
        return false;
    }
    *slot = Some(value);
    true
}
