//! Uniform metric registration over a performance source.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::observers::capabilities::Capabilities;
use crate::observers::entry::{EntryType, PerformanceEntry};
use crate::observers::source::PerformanceSource;
use crate::record::{LcpSource, MetricName};

/// Errors raised while registering an observer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObserverError {
    /// The client cannot observe this entry type.
    #[error("{0} observation unsupported")]
    Unsupported(EntryType),
}

/// A normalized value produced by an observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observation {
    Ttfb(f64),
    Fcp(f64),
    Lcp { value: f64, source: LcpSource },
    Fid(f64),
    Interaction { id: u64, duration: f64 },
    LayoutShift(f64),
}

impl Observation {
    pub fn metric(&self) -> MetricName {
        match self {
            Observation::Ttfb(_) => MetricName::Ttfb,
            Observation::Fcp(_) => MetricName::Fcp,
            Observation::Lcp { .. } => MetricName::Lcp,
            Observation::Fid(_) => MetricName::Fid,
            Observation::Interaction { .. } => MetricName::Inp,
            Observation::LayoutShift(_) => MetricName::Cls,
        }
    }
}

/// Entry type that feeds `metric`.
pub fn entry_type_for(metric: MetricName) -> EntryType {
    match metric {
        MetricName::Ttfb => EntryType::Navigation,
        MetricName::Fcp => EntryType::Paint,
        MetricName::Lcp => EntryType::LargestContentfulPaint,
        MetricName::Fid => EntryType::FirstInput,
        MetricName::Inp => EntryType::Event,
        MetricName::Cls => EntryType::LayoutShift,
    }
}

/// Turn a raw entry into an observation for `metric`, if it carries one.
pub fn normalize(metric: MetricName, entry: &PerformanceEntry) -> Option<Observation> {
    match (metric, entry) {
        (MetricName::Ttfb, PerformanceEntry::Navigation(t)) => {
            let ttfb = t.response_start - t.request_start;
            (ttfb >= 0.0).then_some(Observation::Ttfb(ttfb))
        }
        (MetricName::Fcp, PerformanceEntry::Paint { name, start_time })
            if name == "first-contentful-paint" =>
        {
            Some(Observation::Fcp(*start_time))
        }
        (MetricName::Lcp, PerformanceEntry::LargestContentfulPaint { start_time }) => {
            Some(Observation::Lcp {
                value: *start_time,
                source: LcpSource::Observed,
            })
        }
        (MetricName::Fid, PerformanceEntry::FirstInput { start_time, processing_start }) => {
            let delay = processing_start - start_time;
            (delay >= 0.0).then_some(Observation::Fid(delay))
        }
        (MetricName::Inp, PerformanceEntry::Event { interaction_id: Some(id), duration })
            if *id > 0 =>
        {
            Some(Observation::Interaction {
                id: *id,
                duration: *duration,
            })
        }
        (MetricName::Cls, PerformanceEntry::LayoutShift { value, had_recent_input: false }) => {
            Some(Observation::LayoutShift(*value))
        }
        _ => None,
    }
}

/// Cancels its subscription when dropped.
#[derive(Debug)]
pub struct ObserverHandle {
    metric: MetricName,
    task: JoinHandle<()>,
}

impl ObserverHandle {
    pub fn metric(&self) -> MetricName {
        self.metric
    }
}

impl Drop for ObserverHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// All observers of one page view, released together.
#[derive(Debug, Default)]
pub struct ObserverGroup {
    handles: Vec<ObserverHandle>,
}

impl ObserverGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, handle: ObserverHandle) {
        self.handles.push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Detach every observer now.
    pub fn release(&mut self) {
        let released = self.handles.len();
        self.handles.clear();
        tracing::debug!(released, "Observers detached");
    }
}

/// Register interest in `metric`.
///
/// Buffered entries are replayed before live ones. `on_value` receives zero
/// or more observations until the handle is dropped or the source closes.
pub fn observe(
    source: &dyn PerformanceSource,
    capabilities: &Capabilities,
    metric: MetricName,
    on_value: mpsc::UnboundedSender<Observation>,
) -> Result<ObserverHandle, ObserverError> {
    let kind = entry_type_for(metric);
    if !capabilities.supports(kind) {
        return Err(ObserverError::Unsupported(kind));
    }
    let stream = source.entries(kind).ok_or(ObserverError::Unsupported(kind))?;

    let task = tokio::spawn(async move {
        for entry in &stream.buffered {
            if let Some(obs) = normalize(metric, entry) {
                if on_value.send(obs).is_err() {
                    return;
                }
            }
        }

        let mut live = stream.live;
        while let Some(entry) = live.recv().await {
            if let Some(obs) = normalize(metric, &entry) {
                if on_value.send(obs).is_err() {
                    return;
                }
            }
        }
    });

    Ok(ObserverHandle { metric, task })
}

/// Derive LCP from the load-event timestamp after `grace`.
///
/// Yields nothing if the load event has not completed by then.
pub fn spawn_lcp_fallback(
    source: Arc<dyn PerformanceSource>,
    grace: Duration,
    on_value: mpsc::UnboundedSender<Observation>,
) -> ObserverHandle {
    let task = tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        match source.navigation_timing().map(|t| t.load_event_end) {
            Some(load_end) if load_end > 0.0 => {
                tracing::debug!(load_end, "Using load-event LCP fallback");
                let _ = on_value.send(Observation::Lcp {
                    value: load_end,
                    source: LcpSource::LoadEventFallback,
                });
            }
            _ => tracing::debug!("No load-event timing for LCP fallback"),
        }
    });
    ObserverHandle {
        metric: MetricName::Lcp,
        task,
    }
}
