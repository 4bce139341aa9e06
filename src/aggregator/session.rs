//! Page-view session: observation loop, finalization and delivery.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use uuid::Uuid;

use crate::aggregator::latch::SendLatch;
use crate::aggregator::policy::ReadinessPolicy;
use crate::config::CollectorConfig;
use crate::delivery::{DeliveryClient, DeliveryOutcome};
use crate::observability::metrics;
use crate::observers::{
    observe, spawn_lcp_fallback, Capabilities, InteractionSamples, Observation, ObserverError,
    ObserverGroup, PerformanceSource,
};
use crate::record::{MetricName, MetricsRecord, PageType};

/// Timers and policy for one page view.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub session_timeout: Duration,
    pub interaction_wait: Duration,
    pub interaction_wait_max: Duration,
    pub lcp_grace: Duration,
    pub policy: ReadinessPolicy,
}

impl From<&CollectorConfig> for SessionSettings {
    fn from(config: &CollectorConfig) -> Self {
        Self {
            session_timeout: Duration::from_millis(config.session_timeout_ms),
            interaction_wait: Duration::from_millis(config.interaction_wait_ms),
            interaction_wait_max: Duration::from_millis(config.interaction_wait_max_ms),
            lcp_grace: Duration::from_millis(config.lcp_grace_ms),
            policy: config.readiness,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&CollectorConfig::default())
    }
}

/// What caused the record to be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeTrigger {
    /// The readiness policy was satisfied.
    Ready,
    /// The session-wide timeout elapsed.
    SessionTimeout,
    /// The post-interaction wait ended, with or without an INP sample.
    Interaction,
}

impl FinalizeTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalizeTrigger::Ready => "ready",
            FinalizeTrigger::SessionTimeout => "session_timeout",
            FinalizeTrigger::Interaction => "interaction",
        }
    }
}

impl fmt::Display for FinalizeTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signals from the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// The user interacted with the page.
    Interaction,
    /// The page navigated away or unmounted.
    Teardown,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// The record was finalized and handed to delivery.
    Finalized {
        trigger: FinalizeTrigger,
        record: MetricsRecord,
        delivery: DeliveryOutcome,
    },
    /// The page went away before delivery finished.
    Abandoned { record_id: Uuid },
}

/// The explicit per-page-view state that observations are applied to.
#[derive(Debug)]
pub struct PageViewContext {
    record: MetricsRecord,
    samples: InteractionSamples,
    policy: ReadinessPolicy,
    latch: Arc<SendLatch>,
}

impl PageViewContext {
    pub fn new(record: MetricsRecord, policy: ReadinessPolicy) -> Self {
        Self {
            record,
            samples: InteractionSamples::new(),
            policy,
            latch: Arc::new(SendLatch::new()),
        }
    }

    pub fn record(&self) -> &MetricsRecord {
        &self.record
    }

    pub fn latch(&self) -> Arc<SendLatch> {
        self.latch.clone()
    }

    pub fn mark_unsupported(&mut self, metric: MetricName, error: &ObserverError) {
        self.record.mark_unsupported(metric, error.to_string());
    }

    /// Apply one observation. Returns true once the readiness policy holds.
    pub fn apply(&mut self, observation: Observation) -> bool {
        if self.latch.is_claimed() {
            return false;
        }
        let updated = match observation {
            Observation::Ttfb(v) => self.record.set_ttfb(v),
            Observation::Fcp(v) => self.record.set_fcp(v),
            Observation::Lcp { value, source } => self.record.offer_lcp(value, source),
            Observation::Fid(v) => self.record.set_fid(v),
            Observation::LayoutShift(v) => self.record.add_layout_shift(v),
            Observation::Interaction { id, duration } => {
                self.samples.record(id, duration);
                self.samples
                    .value()
                    .map(|inp| self.record.set_inp(inp))
                    .unwrap_or(false)
            }
        };
        if updated {
            tracing::trace!(
                record_id = %self.record.id,
                metric = %observation.metric(),
                "Record updated"
            );
        }
        self.policy.is_ready(&self.record)
    }

    /// Claim the send latch and produce the record to transmit.
    ///
    /// Returns `None` if another path already finalized this page view.
    pub fn finalize(&mut self, trigger: FinalizeTrigger) -> Option<MetricsRecord> {
        if !self.latch.try_claim() {
            tracing::debug!(record_id = %self.record.id, trigger = %trigger, "Already finalized");
            return None;
        }
        let mut record = self.record.clone();
        record.incomplete = trigger == FinalizeTrigger::SessionTimeout || !record.is_complete();
        Some(record)
    }
}

/// Host-side handle to a running page view.
#[derive(Debug, Clone)]
pub struct PageViewHandle {
    signals: mpsc::UnboundedSender<Signal>,
    latch: Arc<SendLatch>,
    record_id: Uuid,
}

impl PageViewHandle {
    /// Report a user interaction.
    pub fn interaction(&self) {
        let _ = self.signals.send(Signal::Interaction);
    }

    /// Cancel timers, detach observers and abandon any in-flight delivery.
    ///
    /// Dropping every clone of the handle has the same effect.
    pub fn teardown(&self) {
        let _ = self.signals.send(Signal::Teardown);
    }

    /// Whether the record has been handed to delivery.
    pub fn is_sent(&self) -> bool {
        self.latch.is_claimed()
    }

    pub fn record_id(&self) -> Uuid {
        self.record_id
    }
}

#[derive(Debug, Clone, Copy)]
struct InteractionWindow {
    opened: Instant,
    deadline: Instant,
}

/// One page view, from first observation to delivery.
pub struct PageView {
    context: PageViewContext,
    source: Arc<dyn PerformanceSource>,
    capabilities: Capabilities,
    settings: SessionSettings,
    signals: mpsc::UnboundedReceiver<Signal>,
}

impl PageView {
    /// Detect capabilities and create the record for a new page view.
    pub fn start(
        source: Arc<dyn PerformanceSource>,
        page_url: impl Into<String>,
        page_type: PageType,
        settings: SessionSettings,
    ) -> (Self, PageViewHandle) {
        let capabilities = Capabilities::detect(source.as_ref());
        let record = MetricsRecord::new(page_url, page_type, capabilities.device.clone());
        let context = PageViewContext::new(record, settings.policy);
        let (tx, rx) = mpsc::unbounded_channel();

        let handle = PageViewHandle {
            signals: tx,
            latch: context.latch(),
            record_id: context.record().id,
        };
        let view = Self {
            context,
            source,
            capabilities,
            settings,
            signals: rx,
        };
        (view, handle)
    }

    pub fn context(&self) -> &PageViewContext {
        &self.context
    }

    /// Observe until a finalization trigger fires, then deliver once.
    pub async fn run(mut self, delivery: &DeliveryClient) -> SessionOutcome {
        let record_id = self.context.record().id;
        let started = Instant::now();
        tracing::info!(
            record_id = %record_id,
            page_url = %self.context.record().page_url,
            page_type = %self.context.record().page_type,
            policy = ?self.settings.policy,
            "Page view started"
        );

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut observers = self.register_observers(tx);

        let session_deadline = tokio::time::sleep(self.settings.session_timeout);
        tokio::pin!(session_deadline);

        let mut window: Option<InteractionWindow> = None;
        let mut observing = true;

        let trigger = loop {
            let interaction_deadline = window.map(|w| w.deadline);

            tokio::select! {
                maybe = rx.recv(), if observing => match maybe {
                    Some(observation) => {
                        let is_sample = matches!(observation, Observation::Interaction { .. });
                        let is_input = matches!(observation, Observation::Fid(_));
                        if self.context.apply(observation) {
                            break FinalizeTrigger::Ready;
                        }
                        if is_sample && window.is_some() {
                            break FinalizeTrigger::Interaction;
                        }
                        if is_input {
                            self.open_or_extend(&mut window);
                        }
                    }
                    None => observing = false,
                },
                signal = self.signals.recv() => match signal {
                    Some(Signal::Interaction) => self.open_or_extend(&mut window),
                    Some(Signal::Teardown) | None => {
                        observers.release();
                        tracing::info!(record_id = %record_id, "Page view torn down before finalization");
                        return SessionOutcome::Abandoned { record_id };
                    }
                },
                _ = &mut session_deadline => break FinalizeTrigger::SessionTimeout,
                _ = sleep_until_deadline(interaction_deadline), if interaction_deadline.is_some() => {
                    break FinalizeTrigger::Interaction;
                }
            }
        };

        observers.release();
        metrics::record_finalized(trigger.as_str());

        let Some(mut record) = self.context.finalize(trigger) else {
            return SessionOutcome::Abandoned { record_id };
        };
        tracing::info!(
            record_id = %record_id,
            trigger = %trigger,
            incomplete = record.incomplete,
            missing = ?record.missing(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Page view finalized"
        );

        let outcome = tokio::select! {
            outcome = delivery.deliver(&mut record) => outcome,
            _ = wait_for_teardown(&mut self.signals) => {
                tracing::info!(record_id = %record_id, "Page view torn down, abandoning delivery");
                return SessionOutcome::Abandoned { record_id };
            }
        };

        SessionOutcome::Finalized {
            trigger,
            record,
            delivery: outcome,
        }
    }

    fn register_observers(&mut self, tx: mpsc::UnboundedSender<Observation>) -> ObserverGroup {
        let mut group = ObserverGroup::new();
        for metric in MetricName::ALL {
            match observe(self.source.as_ref(), &self.capabilities, metric, tx.clone()) {
                Ok(handle) => group.push(handle),
                Err(e) => {
                    tracing::info!(
                        record_id = %self.context.record().id,
                        metric = %metric,
                        error = %e,
                        "Metric unavailable on this client"
                    );
                    self.context.mark_unsupported(metric, &e);
                    if metric == MetricName::Lcp {
                        group.push(spawn_lcp_fallback(
                            self.source.clone(),
                            self.settings.lcp_grace,
                            tx.clone(),
                        ));
                    }
                }
            }
        }
        group
    }

    /// Start the post-interaction wait, or push its deadline out (bounded).
    fn open_or_extend(&self, window: &mut Option<InteractionWindow>) {
        if !self.settings.policy.is_interaction_driven() {
            return;
        }
        let now = Instant::now();
        match window {
            None => {
                *window = Some(InteractionWindow {
                    opened: now,
                    deadline: now + self.settings.interaction_wait,
                });
            }
            Some(w) => {
                let cap = w.opened + self.settings.interaction_wait_max;
                w.deadline = (now + self.settings.interaction_wait).min(cap);
            }
        }
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(d).await,
        None => std::future::pending().await,
    }
}

async fn wait_for_teardown(signals: &mut mpsc::UnboundedReceiver<Signal>) {
    loop {
        match signals.recv().await {
            Some(Signal::Interaction) => continue,
            Some(Signal::Teardown) | None => return,
        }
    }
}
