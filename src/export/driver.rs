use crate::datamodel::{
    Channel, Device, EnergyUnit, Metric, Sample, Scale, ScaleError, Series, SyncDateTime,
};
use crate::storage::{StorageInstance, resolve_resume_point};
use crate::vue::{HistoryQuery, UsageApi, fetch_history};
use anyhow::{Context, Result};
use chrono::TimeDelta;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_FLUSH_THRESHOLD: usize = 1000;
pub const DEFAULT_METRIC_NAME: &str = "vue_kwh";

/// Pushed in place of an empty channel name.
const TOTAL_CHANNEL_NAME: &str = "__total__";

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub scale: Scale,
    pub energy_unit: EnergyUnit,
    /// Samples buffered before a push.
    pub flush_threshold: usize,
    pub metric_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            scale: Scale::Minute,
            energy_unit: EnergyUnit::KilowattHours,
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
            metric_name: DEFAULT_METRIC_NAME.to_string(),
        }
    }
}

/// Step of a channel export, carried in errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    ResolveWindow,
    Fetch,
    Push,
    Flush,
}

impl fmt::Display for ExportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self {
            ExportPhase::ResolveWindow => "resolving the export window",
            ExportPhase::Fetch => "fetching history",
            ExportPhase::Push => "pushing a batch",
            ExportPhase::Flush => "flushing the last batch",
        };
        f.write_str(phase)
    }
}

#[derive(Error, Debug)]
#[error("Export of {selector} failed while {phase}")]
pub struct ChannelError {
    pub selector: String,
    pub phase: ExportPhase,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl ChannelError {
    fn new(
        selector: &str,
        phase: ExportPhase,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            selector: selector.to_string(),
            phase,
            source: Box::new(source),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelReport {
    pub selector: String,
    pub new_samples: usize,
    pub pushes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportSummary {
    pub channels: Vec<ChannelReport>,
}

impl ExportSummary {
    pub fn new_samples(&self) -> usize {
        self.channels.iter().map(|c| c.new_samples).sum()
    }

    pub fn pushes(&self) -> usize {
        self.channels.iter().map(|c| c.pushes).sum()
    }
}

/// Copies the missing tail of every channel's history into the store.
pub struct ExportDriver {
    api: Arc<dyn UsageApi>,
    storage: Arc<dyn StorageInstance>,
    options: ExportOptions,
    step: TimeDelta,
}

impl ExportDriver {
    /// Fails when history cannot be fetched at the configured scale, before
    /// any request is made.
    pub fn new(
        api: Arc<dyn UsageApi>,
        storage: Arc<dyn StorageInstance>,
        mut options: ExportOptions,
    ) -> Result<Self, ScaleError> {
        options.scale.validate_for_history()?;
        let step = options.scale.duration()?;
        options.flush_threshold = options.flush_threshold.max(1);
        Ok(Self {
            api,
            storage,
            options,
            step,
        })
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Identity used to find what the store already holds.
    pub fn series_identity(&self, channel: &Channel) -> Metric {
        Metric::new(self.options.metric_name.as_str())
            .with_label("dev_gid", channel.device_gid.to_string())
            .with_label("chan", channel.channel_num.as_str())
            .with_label("scale", self.options.scale.as_str())
    }

    /// Identity plus the descriptive labels written with the samples.
    pub fn pushed_metric(&self, channel: &Channel) -> Metric {
        let name = match channel.display_name() {
            "" => TOTAL_CHANNEL_NAME,
            name => name,
        };
        self.series_identity(channel)
            .with_label("name", name)
            .with_label("chan_mult", channel.channel_multiplier.to_string())
    }

    /// Exports every channel of every device, one after the other. The first
    /// failing channel stops the pass.
    pub async fn export_all(
        &self,
        devices: &[Device],
        since: SyncDateTime,
        until: SyncDateTime,
    ) -> Result<ExportSummary> {
        let mut summary = ExportSummary::default();
        for device in devices {
            for channel in device.all_channels() {
                let report = self
                    .export_channel(channel, since, until)
                    .await
                    .with_context(|| {
                        format!(
                            "Failed to export channel {:?} of device {}",
                            channel.channel_num, device.device_gid
                        )
                    })?;
                summary.channels.push(report);
            }
        }
        Ok(summary)
    }

    pub async fn export_channel(
        &self,
        channel: &Channel,
        since: SyncDateTime,
        until: SyncDateTime,
    ) -> Result<ChannelReport, ChannelError> {
        let identity = self.series_identity(channel);
        let selector = identity.selector();

        let start = resolve_resume_point(
            self.storage.as_ref(),
            &identity,
            since,
            until,
            self.options.scale,
        )
        .await
        .map_err(|e| ChannelError::new(&selector, ExportPhase::ResolveWindow, e))?;
        if start > since {
            debug!("Resuming {} at {}", selector, start);
        }

        let query = HistoryQuery {
            device_gid: channel.device_gid,
            channel: &channel.channel_num,
            scale: self.options.scale,
            energy_unit: self.options.energy_unit,
        };
        let history = fetch_history(self.api.as_ref(), &query, start, until)
            .await
            .map_err(|e| ChannelError::new(&selector, ExportPhase::Fetch, e))?;

        let mut report = ChannelReport {
            selector,
            new_samples: 0,
            pushes: 0,
        };
        let mut buffer = Series::new(self.pushed_metric(channel));
        let step_seconds = self.step.num_seconds();
        for (slot, usage) in history.usage.iter().enumerate() {
            // Empty slots still take their place in time.
            let Some(value) = usage else {
                continue;
            };
            let timestamp = history.first_instant + TimeDelta::seconds(step_seconds * slot as i64);
            buffer.push(Sample::new(*value, timestamp));
            report.new_samples += 1;

            if buffer.len() >= self.options.flush_threshold {
                self.push(&mut buffer, &report.selector, ExportPhase::Push)
                    .await?;
                report.pushes += 1;
            }
        }
        if !buffer.is_empty() {
            self.push(&mut buffer, &report.selector, ExportPhase::Flush)
                .await?;
            report.pushes += 1;
        }

        info!(
            "series {} found {} new samples",
            report.selector, report.new_samples
        );
        Ok(report)
    }

    async fn push(
        &self,
        buffer: &mut Series,
        selector: &str,
        phase: ExportPhase,
    ) -> Result<(), ChannelError> {
        let batch = buffer.take();
        debug!("Pushing {} samples of {}", batch.len(), selector);
        self.storage
            .push(std::slice::from_ref(&batch))
            .await
            .map_err(|e| ChannelError::new(selector, phase, e))
    }
}
