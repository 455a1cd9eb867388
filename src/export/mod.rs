pub mod driver;

pub use driver::{
    ChannelError, ChannelReport, DEFAULT_FLUSH_THRESHOLD, DEFAULT_METRIC_NAME, ExportDriver,
    ExportOptions, ExportPhase, ExportSummary,
};
