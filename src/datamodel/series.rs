use super::{Metric, Sample};

/// One metric identity plus its samples, in insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    pub metric: Metric,
    pub samples: Vec<Sample>,
}

impl Series {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            samples: Vec::new(),
        }
    }

    pub fn with_samples(metric: Metric, samples: Vec<Sample>) -> Self {
        Self { metric, samples }
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Moves the buffered samples out into a new series with the same metric.
    pub fn take(&mut self) -> Series {
        Series {
            metric: self.metric.clone(),
            samples: std::mem::take(&mut self.samples),
        }
    }
}
