use super::SyncDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub value: f64,
    pub timestamp: SyncDateTime,
}

impl Sample {
    pub fn new(value: f64, timestamp: SyncDateTime) -> Self {
        Self { value, timestamp }
    }
}
