use std::collections::BTreeMap;
use std::fmt;

pub type Labels = BTreeMap<String, String>;

/// Label under which the metric name travels on the wire.
pub const NAME_LABEL: &str = "__name__";

/// Identity of a time series: a name and its labels.
///
/// Labels are kept ordered so that serialization and selectors are stable.
/// A metric without labels holds an empty map, which compares equal to any
/// other empty map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Metric {
    pub name: String,
    pub labels: Labels,
}

impl Metric {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: Labels::new(),
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Query selector matching exactly this metric, e.g. `vue_kwh{chan="1"}`.
    pub fn selector(&self) -> String {
        let mut selector = self.name.clone();
        if self.labels.is_empty() {
            return selector;
        }
        selector.push('{');
        for (index, (key, value)) in self.labels.iter().enumerate() {
            if index > 0 {
                selector.push(',');
            }
            selector.push_str(key);
            selector.push_str("=\"");
            escape_label_value(&mut selector, value);
            selector.push('"');
        }
        selector.push('}');
        selector
    }
}

fn escape_label_value(output: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '\\' => output.push_str("\\\\"),
            '"' => output.push_str("\\\""),
            '\n' => output.push_str("\\n"),
            c => output.push(c),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.selector())
    }
}
