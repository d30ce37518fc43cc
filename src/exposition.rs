//! Prometheus text-format rendering of process gauges.
//!
//! Families are built structurally and serialized in one pass at the end, so
//! label quoting lives in exactly one place. Rendering is pure and infallible;
//! label values that need it are escaped, never rejected.

use crate::collector::ProcessRecord;
use std::fmt::Write;

/// Metric type emitted on the `# TYPE` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Gauge,
}

impl MetricType {
    fn as_str(self) -> &'static str {
        match self {
            MetricType::Gauge => "gauge",
        }
    }
}

/// One labeled sample within a family.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Label pairs in emission order.
    pub labels: Vec<(String, String)>,
    pub value: f64,
}

/// A named family of samples sharing HELP/TYPE headers.
#[derive(Debug, Clone)]
pub struct MetricFamily {
    pub name: String,
    pub help_text: String,
    pub metric_type: MetricType,
    pub samples: Vec<Sample>,
}

impl MetricFamily {
    /// Creates an empty gauge family with the reference `This is <name>` help.
    pub fn gauge(name: &str) -> Self {
        Self {
            name: name.to_string(),
            help_text: format!("This is {}", name),
            metric_type: MetricType::Gauge,
            samples: Vec::new(),
        }
    }

    /// Appends a sample, preserving insertion order.
    pub fn push_sample(&mut self, labels: Vec<(String, String)>, value: f64) {
        self.samples.push(Sample { labels, value });
    }

    /// Serializes the family: HELP line, TYPE line, then one line per sample.
    fn write_to(&self, out: &mut String) {
        writeln!(out, "# HELP {} {}", self.name, self.help_text).ok();
        writeln!(out, "# TYPE {} {}", self.name, self.metric_type.as_str()).ok();
        for sample in &self.samples {
            out.push_str(&self.name);
            out.push('{');
            for (i, (key, value)) in sample.labels.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write!(out, "{}=\"{}\"", key, escape_label_value(value)).ok();
            }
            out.push('}');
            writeln!(out, " {}", sample.value).ok();
        }
    }
}

/// Escapes a label value per the text-format quoting rules.
///
/// Backslash, double-quote, and newline are the only characters the format
/// requires escaping inside a quoted label value.
pub fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Builds the `process_cpu` and `process_mem` gauge families for the records.
pub fn build_families(records: &[ProcessRecord]) -> Vec<MetricFamily> {
    let mut cpu = MetricFamily::gauge("process_cpu");
    let mut mem = MetricFamily::gauge("process_mem");

    for record in records {
        let labels = vec![
            ("user".to_string(), record.owner_user.clone()),
            ("process_name".to_string(), record.command_display.clone()),
        ];
        cpu.push_sample(labels.clone(), record.cpu_percent);
        mem.push_sample(labels, record.mem_percent);
    }

    vec![cpu, mem]
}

/// Renders the records as exposition text. Pure; sample order is record order.
pub fn render(records: &[ProcessRecord]) -> String {
    let mut out = String::new();
    for family in build_families(records) {
        family.write_to(&mut out);
    }
    out
}
