use crate::types::SummaryRow;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

pub const TABLE_HEADERS: [&str; 2] = ["Description", "Value"];

/// Global configuration of a delivery destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SinkConfig {
    pub name: String,
    #[serde(default)]
    pub cluster_name: Option<String>,
}

/// A rendered piece of enrichment content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Markdown(String),
    Table { name: String, rows: Vec<SummaryRow> },
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Block::Markdown(text) => write!(f, "{}", text),
            Block::Table { name, rows } => {
                let width = rows
                    .iter()
                    .map(|r| r.description.len())
                    .chain(std::iter::once(TABLE_HEADERS[0].len()))
                    .max()
                    .unwrap_or(0);
                writeln!(f, "{}", name)?;
                write!(
                    f,
                    "  {:<width$}  {}",
                    TABLE_HEADERS[0],
                    TABLE_HEADERS[1],
                    width = width
                )?;
                for row in rows {
                    write!(
                        f,
                        "\n  {:<width$}  {}",
                        row.description,
                        row.value,
                        width = width
                    )?;
                }
                Ok(())
            }
        }
    }
}

/// The per-sink alert being assembled for one event.
#[derive(Debug, Clone)]
pub struct Finding {
    pub title: String,
    pub subject_labels: BTreeMap<String, String>,
    pub enrichments: Vec<Vec<Block>>,
    pub starts_at: DateTime<Utc>,
}

impl Finding {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subject_labels: BTreeMap::new(),
            enrichments: Vec::new(),
            starts_at: Utc::now(),
        }
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.enrichments.iter().flatten()
    }
}

/// An incoming object plus the findings every sink will receive for it.
#[derive(Debug, Clone)]
pub struct ExecutionEvent<K> {
    pub obj: Option<K>,
    pub sink_findings: BTreeMap<String, Vec<Finding>>,
    all_sinks: Vec<SinkConfig>,
}

impl<K> ExecutionEvent<K> {
    /// Creates the event with one finding titled `title` per sink.
    pub fn new(obj: Option<K>, sinks: &[SinkConfig], title: &str) -> Self {
        let sink_findings = sinks
            .iter()
            .map(|sink| (sink.name.clone(), vec![Finding::new(title)]))
            .collect();
        Self {
            obj,
            sink_findings,
            all_sinks: sinks.to_vec(),
        }
    }

    /// First non-empty cluster name found in any sink's configuration.
    pub fn cluster_name(&self) -> Option<&str> {
        self.all_sinks
            .iter()
            .filter_map(|sink| sink.cluster_name.as_deref())
            .find(|name| !name.is_empty())
    }

    /// Names of the sinks that carry at least one finding.
    pub fn named_sinks(&self) -> impl Iterator<Item = &str> {
        self.sink_findings
            .iter()
            .filter(|(_, findings)| !findings.is_empty())
            .map(|(name, _)| name.as_str())
    }

    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.sink_findings.values().flatten()
    }

    fn findings_mut(&mut self) -> impl Iterator<Item = &mut Finding> {
        self.sink_findings.values_mut().flatten()
    }

    pub fn add_enrichment(&mut self, blocks: Vec<Block>) {
        for finding in self.findings_mut() {
            finding.enrichments.push(blocks.clone());
        }
    }

    pub fn update_subject_labels<'a, I>(&mut self, labels: I)
    where
        I: IntoIterator<Item = (&'a String, &'a String)> + Clone,
    {
        let sinks: Vec<String> = self.named_sinks().map(str::to_string).collect();
        for sink in sinks {
            for finding in self.sink_findings.get_mut(&sink).into_iter().flatten() {
                finding.subject_labels.extend(
                    labels
                        .clone()
                        .into_iter()
                        .map(|(k, v)| (k.clone(), v.clone())),
                );
            }
        }
    }
}
