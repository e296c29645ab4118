//! Enricher configuration.
//!
//! Settings come from an optional YAML file and are then overridden by
//! command line flags.

use crate::actions::{JobLabelParams, LabelTemplateParams, SummaryParams};
use crate::cli::Cli;
use crate::event::SinkConfig;
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_SINK: &str = "stdout";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,

    /// Template for the event label enricher; disabled when unset.
    #[serde(default)]
    pub template: Option<String>,

    #[serde(default = "default_label_keys")]
    pub label_keys: Vec<String>,

    #[serde(default)]
    pub skip_namespaces: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sinks: Vec::new(),
            template: None,
            label_keys: default_label_keys(),
            skip_namespaces: Vec::new(),
        }
    }
}

fn default_label_keys() -> Vec<String> {
    vec!["job-name".to_string(), "team".to_string()]
}

impl Config {
    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(text).context("invalid enricher configuration")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Loads the file named on the command line, if any, and applies the
    /// command line overrides.
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(template) = &cli.template {
            self.template = Some(template.clone());
        }
        if !cli.label_keys.is_empty() {
            self.label_keys = cli.label_keys.clone();
        }
        if !cli.skip_namespaces.is_empty() {
            self.skip_namespaces = cli.skip_namespaces.clone();
        }
        if self.sinks.is_empty() {
            self.sinks.push(SinkConfig {
                name: DEFAULT_SINK.to_string(),
                cluster_name: None,
            });
        }
        if let Some(cluster_name) = &cli.cluster_name {
            for sink in self.sinks.iter_mut().filter(|s| s.cluster_name.is_none()) {
                sink.cluster_name = Some(cluster_name.clone());
            }
        }
    }

    pub fn label_template_params(&self) -> Option<LabelTemplateParams> {
        self.template.clone().map(|template| LabelTemplateParams { template })
    }

    pub fn summary_params(&self) -> SummaryParams {
        SummaryParams {
            label_keys: self.label_keys.clone(),
        }
    }

    pub fn job_label_params(&self) -> JobLabelParams {
        JobLabelParams {
            skip_namespaces: self.skip_namespaces.clone(),
        }
    }
}
