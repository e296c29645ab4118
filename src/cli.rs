use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Object streams the enricher can watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum WatchKind {
    Events,
    Jobs,
    Pods,
}

#[derive(Parser, Debug)]
#[command(name = "kube-enricher")]
#[command(about = "Enrich Kubernetes event, job and pod alerts with subject labels and summaries")]
pub struct Cli {
    /// YAML configuration file (sinks, template, label keys)
    #[arg(short = 'f', long)]
    pub config: Option<PathBuf>,

    /// Namespace to watch (defaults to all namespaces)
    #[arg(short = 'n', long)]
    pub namespace: Option<String>,

    /// Context
    #[arg(long)]
    pub context: Option<String>,

    /// Template rendered for each Kubernetes event, e.g. "Pod ${name} in ${namespace}"
    #[arg(short = 't', long)]
    pub template: Option<String>,

    /// Cluster name for sinks that do not configure one
    #[arg(long)]
    pub cluster_name: Option<String>,

    /// Subject labels shown in summary tables
    #[arg(long = "label-key", value_delimiter = ',')]
    pub label_keys: Vec<String>,

    /// Namespaces whose jobs are not labelled
    #[arg(long = "skip-namespace", value_delimiter = ',')]
    pub skip_namespaces: Vec<String>,

    /// Object streams to watch
    #[arg(long, value_enum, value_delimiter = ',', default_values = ["events", "jobs", "pods"])]
    pub watch: Vec<WatchKind>,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}
