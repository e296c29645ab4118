mod actions;
mod cli;
mod config;
mod event;
mod kubernetes;
mod labels;
mod summary;
mod template;
mod types;
mod utils;

use clap::Parser;
use crossterm::style::Stylize;
use futures::{Future, TryStreamExt, stream::StreamExt};
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::api::events::v1::Event as KubeEvent;
use kube::runtime::watcher::{Config as WatcherConfig, Event, watcher};
use kube::{Api, Client, ResourceExt, config as kubeconfig};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, info, warn};

use cli::{Cli, WatchKind};
use config::Config;
use event::ExecutionEvent;
use utils::{format_labels, get_color};

/// Shared, read-only state handed to every watcher task.
struct EnricherContext {
    client: Client,
    config: Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout only carries findings
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::resolve(&cli)?;
    let client = initialize_client(cli.context.as_deref()).await?;
    info!(
        sinks = config.sinks.len(),
        template = config.template.is_some(),
        "enricher configured"
    );

    let ctx = Arc::new(EnricherContext { client, config });
    let mut seen = HashSet::new();
    for kind in cli.watch.iter().copied().filter(|k| seen.insert(*k)) {
        spawn_watcher(kind, ctx.clone(), cli.namespace.as_deref());
    }

    tokio::signal::ctrl_c().await?;
    Ok(())
}

async fn initialize_client(context: Option<&str>) -> anyhow::Result<Client> {
    let config = match context {
        None => kubeconfig::Config::infer().await?,
        Some(ctx) => kubeconfig::Config::from_kubeconfig(&kubeconfig::KubeConfigOptions {
            context: Some(ctx.to_string()),
            ..Default::default()
        })
        .await
        .map_err(|e| anyhow::anyhow!("Context '{}' not found in kubeconfig: {}", ctx, e))?,
    };
    let client = Client::try_from(config)?;
    info!("Initialized client for context: {}", context.unwrap_or("current"));
    Ok(client)
}

fn scoped_api<K>(client: &Client, namespace: Option<&str>) -> Api<K>
where
    K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope, DynamicType = ()>,
{
    match namespace {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    }
}

fn spawn_watcher(kind: WatchKind, ctx: Arc<EnricherContext>, namespace: Option<&str>) {
    match kind {
        WatchKind::Events => {
            let api: Api<KubeEvent> = scoped_api(&ctx.client, namespace);
            tokio::spawn(async move {
                let result = watch_resource(api, "events", move |obj| {
                    let ctx = ctx.clone();
                    async move { handle_kube_event(obj, &ctx).await }
                })
                .await;
                if let Err(err) = result {
                    warn!("Event watcher stopped: {}", err);
                }
            });
        }
        WatchKind::Jobs => {
            let api: Api<Job> = scoped_api(&ctx.client, namespace);
            tokio::spawn(async move {
                let result = watch_resource(api, "jobs", move |obj| {
                    let ctx = ctx.clone();
                    async move { handle_job(obj, &ctx) }
                })
                .await;
                if let Err(err) = result {
                    warn!("Job watcher stopped: {}", err);
                }
            });
        }
        WatchKind::Pods => {
            let api: Api<Pod> = scoped_api(&ctx.client, namespace);
            tokio::spawn(async move {
                let result = watch_resource(api, "pods", move |obj| {
                    let ctx = ctx.clone();
                    async move { handle_pod(obj, &ctx) }
                })
                .await;
                if let Err(err) = result {
                    warn!("Pod watcher stopped: {}", err);
                }
            });
        }
    }
}

/// Runs `on_apply` for every object change seen after the initial listing.
async fn watch_resource<K, F, Fut>(
    api: Api<K>,
    stream_name: &'static str,
    mut on_apply: F,
) -> anyhow::Result<()>
where
    K: kube::Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug + Send + 'static,
    F: FnMut(K) -> Fut + Send,
    Fut: Future<Output = ()> + Send,
{
    let mut stream = watcher(api, WatcherConfig::default()).boxed();
    while let Some(event) = stream.try_next().await? {
        match event {
            Event::Apply(obj) => on_apply(obj).await,
            Event::InitApply(obj) => {
                debug!(
                    stream = stream_name,
                    name = %obj.name_any(),
                    "existing object, not enriched"
                );
            }
            Event::Delete(_) => {}
            Event::Init => info!("Initializing {} watcher", stream_name),
            Event::InitDone => info!("{} watcher initialization complete", stream_name),
        }
    }
    Ok(())
}

async fn handle_kube_event(kube_event: KubeEvent, ctx: &EnricherContext) {
    let title = format!(
        "{} {}: {}",
        kube_event.type_.as_deref().unwrap_or("Normal"),
        kube_event.reason.as_deref().unwrap_or_default(),
        kube_event.note.as_deref().unwrap_or_default(),
    );
    let mut event = ExecutionEvent::new(Some(kube_event), &ctx.config.sinks, &title);

    if let Some(params) = ctx.config.label_template_params() {
        actions::event_pod_label_enricher(&mut event, &ctx.client, &params).await;
    }
    actions::event_change_event_enricher(&mut event, &ctx.client, &ctx.config.summary_params())
        .await;
    deliver(&event);
}

fn handle_job(job: Job, ctx: &EnricherContext) {
    let title = format!(
        "Job {}/{} changed",
        job.namespace().unwrap_or_default(),
        job.name_any()
    );
    let mut event = ExecutionEvent::new(Some(job), &ctx.config.sinks, &title);
    actions::job_change_event_enricher(&mut event, &ctx.config.summary_params());
    actions::alert_job_labels_enricher(&mut event, &ctx.config.job_label_params());
    deliver(&event);
}

fn handle_pod(pod: Pod, ctx: &EnricherContext) {
    let title = format!(
        "Pod {}/{} changed",
        pod.namespace().unwrap_or_default(),
        pod.name_any()
    );
    let mut event = ExecutionEvent::new(Some(pod), &ctx.config.sinks, &title);
    actions::pod_event_enricher(&mut event, &ctx.config.summary_params());
    deliver(&event);
}

/// Prints every sink's findings to stdout.
fn deliver<K>(event: &ExecutionEvent<K>) {
    if event.findings().all(|f| f.enrichments.is_empty()) {
        debug!("no enrichment produced, nothing to deliver");
        return;
    }

    for sink in event.named_sinks() {
        let color = get_color(sink);
        for finding in &event.sink_findings[sink] {
            let started = finding.starts_at.format("%H:%M:%S");
            let prefix = format!("[{} {}]", sink, started).with(color);
            println!("{} {}", prefix, finding.title);
            if !finding.subject_labels.is_empty() {
                println!("  labels: {}", format_labels(&finding.subject_labels));
            }
            for block in finding.blocks() {
                println!("{}", block);
            }
        }
    }
}
