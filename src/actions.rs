use crate::event::{Block, ExecutionEvent};
use crate::kubernetes::{ObjectReader, ResolveError, Subject, resolve_subject};
use crate::labels::build_label_map;
use crate::summary::{build_summary_rows, subject_image, subject_status};
use crate::template::render;
use crate::types::SubjectRef;
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::api::events::v1::Event as KubeEvent;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

pub const ALERT_SUMMARY_TABLE: &str = "Alert Summary";
pub const CLUSTER_LABEL: &str = "cluster";

/// Template rendered against the labels of an event's subject.
#[derive(Debug, Clone)]
pub struct LabelTemplateParams {
    pub template: String,
}

#[derive(Debug, Clone)]
pub struct SummaryParams {
    /// Subject labels copied into the summary table.
    pub label_keys: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct JobLabelParams {
    pub skip_namespaces: Vec<String>,
}

/// Stamps the configured cluster name on every finding of every named sink.
pub fn enrich_with_cluster_name<K>(event: &mut ExecutionEvent<K>) {
    let Some(cluster_name) = event.cluster_name().map(str::to_string) else {
        return;
    };
    let label = BTreeMap::from([(CLUSTER_LABEL.to_string(), cluster_name)]);
    event.update_subject_labels(&label);
}

async fn resolve_regarding<R: ObjectReader>(
    event: &ExecutionEvent<KubeEvent>,
    reader: &R,
) -> Option<Subject> {
    let Some(regarding) = event.obj.as_ref().and_then(|e| e.regarding.as_ref()) else {
        info!("event has no regarding object, skipping");
        return None;
    };
    let subject_ref = SubjectRef::from(regarding);

    match resolve_subject(reader, &subject_ref).await {
        Ok(subject) => Some(subject),
        Err(e @ ResolveError::Read { .. }) => {
            warn!(subject = %subject_ref, error = %e, "could not read event subject, skipping");
            None
        }
        Err(e) => {
            debug!(subject = %subject_ref, reason = %e, "event subject not resolvable, skipping");
            None
        }
    }
}

fn alert_summary_table(subject: &Subject, label_keys: &[String]) -> Block {
    let status = subject_status(subject);
    let image = subject_image(subject);
    Block::Table {
        name: ALERT_SUMMARY_TABLE.to_string(),
        rows: build_summary_rows(subject, status.as_ref(), image.as_deref(), label_keys),
    }
}

/// Renders `params.template` against the labels of the object an event
/// regards and copies those labels onto every finding.
pub async fn event_pod_label_enricher<R: ObjectReader>(
    event: &mut ExecutionEvent<KubeEvent>,
    reader: &R,
    params: &LabelTemplateParams,
) {
    let Some(subject) = resolve_regarding(event, reader).await else {
        return;
    };
    debug!(
        kind = %subject.kind(),
        name = %subject.name(),
        namespace = %subject.namespace(),
        "enriching event with subject labels"
    );

    let mut labels = build_label_map(&subject);
    if let Some(cluster_name) = event.cluster_name() {
        labels.insert(CLUSTER_LABEL, cluster_name);
    }
    event.update_subject_labels(&labels);

    event.add_enrichment(vec![Block::Markdown(render(&params.template, &labels))]);
}

/// Adds an alert summary table for the object an event regards.
pub async fn event_change_event_enricher<R: ObjectReader>(
    event: &mut ExecutionEvent<KubeEvent>,
    reader: &R,
    params: &SummaryParams,
) {
    enrich_with_cluster_name(event);
    let Some(subject) = resolve_regarding(event, reader).await else {
        return;
    };
    let table = alert_summary_table(&subject, &params.label_keys);
    event.add_enrichment(vec![table]);
}

pub fn job_change_event_enricher(event: &mut ExecutionEvent<Job>, params: &SummaryParams) {
    enrich_with_cluster_name(event);
    let Some(job) = event.obj.clone() else {
        info!("job change event carries no job, skipping");
        return;
    };
    let table = alert_summary_table(&Subject::Job(job), &params.label_keys);
    event.add_enrichment(vec![table]);
}

pub fn pod_event_enricher(event: &mut ExecutionEvent<Pod>, params: &SummaryParams) {
    enrich_with_cluster_name(event);
    let Some(pod) = event.obj.clone() else {
        info!("pod event carries no pod, skipping");
        return;
    };
    let table = alert_summary_table(&Subject::Pod(pod), &params.label_keys);
    event.add_enrichment(vec![table]);
}

/// Copies a Job's own labels onto every finding, unless the Job lives in
/// one of the skipped namespaces.
pub fn alert_job_labels_enricher(event: &mut ExecutionEvent<Job>, params: &JobLabelParams) {
    let Some(job) = event.obj.as_ref() else {
        info!("job change event carries no job, skipping");
        return;
    };
    let namespace = job.metadata.namespace.clone().unwrap_or_default();
    if params.skip_namespaces.contains(&namespace) {
        debug!(namespace = %namespace, "namespace is skipped for job labels");
        return;
    }

    let job_labels = job.metadata.labels.clone().unwrap_or_default();
    event.update_subject_labels(&job_labels);
    enrich_with_cluster_name(event);
}
