use crate::kubernetes::Subject;
use crate::types::SummaryRow;
use k8s_openapi::api::batch::v1::JobStatus;

/// Reduces a Job's status to a `(status, message)` pair.
///
/// Active pods win over everything, then the first condition whose status is
/// `"True"`. A status with no counts and no conditions is still starting.
pub fn derive_job_status(status: &JobStatus) -> (String, String) {
    if status.active.unwrap_or(0) > 0 {
        return ("Running".to_string(), String::new());
    }

    let conditions = status.conditions.as_deref().unwrap_or_default();
    if let Some(condition) = conditions.iter().find(|c| c.status == "True") {
        return (
            condition.type_.clone(),
            condition.message.clone().unwrap_or_default(),
        );
    }

    let reported = |count: Option<i32>| count.is_some_and(|c| c != 0);
    if !reported(status.active)
        && !reported(status.failed)
        && !reported(status.succeeded)
        && conditions.is_empty()
    {
        return ("Starting".to_string(), String::new());
    }

    ("Unknown".to_string(), String::new())
}

/// Status row values for subjects that report one.
pub fn subject_status(subject: &Subject) -> Option<(String, String)> {
    match subject {
        Subject::Job(job) => Some(
            job.status
                .as_ref()
                .map_or_else(|| derive_job_status(&JobStatus::default()), derive_job_status),
        ),
        Subject::Pod(pod) => {
            let status = pod.status.as_ref()?;
            let phase = status.phase.clone()?;
            Some((phase, status.message.clone().unwrap_or_default()))
        }
        Subject::CronJob(_) => None,
    }
}

/// Image of the first container in the subject's pod spec.
pub fn subject_image(subject: &Subject) -> Option<String> {
    subject
        .pod_spec()?
        .containers
        .first()
        .and_then(|c| c.image.clone())
}

/// Builds the rows of an alert summary table.
///
/// Rows come in a fixed order: status and message, namespace and name, image,
/// then every subject label whose key is in `allowed_label_keys`.
pub fn build_summary_rows(
    subject: &Subject,
    status: Option<&(String, String)>,
    image: Option<&str>,
    allowed_label_keys: &[String],
) -> Vec<SummaryRow> {
    let mut rows = Vec::new();

    if let Some((status, message)) = status {
        rows.push(SummaryRow::new("status", status.as_str()));
        if !message.is_empty() {
            rows.push(SummaryRow::new("message", message.as_str()));
        }
    }

    rows.push(SummaryRow::new("namespace", subject.namespace()));
    rows.push(SummaryRow::new("name", subject.name()));

    if let Some(image) = image {
        rows.push(SummaryRow::new("image", image));
    }

    if let Some(labels) = subject.labels() {
        rows.extend(
            labels
                .iter()
                .filter(|(key, _)| allowed_label_keys.contains(key))
                .map(|(key, value)| SummaryRow::new(key.as_str(), value.as_str())),
        );
    }

    rows
}
