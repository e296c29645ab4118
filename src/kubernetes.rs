use crate::types::{SubjectKind, SubjectRef};
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{Pod, PodSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::{Api, Client, ResourceExt};
use std::collections::BTreeMap;
use std::fmt::Debug;

/// The object an event concerns, as read back from the API server.
#[derive(Debug, Clone, PartialEq)]
pub enum Subject {
    Pod(Pod),
    Job(Job),
    CronJob(CronJob),
}

impl Subject {
    pub fn kind(&self) -> SubjectKind {
        match self {
            Subject::Pod(_) => SubjectKind::Pod,
            Subject::Job(_) => SubjectKind::Job,
            Subject::CronJob(_) => SubjectKind::CronJob,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Subject::Pod(pod) => &pod.metadata,
            Subject::Job(job) => &job.metadata,
            Subject::CronJob(cron_job) => &cron_job.metadata,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Subject::Pod(pod) => pod.name_any(),
            Subject::Job(job) => job.name_any(),
            Subject::CronJob(cron_job) => cron_job.name_any(),
        }
    }

    pub fn namespace(&self) -> String {
        self.metadata().namespace.clone().unwrap_or_default()
    }

    pub fn labels(&self) -> Option<&BTreeMap<String, String>> {
        self.metadata().labels.as_ref()
    }

    pub fn annotations(&self) -> Option<&BTreeMap<String, String>> {
        self.metadata().annotations.as_ref()
    }

    /// Labels of the pod template nested in a CronJob's job template.
    /// Pods and Jobs contribute none.
    pub fn template_labels(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Subject::CronJob(cron_job) => cron_job
                .spec
                .as_ref()
                .and_then(|s| s.job_template.spec.as_ref())
                .and_then(|s| s.template.metadata.as_ref())
                .and_then(|m| m.labels.as_ref()),
            Subject::Pod(_) | Subject::Job(_) => None,
        }
    }

    pub fn pod_spec(&self) -> Option<&PodSpec> {
        match self {
            Subject::Pod(pod) => pod.spec.as_ref(),
            Subject::Job(job) => job.spec.as_ref().and_then(|s| s.template.spec.as_ref()),
            Subject::CronJob(cron_job) => cron_job
                .spec
                .as_ref()
                .and_then(|s| s.job_template.spec.as_ref())
                .and_then(|s| s.template.spec.as_ref()),
        }
    }
}

/// Read access to live objects, keyed by kind, namespace and name.
pub trait ObjectReader {
    async fn read(
        &self,
        kind: SubjectKind,
        namespace: &str,
        name: &str,
    ) -> anyhow::Result<Option<Subject>>;
}

async fn read_namespaced<T>(
    client: &Client,
    namespace: &str,
    name: &str,
) -> anyhow::Result<Option<T>>
where
    T: k8s_openapi::Resource<Scope = k8s_openapi::NamespaceResourceScope>
        + k8s_openapi::Metadata<Ty = ObjectMeta>
        + serde::de::DeserializeOwned
        + serde::Serialize
        + Clone
        + Debug
        + Send
        + Sync,
{
    let api: Api<T> = Api::namespaced(client.clone(), namespace);
    Ok(api.get_opt(name).await?)
}

impl ObjectReader for Client {
    async fn read(
        &self,
        kind: SubjectKind,
        namespace: &str,
        name: &str,
    ) -> anyhow::Result<Option<Subject>> {
        let subject = match kind {
            SubjectKind::Pod => read_namespaced::<Pod>(self, namespace, name)
                .await?
                .map(Subject::Pod),
            SubjectKind::Job => read_namespaced::<Job>(self, namespace, name)
                .await?
                .map(Subject::Job),
            SubjectKind::CronJob => read_namespaced::<CronJob>(self, namespace, name)
                .await?
                .map(Subject::CronJob),
        };
        Ok(subject)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    #[error("unsupported subject kind '{0}'")]
    UnsupportedKind(String),
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: SubjectKind,
        namespace: String,
        name: String,
    },
    #[error("failed to read {kind} {namespace}/{name}")]
    Read {
        kind: SubjectKind,
        namespace: String,
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Resolves the object a reference points at with a single read.
pub async fn resolve_subject<R: ObjectReader>(
    reader: &R,
    subject_ref: &SubjectRef,
) -> Result<Subject, ResolveError> {
    let kind: SubjectKind = subject_ref
        .kind
        .parse()
        .map_err(ResolveError::UnsupportedKind)?;
    let namespace = &subject_ref.namespace;
    let name = &subject_ref.name;

    match reader.read(kind, namespace, name).await {
        Ok(Some(subject)) => Ok(subject),
        Ok(None) => Err(ResolveError::NotFound {
            kind,
            namespace: namespace.clone(),
            name: name.clone(),
        }),
        Err(e) => Err(ResolveError::Read {
            kind,
            namespace: namespace.clone(),
            name: name.clone(),
            source: e.into(),
        }),
    }
}
