use std::fmt;
use std::str::FromStr;

use k8s_openapi::api::core::v1::ObjectReference;

/// Kinds of object an event can be enriched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectKind {
    Pod,
    Job,
    CronJob,
}

impl SubjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectKind::Pod => "Pod",
            SubjectKind::Job => "Job",
            SubjectKind::CronJob => "CronJob",
        }
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pod" => Ok(SubjectKind::Pod),
            "Job" => Ok(SubjectKind::Job),
            "CronJob" => Ok(SubjectKind::CronJob),
            other => Err(other.to_string()),
        }
    }
}

/// Identifier of the object an event regards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectRef {
    pub kind: String,
    pub name: String,
    pub namespace: String,
}

impl SubjectRef {
    pub fn new(kind: &str, name: &str, namespace: &str) -> Self {
        Self {
            kind: kind.to_string(),
            name: name.to_string(),
            namespace: namespace.to_string(),
        }
    }
}

impl From<&ObjectReference> for SubjectRef {
    fn from(reference: &ObjectReference) -> Self {
        Self::new(
            reference.kind.as_deref().unwrap_or_default(),
            reference.name.as_deref().unwrap_or_default(),
            reference.namespace.as_deref().unwrap_or_default(),
        )
    }
}

impl fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.namespace, self.name)
    }
}

/// One `Description | Value` row of a summary table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub description: String,
    pub value: String,
}

impl SummaryRow {
    pub fn new(description: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            value: value.into(),
        }
    }
}
