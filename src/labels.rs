use crate::kubernetes::Subject;
use std::collections::{BTreeMap, btree_map};

/// Value returned for any key that no layer bound.
pub const MISSING_LABEL: &str = "<missing>";

/// Labels and annotations of a subject merged into one lookup table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMap {
    entries: BTreeMap<String, String>,
}

impl LabelMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `layer` on top of the current entries; later layers win.
    pub fn layer(&mut self, layer: Option<&BTreeMap<String, String>>) {
        if let Some(layer) = layer {
            self.entries
                .extend(layer.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn get_or_default(&self, key: &str) -> &str {
        self.get(key).unwrap_or(MISSING_LABEL)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl<'a> IntoIterator for &'a LabelMap {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Builds the label map for a subject: labels, then annotations, then the
/// CronJob pod template labels, then the synthetic `name` and `namespace`.
pub fn build_label_map(subject: &Subject) -> LabelMap {
    let mut labels = LabelMap::new();
    labels.layer(subject.labels());
    labels.layer(subject.annotations());
    labels.layer(subject.template_labels());
    labels.insert("name", subject.name());
    labels.insert("namespace", subject.namespace());
    labels
}
