use crate::labels::LabelMap;
use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::debug;

// `$$`, `$name`, `${name}`, or a lone `$` that starts none of those.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\$(?:(?P<escaped>\$)",
        r"|(?P<named>[_a-zA-Z][_a-zA-Z0-9]*)",
        r"|\{(?P<braced>[_a-zA-Z][_a-zA-Z0-9]*)\}",
        r"|(?P<invalid>))",
    ))
    .expect("placeholder pattern is valid")
});

/// Substitutes `$name` and `${name}` placeholders from `labels`.
///
/// Unbound names render as the label map's default value. `$$` renders a
/// literal `$`, and any other `$` is kept as written, so rendering never
/// fails.
pub fn render(template: &str, labels: &LabelMap) -> String {
    let mut unbound = Vec::new();
    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures| {
        if let Some(name) = caps.name("named").or_else(|| caps.name("braced")) {
            let name = name.as_str();
            if !labels.contains_key(name) {
                unbound.push(name.to_string());
            }
            labels.get_or_default(name).to_string()
        } else {
            "$".to_string()
        }
    });

    if !unbound.is_empty() {
        debug!(placeholders = ?unbound, "template references unbound labels");
    }
    rendered.into_owned()
}
