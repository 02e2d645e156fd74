use std::path::Path;
use std::str::FromStr as _;

use anyhow::Context as _;
use serde::Deserialize;

use searchbench_core::runner::{DEFAULT_REQUESTS, HandlerKind, Scenario};

/// Top-level layout of a `--scenarios` file.
///
/// ```yaml
/// scenarios:
///   - path: /api/v1/search?limit=10&query=news
///     requests: 5000
///     handler: content
///   - name: epg-full
///     path: /api/v1/epg?limit=0
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScenarioFile {
    pub scenarios: Vec<ScenarioEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct ScenarioEntry {
    /// Report label. Defaults to `path` without its query string.
    #[serde(default)]
    pub name: Option<String>,

    pub path: String,

    #[serde(default)]
    pub requests: Option<u64>,

    /// `stats` or `content`.
    #[serde(default)]
    pub handler: Option<String>,
}

/// Overrides applied on top of the file (or the built-in list).
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ScenarioOverrides {
    pub requests: Option<u64>,
    pub validate_content: bool,
}

impl ScenarioOverrides {
    fn default_handler(self) -> HandlerKind {
        if self.validate_content {
            HandlerKind::Content
        } else {
            HandlerKind::Stats
        }
    }
}

pub(crate) async fn load(path: &Path) -> anyhow::Result<ScenarioFile> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read scenario file: {}", path.display()))?;
    parse(&raw).with_context(|| format!("invalid scenario file: {}", path.display()))
}

pub(crate) fn parse(raw: &str) -> anyhow::Result<ScenarioFile> {
    let doc: ScenarioFile = serde_yaml::from_str(raw).context("failed to parse YAML")?;
    anyhow::ensure!(!doc.scenarios.is_empty(), "`scenarios` must not be empty");
    Ok(doc)
}

pub(crate) fn resolve(
    file: Option<&ScenarioFile>,
    overrides: ScenarioOverrides,
) -> anyhow::Result<Vec<Scenario>> {
    let Some(file) = file else {
        let handler = overrides.default_handler().handler();
        return Ok(Scenario::defaults()
            .into_iter()
            .map(|s| {
                let requests = overrides.requests.unwrap_or(s.requests);
                s.with_requests(requests).with_handler(handler.clone())
            })
            .collect());
    };

    file.scenarios
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            resolve_entry(entry, overrides).with_context(|| format!("scenarios[{idx}]"))
        })
        .collect()
}

fn resolve_entry(entry: &ScenarioEntry, overrides: ScenarioOverrides) -> anyhow::Result<Scenario> {
    anyhow::ensure!(
        entry.path.starts_with('/'),
        "`path` must start with '/' (got {:?})",
        entry.path
    );

    let kind = match entry.handler.as_deref() {
        Some(name) => HandlerKind::from_str(name)
            .map_err(|_| anyhow::anyhow!("unknown handler {name:?} (expected stats|content)"))?,
        None => overrides.default_handler(),
    };

    let name = entry
        .name
        .clone()
        .unwrap_or_else(|| default_name(&entry.path).to_string());

    let requests = overrides
        .requests
        .or(entry.requests)
        .unwrap_or(DEFAULT_REQUESTS);

    Ok(Scenario::new(name, entry.path.clone())
        .with_requests(requests)
        .with_handler(kind.handler()))
}

fn default_name(path: &str) -> &str {
    path.split_once('?').map_or(path, |(p, _)| p)
}
