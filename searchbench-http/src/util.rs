use super::{Error, Result};

/// Turn a `host:port` or `scheme://host:port[/prefix]` target into a base URL without a
/// trailing slash.
pub(super) fn normalize_base_url(target: &str) -> Result<String> {
    let target = target.trim();
    if target.is_empty() {
        return Err(Error::InvalidUrl(target.to_string()));
    }

    let with_scheme = if target.contains("://") {
        target.to_string()
    } else {
        format!("http://{target}")
    };

    let parsed =
        url::Url::parse(&with_scheme).map_err(|_| Error::InvalidUrl(target.to_string()))?;
    check_scheme(&parsed, target)?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(Error::InvalidUrl(target.to_string()));
    }

    Ok(with_scheme.trim_end_matches('/').to_string())
}

pub(super) fn check_scheme(parsed: &url::Url, original: &str) -> Result<()> {
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(Error::UnsupportedScheme(original.to_string())),
    }
}

pub(super) fn join_path(base: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}
