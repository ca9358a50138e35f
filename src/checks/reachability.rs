//! Target reachability probing.
//!
//! Each record's target host is probed with a GET over plain HTTP, carrying
//! a virtual-host header derived from the record key, with redirects
//! inspected rather than followed. Registries of this shape conventionally
//! front HTTP-only hosts that redirect to HTTPS on the same domain, so that
//! one redirect shape is re-probed over HTTPS; every other out-of-band
//! response, mismatched redirect, or transport failure becomes a warning.
//!
//! The only fatal condition here is a target that is not a URL at all; that
//! is a structural defect in the registry, not a network hiccup.

use std::time::Duration;

use reqwest::header;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::{PreflightError, Record};

/// Probe parameters shared by every record in a run.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Root domain the virtual-host header is derived from
    pub root_domain: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Scheme for the same-host re-probe after an upgrade redirect.
    /// "https" outside of tests.
    pub upgrade_scheme: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            root_domain: "js.org".to_string(),
            timeout: Duration::from_secs(20),
            upgrade_scheme: "https".to_string(),
        }
    }
}

/// Outcome of probing one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Target answered in band (directly or after the HTTPS re-probe)
    Ok,
    /// Target is unreachable; message for the warning list
    Warn(String),
    /// Target is not a parseable URL; message for the error list (fatal)
    InvalidTarget(String),
}

/// What to do after the first (HTTP) response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FirstProbe {
    Accept,
    UpgradeToHttps,
    Reject,
}

/// Build the shared HTTP client: fixed timeout, redirects never followed.
pub fn build_client(config: &ProbeConfig) -> Result<Client, PreflightError> {
    Client::builder()
        .timeout(config.timeout)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| PreflightError::ClientError {
            message: e.to_string(),
        })
}

/// Probe one record.
pub async fn probe(client: &Client, record: &Record, config: &ProbeConfig) -> ProbeOutcome {
    let url = match normalize_target(&record.target) {
        Some(url) => url,
        None => {
            return ProbeOutcome::InvalidTarget(format!(
                "CNAME target is not a valid url: '{}' => '{}'",
                record.key, record.target
            ));
        }
    };

    let authority = probe_authority(&url);
    let vhost = virtual_host(&record.key, &config.root_domain);

    let response = match client
        .get(format!("http://{authority}"))
        .header(header::HOST, vhost.as_str())
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => return unreachable(record, &e.to_string()),
    };

    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    match classify_response(status, location.as_deref(), &authority) {
        FirstProbe::Accept => ProbeOutcome::Ok,
        FirstProbe::Reject => unreachable(record, &status_text(status)),
        FirstProbe::UpgradeToHttps => {
            match client
                .get(format!("{}://{authority}", config.upgrade_scheme))
                .header(header::HOST, vhost.as_str())
                .send()
                .await
            {
                Ok(response) if in_band(response.status()) => ProbeOutcome::Ok,
                Ok(response) => unreachable(record, &status_text(response.status())),
                Err(e) => unreachable(record, &e.to_string()),
            }
        }
    }
}

/// Normalize a raw target into an absolute URL with a host.
fn normalize_target(target: &str) -> Option<Url> {
    if target.is_empty() {
        return None;
    }

    let absolute = if target.starts_with("http://") || target.starts_with("https://") {
        target.to_string()
    } else {
        format!("http://{target}")
    };

    let url = Url::parse(&absolute).ok()?;
    url.host_str()?;
    Some(url)
}

/// Host to probe. Real registry targets are bare hostnames, but an explicit
/// non-default port is kept so loopback targets stay probeable.
fn probe_authority(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

/// Virtual-host header value: `<key>.<root>`, or bare `<root>` for the
/// registry root entry.
fn virtual_host(key: &str, root_domain: &str) -> String {
    if key.is_empty() {
        root_domain.to_string()
    } else {
        format!("{key}.{root_domain}")
    }
}

/// Decide what the first response means.
///
/// A redirect in {301, 302, 307, 308} whose location (minus one trailing
/// slash) is exactly `https://<authority>` is the HTTP-to-HTTPS upgrade this
/// registry expects and triggers the re-probe; the same statuses with a
/// missing or mismatched location are rejected, since a redirect to a
/// different host means the upstream is misconfigured. Every other status
/// inside [200, 400] is accepted outright.
fn classify_response(status: StatusCode, location: Option<&str>, authority: &str) -> FirstProbe {
    if matches!(status.as_u16(), 301 | 302 | 307 | 308) {
        if let Some(location) = location {
            let normalized = location.strip_suffix('/').unwrap_or(location);
            if normalized == format!("https://{authority}") {
                return FirstProbe::UpgradeToHttps;
            }
        }
        return FirstProbe::Reject;
    }

    if in_band(status) {
        FirstProbe::Accept
    } else {
        FirstProbe::Reject
    }
}

/// Accepted status band, inclusive on both ends.
fn in_band(status: StatusCode) -> bool {
    (200..=400).contains(&status.as_u16())
}

fn status_text(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

fn unreachable(record: &Record, detail: &str) -> ProbeOutcome {
    ProbeOutcome::Warn(format!(
        "Unreachable: '{}' => '{}' ({})",
        record.key, record.target, detail
    ))
}
