use thiserror::Error;
use url::Url;

use crate::domain::{Classification, SafetyList};

#[derive(Debug, Error)]
#[error("invalid URL {url:?}: {source}")]
pub struct InvalidUrl {
    pub url: String,
    #[source]
    pub source: url::ParseError,
}

/// Host used for matching: the URL's hostname without a leading `www.`.
/// URLs without a host yield an empty string.
pub fn match_host(raw_url: &str) -> Result<String, InvalidUrl> {
    let url = Url::parse(raw_url).map_err(|source| InvalidUrl {
        url: raw_url.to_string(),
        source,
    })?;
    let host = url.host_str().unwrap_or_default();
    Ok(host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// Safe when any entry occurs anywhere in the host. This is plain substring
/// containment, so `example.com` also matches `notexample.com.evil.org`.
pub fn classify(raw_url: &str, list: &SafetyList) -> Result<Classification, InvalidUrl> {
    let host = match_host(raw_url)?;
    Ok(classify_host(&host, list))
}

pub fn classify_host(host: &str, list: &SafetyList) -> Classification {
    if list.entries().iter().any(|entry| host.contains(entry.as_str())) {
        Classification::Safe
    } else {
        Classification::Unknown
    }
}
