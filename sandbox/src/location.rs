//! The page location reported to the guest by `get_href`, `get_hostname`
//! and `get_protocol`.

use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub href: String,
    pub hostname: String,
    /// Scheme followed by `:`, as in `https:`.
    pub protocol: String,
}

impl Location {
    /// Parse the configured origin. An unparsable location is reported as
    /// empty strings.
    pub fn parse(location: &str) -> Self {
        match Url::parse(location) {
            Ok(url) => Self {
                href: url.as_str().to_string(),
                hostname: url.host_str().unwrap_or_default().to_string(),
                protocol: format!("{}:", url.scheme()),
            },
            Err(e) => {
                log::warn!("invalid location {location:?}: {e}");
                Self::default()
            }
        }
    }
}
