//! Shared WebSocket adapter state.
//!
//! The socket depends on the [`FrameProcessor`] port rather than on concrete
//! services so sessions can be driven by deterministic test doubles.

use std::sync::Arc;

use tracing::warn;
use url::Url;

use crate::domain::DEFAULT_MAX_FRAME_BYTES;
use crate::domain::ports::FrameProcessor;

/// Room left in a socket message for the JSON envelope around the image.
const ENVELOPE_ALLOWANCE: usize = 4 * 1024;

/// Largest text message that can carry an image of `max_frame_bytes` once
/// base64 encoded, plus a data-URL prefix and the other frame fields.
pub fn max_message_bytes(max_frame_bytes: usize) -> usize {
    max_frame_bytes
        .div_ceil(3)
        .saturating_mul(4)
        .saturating_add(ENVELOPE_ALLOWANCE)
}

/// Origins permitted to open the recognition socket.
///
/// Entries are exact origins (`https://campus.example`, `http://localhost:5173`)
/// or wildcard subdomains (`https://*.campus.example`).
#[derive(Debug, Clone, Default)]
pub struct OriginAllowList {
    exact: Vec<(String, String, Option<u16>)>,
    suffixes: Vec<(String, String)>,
}

impl OriginAllowList {
    /// Build the allow-list, skipping entries that do not parse as origins.
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        for raw in origins {
            let raw = raw.as_ref().trim();
            if let Some((scheme, rest)) = raw.split_once("://*.") {
                list.suffixes
                    .push((scheme.to_ascii_lowercase(), format!(".{}", rest.to_ascii_lowercase())));
                continue;
            }
            match Url::parse(raw) {
                Ok(url) => {
                    if let Some(host) = url.host_str() {
                        list.exact
                            .push((url.scheme().to_owned(), host.to_owned(), url.port()));
                    }
                }
                Err(error) => {
                    warn!(origin = raw, error = %error, "ignoring unparsable allowed origin");
                }
            }
        }
        list
    }

    /// Whether a parsed `Origin` header matches an entry.
    pub fn allows(&self, origin: &Url) -> bool {
        let Some(host) = origin.host_str() else {
            return false;
        };
        let scheme = origin.scheme();
        let port = origin.port();
        self.exact
            .iter()
            .any(|(s, h, p)| s == scheme && h == host && *p == port)
            || self
                .suffixes
                .iter()
                .any(|(s, suffix)| s == scheme && port.is_none() && host.ends_with(suffix.as_str()))
    }
}

/// Dependency bundle for the recognition socket.
#[derive(Clone)]
pub struct WsState {
    pub recognition: Arc<dyn FrameProcessor>,
    pub origins: Arc<OriginAllowList>,
    /// Cap on one client message, continuations included.
    pub max_message_bytes: usize,
}

impl WsState {
    pub fn new(recognition: Arc<dyn FrameProcessor>, origins: OriginAllowList) -> Self {
        Self {
            recognition,
            origins: Arc::new(origins),
            max_message_bytes: max_message_bytes(DEFAULT_MAX_FRAME_BYTES),
        }
    }

    /// Size the message cap for images of up to `max_frame_bytes` decoded.
    #[must_use]
    pub fn with_frame_limit(mut self, max_frame_bytes: usize) -> Self {
        self.max_message_bytes = max_message_bytes(max_frame_bytes);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://localhost:5173", true)]
    #[case("http://localhost:3000", false)]
    #[case("http://localhost", false)]
    #[case("https://campus.example", true)]
    #[case("https://lab.campus.example", true)]
    #[case("https://campus.example.evil.com", false)]
    #[case("http://lab.campus.example", false)]
    fn evaluates_allow_list(#[case] origin: &str, #[case] expected: bool) {
        let list = OriginAllowList::new([
            "http://localhost:5173",
            "https://campus.example",
            "https://*.campus.example",
            "not an origin",
        ]);
        let parsed = Url::parse(origin).expect("url should parse");
        assert_eq!(list.allows(&parsed), expected);
    }

    #[rstest]
    #[case(3, 4 + ENVELOPE_ALLOWANCE)]
    #[case(4, 8 + ENVELOPE_ALLOWANCE)]
    #[case(DEFAULT_MAX_FRAME_BYTES, 2_796_204 + ENVELOPE_ALLOWANCE)]
    fn message_cap_covers_base64_image(#[case] frame_bytes: usize, #[case] expected: usize) {
        assert_eq!(max_message_bytes(frame_bytes), expected);
    }
}
