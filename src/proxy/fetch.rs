//! Origin fetching.
//!
//! One `reqwest::Client` per process, built from config at startup:
//! 10s timeout, five redirect hops, optional basic auth. The request
//! profile (user-agent, accept lists) is fixed; only an allow-listed
//! subset of inbound headers is forwarded. The fetcher owns the domain
//! allow-list check, so nothing reaches the network without passing it.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect;

use crate::config::OriginConfig;
use crate::error::FetchError;
use crate::proxy::decode::ACCEPTED_ENCODINGS;
use crate::security::DomainPolicy;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; rv:121.0) Gecko/20100101 Firefox/121.0";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,\
                      image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8,\
                      application/signed-exchange;v=b3;q=0.9";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const VIA: &str = "2.0 imgpress";

/// Inbound headers worth forwarding to the origin.
const FORWARDED_HEADERS: [&str; 3] = ["cookie", "dnt", "referer"];

/// Raw origin response, owned by the fetcher until handed to the
/// decoder.
#[derive(Debug)]
pub struct OriginResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl OriginResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Issues outbound requests with the fixed identity profile.
pub struct OriginFetcher {
    client: reqwest::Client,
    policy: DomainPolicy,
    config: OriginConfig,
}

impl OriginFetcher {
    pub fn new(config: OriginConfig) -> Result<Self, reqwest::Error> {
        // Default reqwest features leave transparent decompression
        // off, so the origin's content-encoding survives to the
        // decoder stage.
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .redirect(redirect::Policy::limited(config.max_redirects))
            .build()?;
        let policy = DomainPolicy::new(config.allowed_domains.clone());
        Ok(Self {
            client,
            policy,
            config,
        })
    }

    /// Fetch the origin URL, forwarding an allow-listed subset of the
    /// inbound headers.
    ///
    /// Any status below 500 is a successful fetch; 5xx responses are
    /// returned as-is for the orchestrator to judge. No retries.
    pub async fn fetch(
        &self,
        url: &str,
        inbound: &HeaderMap,
        client_addr: Option<&str>,
    ) -> Result<OriginResponse, FetchError> {
        self.policy.check(url)?;

        let mut request = self
            .client
            .get(url)
            .headers(self.build_headers(inbound, client_addr));

        if let Some(creds) = &self.config.credentials {
            request = request.basic_auth(&creds.username, Some(&creds.password));
        }

        let response = request.send().await.map_err(classify)?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::TransportError(format!("body read failed: {}", e)))?;

        Ok(OriginResponse {
            status,
            headers,
            body,
        })
    }

    fn build_headers(&self, inbound: &HeaderMap, client_addr: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for name in FORWARDED_HEADERS {
            if let Some(value) = inbound.get(name) {
                // Static names, known valid.
                headers.insert(HeaderName::from_static(name), value.clone());
            }
        }

        headers.insert("user-agent", HeaderValue::from_static(USER_AGENT));
        headers.insert("accept", HeaderValue::from_static(ACCEPT));
        headers.insert("accept-language", HeaderValue::from_static(ACCEPT_LANGUAGE));
        headers.insert(
            "accept-encoding",
            HeaderValue::from_static(ACCEPTED_ENCODINGS),
        );
        headers.insert(
            "cache-control",
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        );
        headers.insert("dnt", HeaderValue::from_static("1"));
        headers.insert("via", HeaderValue::from_static(VIA));

        let forwarded_for = inbound
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .or(client_addr);
        if let Some(addr) = forwarded_for {
            if let Ok(value) = HeaderValue::from_str(addr) {
                headers.insert("x-forwarded-for", value);
            }
        }

        headers
    }
}

/// Classify a reqwest failure into the fetch-error taxonomy: nothing
/// came back, the transport broke, or the request never left.
fn classify(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::NoResponse(error.to_string())
    } else if error.is_builder() {
        FetchError::SetupError(error.to_string())
    } else if error.is_redirect() {
        FetchError::TransportError(format!("redirect limit exhausted: {}", error))
    } else {
        FetchError::TransportError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::OriginConfig;

    fn fetcher(allowed: Vec<String>) -> OriginFetcher {
        let config = OriginConfig {
            allowed_domains: allowed,
            ..OriginConfig::default()
        };
        OriginFetcher::new(config).unwrap()
    }

    #[tokio::test]
    async fn disallowed_domain_is_rejected_before_any_io() {
        let fetcher = fetcher(vec!["images.example.com".into()]);
        let err = fetcher
            .fetch("https://evil.test/a.jpg", &HeaderMap::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::DomainRejected(_)));
    }

    #[tokio::test]
    async fn invalid_url_is_rejected() {
        let fetcher = fetcher(vec!["images.example.com".into()]);
        let err = fetcher
            .fetch("not a url at all", &HeaderMap::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::DomainRejected(_)));
    }

    #[test]
    fn forwarded_header_allow_list_is_honored() {
        let fetcher = fetcher(vec!["images.example.com".into()]);
        let mut inbound = HeaderMap::new();
        inbound.insert("cookie", HeaderValue::from_static("session=1"));
        inbound.insert("authorization", HeaderValue::from_static("Basic abc"));
        inbound.insert("referer", HeaderValue::from_static("https://a.test/"));

        let headers = fetcher.build_headers(&inbound, Some("203.0.113.9"));
        assert_eq!(headers.get("cookie").unwrap(), "session=1");
        assert_eq!(headers.get("referer").unwrap(), "https://a.test/");
        assert!(headers.get("authorization").is_none());
        assert_eq!(headers.get("x-forwarded-for").unwrap(), "203.0.113.9");
        assert_eq!(headers.get("accept-encoding").unwrap(), ACCEPTED_ENCODINGS);
    }
}
