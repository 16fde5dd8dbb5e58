//! Origin domain allow-list.

use url::Url;

use crate::error::FetchError;

/// Allow-list over origin hostnames. A URL passes when its hostname
/// contains any configured entry (substring match, as deployments pin
/// a single CDN domain and its regional variants).
#[derive(Debug, Clone)]
pub struct DomainPolicy {
    allowed: Vec<String>,
}

impl DomainPolicy {
    pub fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }

    /// Check a candidate origin URL against the allow-list.
    ///
    /// An empty allow-list rejects everything; unparsable URLs and
    /// URLs without a hostname are rejected rather than guessed at.
    pub fn check(&self, raw_url: &str) -> Result<(), FetchError> {
        let parsed = Url::parse(raw_url)
            .map_err(|e| FetchError::DomainRejected(format!("invalid url: {}", e)))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| FetchError::DomainRejected("url has no host".into()))?;

        if self.allowed.iter().any(|d| host.contains(d.as_str())) {
            Ok(())
        } else {
            Err(FetchError::DomainRejected(format!(
                "host {:?} not in allow-list",
                host
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> DomainPolicy {
        DomainPolicy::new(vec!["images.example.com".into()])
    }

    #[test]
    fn allowed_host_passes() {
        assert!(policy().check("https://images.example.com/cat.jpg").is_ok());
    }

    #[test]
    fn other_host_rejected() {
        assert!(policy().check("https://evil.test/cat.jpg").is_err());
    }

    #[test]
    fn garbage_url_rejected() {
        assert!(policy().check("not a url").is_err());
    }

    #[test]
    fn empty_allow_list_rejects_all() {
        let policy = DomainPolicy::new(Vec::new());
        assert!(policy.check("https://images.example.com/cat.jpg").is_err());
    }
}
