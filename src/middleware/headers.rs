use super::Middleware;
use crate::request::HttpRequest;
use crate::{ConfigError, FetchError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Adds default headers to requests that do not set them
#[derive(Debug, Clone)]
pub struct DefaultHeadersMiddleware {
    headers: HeaderMap,
}

impl DefaultHeadersMiddleware {
    pub fn new(headers: HeaderMap) -> Self {
        Self { headers }
    }

    /// Builds the middleware from the `[headers]` config table
    pub fn from_config(table: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::with_capacity(table.len());
        for (name, value) in table {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ConfigError::InvalidHeader(format!("invalid header name '{}'", name)))?;
            let value = HeaderValue::from_str(value).map_err(|_| {
                ConfigError::InvalidHeader(format!("invalid value for header '{}'", name))
            })?;
            headers.insert(name, value);
        }
        Ok(Self::new(headers))
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

impl Middleware for DefaultHeadersMiddleware {
    fn name(&self) -> &str {
        "default-headers"
    }

    fn process_request(
        &self,
        request: Arc<dyn HttpRequest>,
    ) -> Result<Arc<dyn HttpRequest>, FetchError> {
        let mut merged = request.headers().cloned().unwrap_or_default();
        let mut changed = false;
        for (name, value) in &self.headers {
            if !merged.contains_key(name) {
                merged.insert(name.clone(), value.clone());
                changed = true;
            }
        }

        if !changed {
            return Ok(request);
        }

        Ok(Arc::new(WithHeaders {
            inner: request,
            headers: merged,
        }))
    }
}

/// A request seen through an extended header map
#[derive(Debug)]
struct WithHeaders {
    inner: Arc<dyn HttpRequest>,
    headers: HeaderMap,
}

impl HttpRequest for WithHeaders {
    fn url(&self) -> &str {
        self.inner.url()
    }

    fn headers(&self) -> Option<&HeaderMap> {
        Some(&self.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{adapt_request, CrawlRequest};
    use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};

    fn middleware() -> DefaultHeadersMiddleware {
        let mut table = BTreeMap::new();
        table.insert("Accept-Language".to_string(), "en".to_string());
        table.insert("Accept".to_string(), "text/html".to_string());
        DefaultHeadersMiddleware::from_config(&table).unwrap()
    }

    #[test]
    fn test_adds_missing_headers() {
        let request = middleware()
            .process_request(adapt_request("https://example.com/"))
            .unwrap();

        assert_eq!(request.url(), "https://example.com/");
        let headers = request.headers().unwrap();
        assert_eq!(headers.get(ACCEPT_LANGUAGE).unwrap(), "en");
        assert_eq!(headers.get(ACCEPT).unwrap(), "text/html");
    }

    #[test]
    fn test_request_headers_win() {
        let request = CrawlRequest::new("https://example.com/")
            .unwrap()
            .with_header(ACCEPT_LANGUAGE, HeaderValue::from_static("de"));

        let processed = middleware()
            .process_request(adapt_request(request))
            .unwrap();

        let headers = processed.headers().unwrap();
        assert_eq!(headers.get(ACCEPT_LANGUAGE).unwrap(), "de");
        assert_eq!(headers.get(ACCEPT).unwrap(), "text/html");
    }

    #[test]
    fn test_empty_defaults_keep_request() {
        let empty = DefaultHeadersMiddleware::new(HeaderMap::new());
        assert!(empty.is_empty());

        let request = adapt_request("https://example.com/");
        let processed = empty.process_request(request.clone()).unwrap();
        assert!(Arc::ptr_eq(&request, &processed));
    }

    #[test]
    fn test_invalid_header_name() {
        let mut table = BTreeMap::new();
        table.insert("Not Valid".to_string(), "x".to_string());
        assert!(matches!(
            DefaultHeadersMiddleware::from_config(&table),
            Err(ConfigError::InvalidHeader(_))
        ));
    }
}
