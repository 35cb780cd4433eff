//! Access to the HTTP request currently being handled.

use url::Url;

use crate::error::{Result, StashError};

/// Read access to an HTTP request.
pub trait CurrentRequest {
    /// Absolute URL of the request.
    fn url(&self) -> &Url;

    /// HTTP method, upper-case.
    fn method(&self) -> &str;

    /// First value of a query parameter.
    fn query(&self, name: &str) -> Option<String> {
        self.url()
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    /// Check the HTTP method, ignoring case.
    fn is_method(&self, method: &str) -> bool {
        self.method().eq_ignore_ascii_case(method)
    }
}

/// Plain HTTP request description: method plus absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    method: String,
    url: Url,
}

impl HttpRequest {
    /// Create a request from a parsed URL.
    pub fn new(method: impl Into<String>, url: Url) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
            url,
        }
    }

    /// Create a `GET` request, parsing the URL.
    pub fn get(url: &str) -> Result<Self> {
        Self::parse("GET", url)
    }

    /// Create a request, parsing the URL.
    pub fn parse(method: &str, url: &str) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|source| StashError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        Ok(Self::new(method, parsed))
    }
}

impl CurrentRequest for HttpRequest {
    fn url(&self) -> &Url {
        &self.url
    }

    fn method(&self) -> &str {
        &self.method
    }
}

impl<T: CurrentRequest + ?Sized> CurrentRequest for &T {
    fn url(&self) -> &Url {
        (**self).url()
    }

    fn method(&self) -> &str {
        (**self).method()
    }
}
