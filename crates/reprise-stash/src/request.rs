//! Application-level request description.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Flags carried by an application request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestFlag {
    /// Originally received over HTTPS.
    Secured,
    /// Replayed from the request stash rather than received fresh.
    Restored,
}

/// An application request: which presenter to run, with which parameters.
///
/// This is what gets stashed and replayed, independent of the raw HTTP
/// request that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppRequest {
    presenter: String,
    method: String,
    #[serde(default)]
    params: BTreeMap<String, Value>,
    #[serde(default)]
    post: BTreeMap<String, Value>,
    #[serde(default)]
    flags: BTreeSet<RequestFlag>,
}

impl AppRequest {
    /// Create a request for a presenter with the given HTTP method.
    pub fn new(presenter: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            presenter: presenter.into(),
            method: method.into().to_ascii_uppercase(),
            params: BTreeMap::new(),
            post: BTreeMap::new(),
            flags: BTreeSet::new(),
        }
    }

    /// Set one parameter.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Replace all parameters.
    pub fn with_parameters(mut self, params: BTreeMap<String, Value>) -> Self {
        self.params = params;
        self
    }

    /// Replace the POST body.
    pub fn with_post(mut self, post: BTreeMap<String, Value>) -> Self {
        self.post = post;
        self
    }

    /// Set or clear a flag.
    pub fn with_flag(mut self, flag: RequestFlag, on: bool) -> Self {
        self.set_flag(flag, on);
        self
    }

    /// Presenter name.
    pub fn presenter_name(&self) -> &str {
        &self.presenter
    }

    /// HTTP method, upper-case.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Check the HTTP method, ignoring case.
    pub fn is_method(&self, method: &str) -> bool {
        self.method.eq_ignore_ascii_case(method)
    }

    /// All parameters.
    pub fn parameters(&self) -> &BTreeMap<String, Value> {
        &self.params
    }

    /// One parameter.
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Set one parameter, returning the previous value.
    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.params.insert(name.into(), value.into())
    }

    /// POST body.
    pub fn post(&self) -> &BTreeMap<String, Value> {
        &self.post
    }

    /// Set or clear a flag.
    pub fn set_flag(&mut self, flag: RequestFlag, on: bool) {
        if on {
            self.flags.insert(flag);
        } else {
            self.flags.remove(&flag);
        }
    }

    /// Check a flag.
    pub fn has_flag(&self, flag: RequestFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Whether this request was replayed from the stash.
    pub fn is_restored(&self) -> bool {
        self.has_flag(RequestFlag::Restored)
    }

    /// Whether this request was received over HTTPS.
    pub fn is_secured(&self) -> bool {
        self.has_flag(RequestFlag::Secured)
    }
}
