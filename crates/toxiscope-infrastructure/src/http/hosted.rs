//! Base URL and public key of the hosted auth/data service.

use super::transport::{Bearer, HttpTransport, join_url};
use reqwest::{Method, RequestBuilder};

#[derive(Clone)]
pub struct HostedService {
    transport: HttpTransport,
    base_url: String,
    anon_key: Option<String>,
}

impl HostedService {
    pub fn new(transport: HttpTransport, base_url: impl Into<String>, anon_key: Option<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            anon_key,
        }
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    /// Starts a request against `path`, with the `apikey` header set when a key is configured.
    pub fn request(&self, method: Method, path: &str, bearer: Bearer<'_>) -> RequestBuilder {
        let url = join_url(&self.base_url, path);
        let builder = self.transport.request(method, &url, bearer);
        match &self.anon_key {
            Some(key) => builder.header("apikey", key),
            None => builder,
        }
    }
}
