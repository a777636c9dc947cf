use miette::miette;
use miette::Context;
use miette::IntoDiagnostic;
use parking_lot::Mutex;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use secrecy::SecretString;
use serde::de::DeserializeOwned;

use crate::credentials::Credential;
use crate::endpoint::Endpoint;

/// Gerrit prefixes JSON responses with this guard to block cross-site script
/// inclusion.
const XSSI_GUARD: &str = ")]}'\n";

/// Whether to verify TLS certificates when talking to the Gerrit server.
///
/// Gerrit deployments sit behind internal CAs often enough that verification
/// is off unless asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tls {
    VerifyCertificates,
    AcceptInvalidCertificates,
}

/// Gerrit REST API client.
///
/// All requests go to the authenticated `/a/` namespace with HTTP basic auth.
pub struct GerritRest {
    client: Client,
    base_url: String,
    username: String,
    password: Option<SecretString>,
}

impl GerritRest {
    pub fn new(credential: &Credential, tls: Tls) -> miette::Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(matches!(tls, Tls::AcceptInvalidCertificates))
            .build()
            .into_diagnostic()
            .wrap_err("Failed to construct HTTP client")?;
        Ok(Self {
            client,
            base_url: credential.api_base(),
            username: credential.username.clone(),
            password: credential.password().cloned(),
        })
    }

    fn url(&self, endpoint: &Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// GET an endpoint, returning `None` for a 404 response.
    ///
    /// Transport and protocol failures are fatal; there is no retry layer.
    pub fn get<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> miette::Result<Option<T>> {
        let url = self.url(endpoint);
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(&url)
            .basic_auth(
                &self.username,
                self.password
                    .as_ref()
                    .map(|password| password.expose_secret()),
            )
            .send()
            .into_diagnostic()
            .wrap_err_with(|| format!("Request failed: GET {url}"))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = response.text().into_diagnostic()?;
        if status != StatusCode::OK {
            return Err(miette!("Bad response: {status} ({body})"));
        }
        let json = strip_guard(&body).wrap_err_with(|| format!("GET {url}"))?;
        serde_json::from_str(json)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to decode response from GET {url}"))
            .map(Some)
    }

    /// GET several endpoints concurrently, preserving input order.
    ///
    /// All requests run to completion; the first failure in input order then
    /// fails the whole batch.
    pub fn get_many<T>(&self, endpoints: &[Endpoint]) -> miette::Result<Vec<Option<T>>>
    where
        T: DeserializeOwned + Send,
    {
        let slots = Mutex::new(
            endpoints
                .iter()
                .map(|_| None)
                .collect::<Vec<Option<miette::Result<Option<T>>>>>(),
        );
        std::thread::scope(|scope| {
            for (index, endpoint) in endpoints.iter().enumerate() {
                let slots = &slots;
                scope.spawn(move || {
                    let result = self.get(endpoint);
                    slots.lock()[index] = Some(result);
                });
            }
        });
        slots
            .into_inner()
            .into_iter()
            .map(|slot| slot.expect("Every request thread fills its slot"))
            .collect()
    }
}

/// Strip the anti-XSSI guard from a response body.
///
/// A 200 response without the guard means we are not talking to a Gerrit
/// REST endpoint; decoding the body as JSON would only obscure that.
fn strip_guard(body: &str) -> miette::Result<&str> {
    body.strip_prefix(XSSI_GUARD).ok_or_else(|| {
        miette!("Response does not start with the Gerrit guard prefix {XSSI_GUARD:?}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_guard() {
        assert_eq!(strip_guard(")]}'\n{\"ok\": true}").unwrap(), "{\"ok\": true}");
    }

    #[test]
    fn test_strip_guard_missing() {
        assert!(strip_guard("{\"ok\": true}").is_err());
        assert!(strip_guard("").is_err());
        // The guard has to come with its trailing newline.
        assert!(strip_guard(")]}'").is_err());
    }
}
