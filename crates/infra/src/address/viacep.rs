//! ViaCEP client implementation using reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use catalog_products::AddressRecord;

use super::AddressLookup;

/// Public ViaCEP endpoint.
pub const DEFAULT_BASE_URL: &str = "https://viacep.com.br/ws";

/// HTTP transport for the ViaCEP postal-code service.
///
/// One outbound GET per call. The only timeout is the one configured on the
/// underlying client.
#[derive(Debug, Clone)]
pub struct ViaCepClient {
    base_url: Url,
    client: Client,
}

impl ViaCepClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, client })
    }

    /// Build `{base}/{segments...}/json/` with every segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Option<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().ok()?;
            path.pop_if_empty();
            path.extend(segments);
            path.push("json");
            path.push("");
        }
        Some(url)
    }

    async fn fetch<T>(&self, segments: &[&str]) -> Option<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let Some(url) = self.endpoint(segments) else {
            tracing::warn!(base_url = %self.base_url, "address lookup base url cannot take path segments");
            return None;
        };
        tracing::debug!(%url, "address lookup");

        let response = match self.client.get(url.clone()).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(%url, error = %e, "address lookup request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "address lookup returned non-success status");
            return None;
        }

        match response.json::<T>().await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!(%url, error = %e, "address lookup returned malformed body");
                None
            }
        }
    }
}

#[async_trait]
impl AddressLookup for ViaCepClient {
    async fn resolve_by_postal_code(&self, postal_code: &str) -> Option<AddressRecord> {
        let body: ViaCepAddress = self.fetch(&[postal_code]).await?;
        if body.is_error() {
            tracing::warn!(postal_code, "address lookup has no record for postal code");
            return None;
        }
        Some(body.into_record())
    }

    async fn resolve_by_address(&self, state: &str, city: &str, street: &str) -> Vec<AddressRecord> {
        let body: Vec<ViaCepAddress> = self.fetch(&[state, city, street]).await.unwrap_or_default();
        body.into_iter()
            .filter(|a| !a.is_error())
            .map(ViaCepAddress::into_record)
            .collect()
    }
}

/// Wire format of a ViaCEP address. Unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ViaCepAddress {
    cep: Option<String>,
    logradouro: Option<String>,
    complemento: Option<String>,
    bairro: Option<String>,
    localidade: Option<String>,
    uf: Option<String>,
    /// Present (as `true` or `"true"`) when the code does not exist.
    erro: Option<serde_json::Value>,
}

impl ViaCepAddress {
    fn is_error(&self) -> bool {
        match &self.erro {
            None => false,
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(flag)) => flag.eq_ignore_ascii_case("true"),
            Some(_) => true,
        }
    }

    fn into_record(self) -> AddressRecord {
        AddressRecord {
            postal_code: non_empty(self.cep),
            street: non_empty(self.logradouro),
            complement: non_empty(self.complemento),
            neighborhood: non_empty(self.bairro),
            city: non_empty(self.localidade),
            state: non_empty(self.uf),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
