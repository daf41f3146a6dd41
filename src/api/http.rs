use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::{ApiError, ApiGateway, RecordId};
use crate::account::AccountRecord;
use crate::wizard::PersonRecord;

const PERSON_PATH: &str = "acolhido";
const ACCOUNT_PATH: &str = "usuario";

/// JSON-over-HTTP gateway backed by a blocking reqwest client.
pub struct HttpGateway {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpGateway {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .ok()
            .filter(|body| !body.trim().is_empty())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string());
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.client.get(self.url(path)))?;
        response
            .json::<T>()
            .map_err(|err| ApiError::Decode(err.to_string()))
    }
}

impl ApiGateway for HttpGateway {
    fn create_person(&self, record: &PersonRecord) -> Result<(), ApiError> {
        tracing::info!("creating acolhido");
        self.send(self.client.post(self.url(PERSON_PATH)).json(record))
            .map(|_| ())
    }

    fn update_person(&self, record: &PersonRecord) -> Result<(), ApiError> {
        tracing::info!(id = ?record.id, "updating acolhido");
        self.send(self.client.put(self.url(PERSON_PATH)).json(record))
            .map(|_| ())
    }

    fn get_person(&self, id: RecordId) -> Result<PersonRecord, ApiError> {
        self.fetch(&format!("{PERSON_PATH}/{id}"))
    }

    fn create_account(&self, record: &AccountRecord) -> Result<(), ApiError> {
        tracing::info!(login = %record.login, "creating account");
        self.send(self.client.post(self.url(ACCOUNT_PATH)).json(record))
            .map(|_| ())
    }

    fn update_account(&self, record: &AccountRecord) -> Result<(), ApiError> {
        tracing::info!(id = ?record.id, "updating account");
        self.send(self.client.put(self.url(ACCOUNT_PATH)).json(record))
            .map(|_| ())
    }

    fn update_account_status(&self, id: RecordId, active: bool) -> Result<(), ApiError> {
        tracing::info!(id, active, "updating account status");
        let path = format!("{ACCOUNT_PATH}/{id}/status");
        self.send(
            self.client
                .patch(self.url(&path))
                .json(&json!({ "status": active })),
        )
        .map(|_| ())
    }

    fn get_account(&self, id: RecordId) -> Result<AccountRecord, ApiError> {
        self.fetch(&format!("{ACCOUNT_PATH}/{id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let gateway =
            HttpGateway::new("http://localhost:8080/api/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(gateway.base_url(), "http://localhost:8080/api");
        assert_eq!(gateway.url("usuario/3"), "http://localhost:8080/api/usuario/3");
    }
}
