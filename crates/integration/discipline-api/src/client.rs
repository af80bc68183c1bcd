//! HTTP client for the discipline API
//!
//! Thin `reqwest` wrapper. No retries: a failed call is returned to the
//! caller as-is.

use std::time::Duration;

use async_trait::async_trait;
use discipline_config::ApiConfig;
use discipline_core::{AllocatedDiscipline, Discipline, Error, Project, Result};
use reqwest::{Response, StatusCode};

use crate::remote::DisciplineApi;
use crate::wire::{self, DisciplineDto, TokenResponse};

fn transport(e: reqwest::Error) -> Error {
    Error::Transport(e.to_string())
}

/// Fail on any non-success status, keeping the body for the message
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(Error::Transport(format!("HTTP {}: {}", status, body.trim())))
}

/// REST client bound to one [`ApiConfig`]
pub struct RestClient {
    config: ApiConfig,
    http: reqwest::Client,
}

impl RestClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("http client: {e}")))?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }
}

#[async_trait]
impl DisciplineApi for RestClient {
    async fn list_disciplines(&self, max_results: u32) -> Result<Vec<Discipline>> {
        let url = self.config.discipline_url();
        tracing::debug!(%url, max_results, "GET disciplines");

        let response = self
            .http
            .get(&url)
            .query(&[("MaxResultCount", max_results)])
            .send()
            .await
            .map_err(transport)?;

        let body = check(response).await?.text().await.map_err(transport)?;
        wire::parse_disciplines(&body)
    }

    async fn get_discipline(&self, id: &str) -> Result<Option<Discipline>> {
        let url = self.config.discipline_item_url(id)?;
        tracing::debug!(%url, "GET discipline");

        let response = self.http.get(&url).send().await.map_err(transport)?;
        if matches!(response.status(), StatusCode::NOT_FOUND | StatusCode::NO_CONTENT) {
            return Ok(None);
        }

        let body = check(response).await?.text().await.map_err(transport)?;
        Ok(wire::parse_optional::<DisciplineDto>(&body)?.map(DisciplineDto::into_discipline))
    }

    async fn create_discipline(&self, allocated: &AllocatedDiscipline) -> Result<Discipline> {
        let url = self.config.discipline_url();
        tracing::debug!(%url, code = %allocated.code, "POST discipline");

        let response = self
            .http
            .post(&url)
            .json(&DisciplineDto::for_create(allocated))
            .send()
            .await
            .map_err(transport)?;

        let body = check(response).await?.text().await.map_err(transport)?;
        wire::parse_optional::<DisciplineDto>(&body)?
            .map(DisciplineDto::into_discipline)
            .ok_or_else(|| Error::Decode("create returned an empty body".into()))
    }

    async fn update_discipline(&self, id: &str, record: &Discipline) -> Result<Discipline> {
        let url = self.config.discipline_item_url(id)?;
        tracing::debug!(%url, "PUT discipline");

        let response = self
            .http
            .put(&url)
            .json(&DisciplineDto::from(record))
            .send()
            .await
            .map_err(transport)?;

        let body = check(response).await?.text().await.map_err(transport)?;
        // Some servers answer an update with no body
        Ok(wire::parse_optional::<DisciplineDto>(&body)?
            .map(DisciplineDto::into_discipline)
            .unwrap_or_else(|| record.clone()))
    }

    async fn delete_discipline(&self, id: &str) -> Result<()> {
        let url = self.config.discipline_item_url(id)?;
        tracing::debug!(%url, "DELETE discipline");

        let response = self.http.delete(&url).send().await.map_err(transport)?;
        check(response).await?;
        Ok(())
    }

    async fn fetch_token(&self) -> Result<String> {
        let url = &self.config.token_url;
        tracing::debug!(%url, client_id = %self.config.client_id, "password grant");

        let form = [
            ("grant_type", "password"),
            ("scope", self.config.scope.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("username", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
            ("remember", "true"),
        ];

        let response = self
            .http
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!("HTTP {}: {}", status, body.trim())));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Auth(format!("token response: {e}")))?;

        token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Auth("token response has no access_token".into()))
    }

    async fn list_projects(&self, token: &str) -> Result<Vec<Project>> {
        let url = self.config.project_url();
        tracing::debug!(%url, "GET projects");

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;

        let body = check(response).await?.text().await.map_err(transport)?;
        wire::parse_projects(&body)
    }
}
