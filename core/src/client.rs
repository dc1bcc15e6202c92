//! Stateless HTTP request builder for the marketplace API.
//!
//! # Design
//! `MarketClient` holds only the API base URL and the optional API key. Every
//! marketplace action has a `build_*` method that produces an `HttpRequest`;
//! the caller executes it and hands the response to [`crate::interpret`].
//! Identifiers always travel as path segments, never as query parameters.

use serde::Serialize;

use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest};
use crate::types::{CreateInstance, Label, Prepay, SshKey, StateChange};

pub const DEFAULT_BASE_URL: &str = "https://console.vast.ai/api/v0";

/// Synchronous, stateless request builder for the marketplace API.
#[derive(Debug, Clone)]
pub struct MarketClient {
    base_url: String,
    api_key: Option<String>,
}

impl MarketClient {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(str::to_string),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_attach_ssh(&self, instance_id: u64, key: &SshKey) -> Result<HttpRequest, ClientError> {
        self.with_body(HttpMethod::Put, &format!("/instances/{instance_id}/ssh"), key)
    }

    pub fn build_detach_ssh(&self, instance_id: u64, key_id: u64) -> Result<HttpRequest, ClientError> {
        self.empty_body(HttpMethod::Delete, &format!("/instances/{instance_id}/ssh/{key_id}/"))
    }

    pub fn build_create_ssh_key(&self, key: &SshKey) -> Result<HttpRequest, ClientError> {
        self.with_body(HttpMethod::Post, "/ssh/", key)
    }

    pub fn build_create_instance(&self, ask_id: u64, input: &CreateInstance) -> Result<HttpRequest, ClientError> {
        self.with_body(HttpMethod::Put, &format!("/asks/{ask_id}/"), input)
    }

    pub fn build_destroy_instance(&self, id: u64) -> Result<HttpRequest, ClientError> {
        self.empty_body(HttpMethod::Delete, &format!("/instances/{id}/"))
    }

    pub fn build_prepay_instance(&self, id: u64, input: &Prepay) -> Result<HttpRequest, ClientError> {
        self.with_body(HttpMethod::Put, &format!("/instances/prepay/{id}/"), input)
    }

    pub fn build_reboot_instance(&self, id: u64) -> Result<HttpRequest, ClientError> {
        self.empty_body(HttpMethod::Put, &format!("/instances/reboot/{id}/"))
    }

    pub fn build_recycle_instance(&self, id: u64) -> Result<HttpRequest, ClientError> {
        self.empty_body(HttpMethod::Put, &format!("/instances/recycle/{id}/"))
    }

    pub fn build_change_state(&self, id: u64, input: &StateChange) -> Result<HttpRequest, ClientError> {
        self.with_body(HttpMethod::Put, &format!("/instances/{id}/"), input)
    }

    pub fn build_label_instance(&self, id: u64, input: &Label) -> Result<HttpRequest, ClientError> {
        self.with_body(HttpMethod::Put, &format!("/instances/{id}/"), input)
    }

    pub fn build_show_instances(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}/instances/?owner=me", self.base_url),
            headers: self.headers(false),
            body: None,
        }
    }

    fn with_body<T: Serialize>(&self, method: HttpMethod, path: &str, payload: &T) -> Result<HttpRequest, ClientError> {
        let body = serde_json::to_string(payload).map_err(|e| ClientError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            headers: self.headers(true),
            body: Some(body),
        })
    }

    /// Actions without a payload still send `{}`.
    fn empty_body(&self, method: HttpMethod, path: &str) -> Result<HttpRequest, ClientError> {
        self.with_body(method, path, &serde_json::Map::new())
    }

    fn headers(&self, json_body: bool) -> Vec<(String, String)> {
        let mut headers = Vec::with_capacity(2);
        if let Some(key) = &self.api_key {
            headers.push(("authorization".to_string(), format!("Bearer {key}")));
        }
        if json_body {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        headers
    }
}
