//! Deployment control-plane client (REST JSON, SigV4 service `bedrock-agentcore`).

use anyhow::{Context, Result};
use percent_encoding::utf8_percent_encode;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::application::ports::{ControlPlane, CreateOutcome};
use crate::domain::deployment::RuntimeRequest;
use crate::domain::{AgentStatus, EndpointStatus, RuntimeRecord, RuntimeStatus};
use crate::infra::aws::{AwsErrorBody, Endpoints, SigV4Signer, UNRESERVED, send_signed};

pub const SIGNING_SERVICE: &str = "bedrock-agentcore";

const LIST_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuntimeResponse {
    agent_runtime_id: String,
    agent_runtime_arn: String,
    #[serde(default)]
    agent_runtime_version: Option<String>,
    #[serde(default)]
    status: RuntimeStatus,
}

impl RuntimeResponse {
    fn record(self) -> RuntimeRecord {
        RuntimeRecord {
            runtime_id: self.agent_runtime_id,
            runtime_arn: self.agent_runtime_arn,
            version: self.agent_runtime_version,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuntimeSummary {
    agent_runtime_id: String,
    agent_runtime_arn: String,
    agent_runtime_name: String,
    #[serde(default)]
    agent_runtime_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    agent_runtimes: Vec<RuntimeSummary>,
    #[serde(default)]
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EndpointResponse {
    #[serde(default)]
    status: RuntimeStatus,
    #[serde(default)]
    agent_runtime_endpoint_arn: Option<String>,
}

/// Production [`ControlPlane`] over HTTPS.
pub struct HttpControlPlane {
    client: Client,
    signer: SigV4Signer,
    base_url: String,
    data_base_url: String,
}

impl HttpControlPlane {
    #[must_use]
    pub fn new(client: Client, signer: SigV4Signer, endpoints: &Endpoints) -> Self {
        Self {
            client,
            signer,
            base_url: endpoints.control.trim_end_matches('/').to_string(),
            data_base_url: endpoints.data.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<(StatusCode, String)> {
        send_signed(&self.client, &self.signer, method, &self.url(path), &[], body).await
    }
}

fn segment(id: &str) -> String {
    utf8_percent_encode(id, UNRESERVED).to_string()
}

fn rejected(what: &str, status: StatusCode, body: &str) -> anyhow::Error {
    anyhow::anyhow!("{what}: {}", AwsErrorBody::parse(body).describe(status))
}

impl ControlPlane for HttpControlPlane {
    async fn create_runtime(&self, request: &RuntimeRequest) -> Result<CreateOutcome> {
        let body = request.to_wire(true);
        let (status, text) = self.call(Method::PUT, "/runtimes/", Some(&body)).await?;
        if status == StatusCode::CONFLICT {
            let err = AwsErrorBody::parse(&text);
            return Ok(CreateOutcome::Conflict(err.describe(status)));
        }
        if !status.is_success() {
            return Err(rejected("CreateAgentRuntime", status, &text));
        }
        let parsed: RuntimeResponse =
            serde_json::from_str(&text).context("Failed to parse CreateAgentRuntime response")?;
        Ok(CreateOutcome::Created(parsed.record()))
    }

    async fn update_runtime(
        &self,
        runtime_id: &str,
        request: &RuntimeRequest,
    ) -> Result<RuntimeRecord> {
        let body = request.to_wire(false);
        let path = format!("/runtimes/{}/", segment(runtime_id));
        let (status, text) = self.call(Method::PUT, &path, Some(&body)).await?;
        if !status.is_success() {
            return Err(rejected("UpdateAgentRuntime", status, &text));
        }
        let parsed: RuntimeResponse =
            serde_json::from_str(&text).context("Failed to parse UpdateAgentRuntime response")?;
        Ok(parsed.record())
    }

    async fn find_runtime(&self, name: &str) -> Result<Option<RuntimeRecord>> {
        let mut next_token: Option<String> = None;
        loop {
            let mut body = json!({ "maxResults": LIST_PAGE_SIZE });
            if let Some(token) = &next_token {
                body["nextToken"] = json!(token);
            }
            let (status, text) = self.call(Method::POST, "/runtimes/", Some(&body)).await?;
            if !status.is_success() {
                return Err(rejected("ListAgentRuntimes", status, &text));
            }
            let page: ListResponse = serde_json::from_str(&text)
                .context("Failed to parse ListAgentRuntimes response")?;
            if let Some(found) = page
                .agent_runtimes
                .into_iter()
                .find(|r| r.agent_runtime_name == name)
            {
                return Ok(Some(RuntimeRecord {
                    runtime_id: found.agent_runtime_id,
                    runtime_arn: found.agent_runtime_arn,
                    version: found.agent_runtime_version,
                }));
            }
            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => return Ok(None),
            }
        }
    }

    async fn get_runtime(&self, runtime_id: &str) -> Result<AgentStatus> {
        let path = format!("/runtimes/{}/", segment(runtime_id));
        let (status, text) = self.call(Method::GET, &path, None).await?;
        if !status.is_success() {
            return Err(rejected("GetAgentRuntime", status, &text));
        }
        let parsed: RuntimeResponse =
            serde_json::from_str(&text).context("Failed to parse GetAgentRuntime response")?;
        Ok(AgentStatus {
            status: parsed.status,
            arn: Some(parsed.agent_runtime_arn),
        })
    }

    async fn get_endpoint(&self, runtime_id: &str, endpoint_name: &str) -> Result<EndpointStatus> {
        let path = format!(
            "/runtimes/{}/runtime-endpoints/{}/",
            segment(runtime_id),
            segment(endpoint_name)
        );
        let (status, text) = self.call(Method::GET, &path, None).await?;
        if !status.is_success() {
            return Err(rejected("GetAgentRuntimeEndpoint", status, &text));
        }
        let parsed: EndpointResponse = serde_json::from_str(&text)
            .context("Failed to parse GetAgentRuntimeEndpoint response")?;
        Ok(EndpointStatus {
            status: parsed.status,
            url: None,
            arn: parsed.agent_runtime_endpoint_arn,
        })
    }

    fn data_plane_base(&self) -> String {
        self.data_base_url.clone()
    }
}
