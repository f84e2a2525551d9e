use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{ClientId, EmployeeId},
    error::ApiError,
    protocol::{
        ClientGrade, ClientRanking, Developer, Employee, EvaluationItem, EvaluationSubmitPayload,
        ProjectWithClientEvalStatus, Skill, StaffMember,
    },
};
use tracing::{debug, info, warn};
use url::Url;

use super::DataGateway;
use crate::error::{GatewayError, GatewayResult};

/// `DataGateway` backed by the business HTTP API.
#[derive(Clone)]
pub struct HttpGateway {
    http: Client,
    base_url: Url,
}

impl HttpGateway {
    pub fn new(base_url: &str) -> GatewayResult<Self> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> GatewayResult<Self> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base_url = Url::parse(&normalized).map_err(|e| GatewayError::InvalidBaseUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `path` is relative to the base url so a base with a path prefix keeps it.
    fn endpoint(&self, path: &str) -> GatewayResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| GatewayError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                message: e.to_string(),
            })
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&EvaluationSubmitPayload>,
    ) -> GatewayResult<(String, Response)> {
        let label = format!("{method} {}", url.path());
        debug!(endpoint = %label, "api: request");
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::transport(&label, e.to_string()))?;
        Ok((label, response))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> GatewayResult<T> {
        let (label, response) = self.send(Method::GET, url, None).await?;
        let response = check_status(&label, response).await?;
        read_json(&label, response).await
    }
}

async fn check_status(endpoint: &str, response: Response) -> GatewayResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body)
        .ok()
        .map(|err| err.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| fallback_message(status));
    warn!(endpoint, status = status.as_u16(), %message, "api: request rejected");
    Err(GatewayError::status(endpoint, status.as_u16(), message))
}

fn fallback_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()))
}

async fn read_json<T: DeserializeOwned>(endpoint: &str, response: Response) -> GatewayResult<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| GatewayError::transport(endpoint, e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

#[async_trait]
impl DataGateway for HttpGateway {
    async fn completed_projects(
        &self,
        employee_id: EmployeeId,
    ) -> GatewayResult<Vec<ProjectWithClientEvalStatus>> {
        let mut url = self.endpoint("api/client-evaluations/projects")?;
        url.query_pairs_mut()
            .append_pair("employee_id", &employee_id.to_string());
        self.get_json(url).await
    }

    async fn evaluation_items(&self) -> GatewayResult<Vec<EvaluationItem>> {
        let url = self.endpoint("api/client-evaluations/items")?;
        self.get_json(url).await
    }

    async fn submit_evaluation(&self, payload: &EvaluationSubmitPayload) -> GatewayResult<()> {
        let url = self.endpoint("api/client-evaluations")?;
        let (label, response) = self.send(Method::POST, url, Some(payload)).await?;
        check_status(&label, response).await?;
        info!(
            project_id = payload.project_id.0,
            client_id = payload.client_id.0,
            scores = payload.scores.len(),
            "api: evaluation submitted"
        );
        Ok(())
    }

    async fn client_grade(&self, client_id: ClientId) -> GatewayResult<ClientGrade> {
        let url = self.endpoint(&format!("api/clients/{}/grade", client_id.0))?;
        self.get_json(url).await
    }

    async fn client_rankings(&self) -> GatewayResult<Vec<ClientRanking>> {
        let url = self.endpoint("api/client-evaluations/ranking")?;
        self.get_json(url).await
    }

    async fn employees(&self) -> GatewayResult<Vec<StaffMember>> {
        let url = self.endpoint("api/employees")?;
        let employees: Vec<Employee> = self.get_json(url).await?;
        Ok(employees.into_iter().map(StaffMember::from).collect())
    }

    async fn search_developers(&self, skill_names: &[String]) -> GatewayResult<Vec<StaffMember>> {
        if skill_names.is_empty() {
            return Ok(Vec::new());
        }

        let mut url = self.endpoint("api/developers/search")?;
        {
            let mut query = url.query_pairs_mut();
            for name in skill_names {
                query.append_pair("skill_names", name);
            }
        }

        match self.get_json::<Vec<Developer>>(url).await {
            Ok(developers) => Ok(developers.into_iter().map(StaffMember::from).collect()),
            Err(err) if err.is_not_found() => {
                info!(skills = ?skill_names, "api: developer search returned no matches");
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }

    async fn skills(&self) -> GatewayResult<Vec<Skill>> {
        let url = self.endpoint("api/skill")?;
        self.get_json(url).await
    }

    async fn assign_developer(&self, employee_id: EmployeeId) -> GatewayResult<()> {
        let url = self.endpoint(&format!("api/developers/{}/assign", employee_id.0))?;
        let (label, response) = self.send(Method::PATCH, url, None).await?;
        check_status(&label, response).await?;
        info!(employee_id = employee_id.0, "api: developer assigned");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/http_gateway_tests.rs"]
mod tests;
