//! Remote data access. Controllers only ever see `Arc<dyn DataGateway>`.

use async_trait::async_trait;
use shared::{
    domain::{ClientId, EmployeeId},
    protocol::{
        ClientGrade, ClientRanking, EvaluationItem, EvaluationSubmitPayload,
        ProjectWithClientEvalStatus, Skill, StaffMember,
    },
};

use crate::error::GatewayResult;

mod http;
mod memory;

pub use http::HttpGateway;
pub use memory::{GatewayCall, GatewayOp, InMemoryGateway};

#[async_trait]
pub trait DataGateway: Send + Sync {
    /// Finished projects the employee took part in.
    async fn completed_projects(
        &self,
        employee_id: EmployeeId,
    ) -> GatewayResult<Vec<ProjectWithClientEvalStatus>>;
    async fn evaluation_items(&self) -> GatewayResult<Vec<EvaluationItem>>;
    async fn submit_evaluation(&self, payload: &EvaluationSubmitPayload) -> GatewayResult<()>;
    async fn client_grade(&self, client_id: ClientId) -> GatewayResult<ClientGrade>;
    async fn client_rankings(&self) -> GatewayResult<Vec<ClientRanking>>;
    /// Full roster; every row is `StaffMember::Employee`.
    async fn employees(&self) -> GatewayResult<Vec<StaffMember>>;
    /// Developers holding any of `skill_names`; every row is
    /// `StaffMember::Developer`. No match is an empty list, not an error.
    async fn search_developers(&self, skill_names: &[String]) -> GatewayResult<Vec<StaffMember>>;
    async fn skills(&self) -> GatewayResult<Vec<Skill>>;
    async fn assign_developer(&self, employee_id: EmployeeId) -> GatewayResult<()>;
}
