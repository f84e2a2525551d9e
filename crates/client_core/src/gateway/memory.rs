use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use shared::{
    domain::{
        AssignmentStatus, ClientId, EmployeeId, EvalStatus, Grade, ItemCode, ProjectId, SkillId,
    },
    protocol::{
        ClientGrade, ClientRanking, Developer, Employee, EvaluationItem, EvaluationSubmitPayload,
        ProjectWithClientEvalStatus, Skill, StaffMember,
    },
};
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use super::DataGateway;
use crate::error::{GatewayError, GatewayResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    CompletedProjects,
    EvaluationItems,
    SubmitEvaluation,
    ClientGrade,
    ClientRankings,
    Employees,
    SearchDevelopers,
    Skills,
    AssignDeveloper,
}

/// One recorded call against the in-memory gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    CompletedProjects(EmployeeId),
    EvaluationItems,
    SubmitEvaluation(EvaluationSubmitPayload),
    ClientGrade(ClientId),
    ClientRankings,
    Employees,
    SearchDevelopers(Vec<String>),
    Skills,
    AssignDeveloper(EmployeeId),
}

impl GatewayCall {
    pub fn op(&self) -> GatewayOp {
        match self {
            Self::CompletedProjects(_) => GatewayOp::CompletedProjects,
            Self::EvaluationItems => GatewayOp::EvaluationItems,
            Self::SubmitEvaluation(_) => GatewayOp::SubmitEvaluation,
            Self::ClientGrade(_) => GatewayOp::ClientGrade,
            Self::ClientRankings => GatewayOp::ClientRankings,
            Self::Employees => GatewayOp::Employees,
            Self::SearchDevelopers(_) => GatewayOp::SearchDevelopers,
            Self::Skills => GatewayOp::Skills,
            Self::AssignDeveloper(_) => GatewayOp::AssignDeveloper,
        }
    }

    fn endpoint(&self) -> String {
        match self {
            Self::CompletedProjects(id) => {
                format!("GET /api/client-evaluations/projects?employee_id={id}")
            }
            Self::EvaluationItems => "GET /api/client-evaluations/items".into(),
            Self::SubmitEvaluation(_) => "POST /api/client-evaluations".into(),
            Self::ClientGrade(id) => format!("GET /api/clients/{id}/grade"),
            Self::ClientRankings => "GET /api/client-evaluations/ranking".into(),
            Self::Employees => "GET /api/employees".into(),
            Self::SearchDevelopers(_) => "GET /api/developers/search".into(),
            Self::Skills => "GET /api/skill".into(),
            Self::AssignDeveloper(id) => format!("PATCH /api/developers/{id}/assign"),
        }
    }
}

#[derive(Default)]
struct MemoryState {
    projects: HashMap<EmployeeId, Vec<ProjectWithClientEvalStatus>>,
    items: Vec<EvaluationItem>,
    grades: HashMap<ClientId, ClientGrade>,
    rankings: Vec<ClientRanking>,
    employees: Vec<Employee>,
    skills: Vec<Skill>,
    submissions: Vec<EvaluationSubmitPayload>,
    calls: Vec<GatewayCall>,
    failures: HashMap<GatewayOp, GatewayError>,
}

/// Server stand-in holding everything in memory.
///
/// Mutations behave the way the API does (submission completes the project,
/// assignment sets the flag), so controllers can run their normal
/// refetch-after-mutation path against it.
#[derive(Default)]
pub struct InMemoryGateway {
    inner: Mutex<MemoryState>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projects(
        mut self,
        employee_id: EmployeeId,
        projects: Vec<ProjectWithClientEvalStatus>,
    ) -> Self {
        self.inner.get_mut().projects.insert(employee_id, projects);
        self
    }

    pub fn with_items(mut self, items: Vec<EvaluationItem>) -> Self {
        self.inner.get_mut().items = items;
        self
    }

    pub fn with_grade(mut self, client_id: ClientId, grade: ClientGrade) -> Self {
        self.inner.get_mut().grades.insert(client_id, grade);
        self
    }

    pub fn with_rankings(mut self, rankings: Vec<ClientRanking>) -> Self {
        self.inner.get_mut().rankings = rankings;
        self
    }

    pub fn with_employees(mut self, employees: Vec<Employee>) -> Self {
        self.inner.get_mut().employees = employees;
        self
    }

    pub fn with_skills(mut self, skills: Vec<Skill>) -> Self {
        self.inner.get_mut().skills = skills;
        self
    }

    /// Make the next call of `op` fail with `error`.
    pub async fn fail_next(&self, op: GatewayOp, error: GatewayError) {
        self.inner.lock().await.failures.insert(op, error);
    }

    pub async fn calls(&self) -> Vec<GatewayCall> {
        self.inner.lock().await.calls.clone()
    }

    pub async fn call_count(&self, op: GatewayOp) -> usize {
        self.inner
            .lock()
            .await
            .calls
            .iter()
            .filter(|call| call.op() == op)
            .count()
    }

    pub async fn submissions(&self) -> Vec<EvaluationSubmitPayload> {
        self.inner.lock().await.submissions.clone()
    }

    async fn record(&self, call: GatewayCall) -> GatewayResult<MutexGuard<'_, MemoryState>> {
        let mut state = self.inner.lock().await;
        let op = call.op();
        let endpoint = call.endpoint();
        state.calls.push(call);
        if let Some(err) = state.failures.remove(&op) {
            info!(%endpoint, "memory gateway: injected failure");
            return Err(err);
        }
        Ok(state)
    }

    /// Sample data used by the CLI when no backend is reachable.
    pub fn demo(employee_id: EmployeeId) -> Self {
        use AssignmentStatus::{Assigned, Available};
        use EvalStatus::{Completed, Pending};

        let hanbit = (501, "한빛물산");
        let daesung = (502, "대성금융");
        let saebom = (503, "새봄로지스");

        let project = |id: i64, name: &str, end: &str, client: (i64, &str), status| {
            ProjectWithClientEvalStatus {
                project_id: ProjectId(id),
                project_name: name.to_string(),
                end_date: end.to_string(),
                client_id: ClientId(client.0),
                client_name: client.1.to_string(),
                eval_status: status,
            }
        };
        let item = |code: i64, name: &str| EvaluationItem {
            client_item_code: ItemCode(code),
            item_name: name.to_string(),
        };
        let employee = |id: i64, name: &str, level: &str, status, skills: &[&str]| Employee {
            employee_id: EmployeeId(id),
            employee_name: name.to_string(),
            job_type: "개발".to_string(),
            skill_level: level.to_string(),
            project_assignment_yn: status,
            skills: skills.iter().map(|s| s.to_string()).collect(),
        };
        let ranking = |client: (i64, &str), average_score, grade: &str, rank| ClientRanking {
            client_id: ClientId(client.0),
            client_name: client.1.to_string(),
            average_score,
            grade: Grade::new(grade),
            rank,
        };
        let skill_names = ["React", "TypeScript", "Java", "Spring", "Python", "Rust"];

        Self::new()
            .with_projects(
                employee_id,
                vec![
                    project(1, "차세대 ERP 구축", "2024-03-31", hanbit, Completed),
                    project(3, "모바일 뱅킹 고도화", "2024-06-30", daesung, Pending),
                    project(5, "물류 통합 플랫폼", "2024-09-15", saebom, Pending),
                ],
            )
            .with_items(vec![
                item(101, "요구사항 명확성"),
                item(102, "의사소통 원활성"),
                item(103, "일정 준수 협조도"),
                item(104, "대금 지급 성실도"),
            ])
            .with_grade(
                ClientId(501),
                ClientGrade {
                    client_id: None,
                    client_name: None,
                    average_score: 87.25,
                    grade: Grade::new("A"),
                    priority: 1,
                },
            )
            .with_rankings(vec![
                ranking(hanbit, 87.25, "A", 1),
                ranking(daesung, 72.0, "B", 2),
            ])
            .with_employees(vec![
                employee(10001, "김철수", "고급", Assigned, &["Java", "Spring"]),
                employee(10002, "이영희", "중급", Available, &["React", "TypeScript"]),
                employee(10003, "박민수", "초급", Available, &["Python"]),
                employee(10004, "정수진", "특급", Assigned, &["React", "Rust"]),
            ])
            .with_skills(
                skill_names
                    .iter()
                    .enumerate()
                    .map(|(idx, name)| Skill {
                        skill_id: SkillId(idx as i64 + 1),
                        skill_name: name.to_string(),
                    })
                    .collect(),
            )
    }
}

#[async_trait]
impl DataGateway for InMemoryGateway {
    async fn completed_projects(
        &self,
        employee_id: EmployeeId,
    ) -> GatewayResult<Vec<ProjectWithClientEvalStatus>> {
        let state = self.record(GatewayCall::CompletedProjects(employee_id)).await?;
        let projects = state.projects.get(&employee_id).cloned();
        Ok(projects.unwrap_or_default())
    }

    async fn evaluation_items(&self) -> GatewayResult<Vec<EvaluationItem>> {
        let state = self.record(GatewayCall::EvaluationItems).await?;
        Ok(state.items.clone())
    }

    async fn submit_evaluation(&self, payload: &EvaluationSubmitPayload) -> GatewayResult<()> {
        let call = GatewayCall::SubmitEvaluation(payload.clone());
        let endpoint = call.endpoint();
        let mut state = self.record(call).await?;

        let project = state
            .projects
            .get_mut(&payload.evaluator_employee_id)
            .and_then(|projects| {
                projects
                    .iter_mut()
                    .find(|project| project.project_id == payload.project_id)
            })
            .ok_or_else(|| {
                GatewayError::status(
                    &endpoint,
                    404,
                    format!("project {} not found", payload.project_id),
                )
            })?;
        if project.client_id != payload.client_id {
            return Err(GatewayError::status(
                &endpoint,
                400,
                format!(
                    "client {} does not own project {}",
                    payload.client_id, payload.project_id
                ),
            ));
        }
        project.eval_status = EvalStatus::Completed;
        state.submissions.push(payload.clone());
        Ok(())
    }

    async fn client_grade(&self, client_id: ClientId) -> GatewayResult<ClientGrade> {
        let call = GatewayCall::ClientGrade(client_id);
        let endpoint = call.endpoint();
        let state = self.record(call).await?;
        state.grades.get(&client_id).cloned().ok_or_else(|| {
            GatewayError::status(endpoint, 404, format!("no grade for client {client_id}"))
        })
    }

    async fn client_rankings(&self) -> GatewayResult<Vec<ClientRanking>> {
        let state = self.record(GatewayCall::ClientRankings).await?;
        Ok(state.rankings.clone())
    }

    async fn employees(&self) -> GatewayResult<Vec<StaffMember>> {
        let state = self.record(GatewayCall::Employees).await?;
        Ok(state
            .employees
            .iter()
            .cloned()
            .map(StaffMember::from)
            .collect())
    }

    async fn search_developers(&self, skill_names: &[String]) -> GatewayResult<Vec<StaffMember>> {
        if skill_names.is_empty() {
            return Ok(Vec::new());
        }

        let state = self
            .record(GatewayCall::SearchDevelopers(skill_names.to_vec()))
            .await?;
        let wanted: BTreeSet<&str> = skill_names.iter().map(String::as_str).collect();
        Ok(state
            .employees
            .iter()
            .filter_map(|employee| {
                let matched_skills: Vec<String> = employee
                    .skills
                    .iter()
                    .filter(|skill| wanted.contains(skill.as_str()))
                    .cloned()
                    .collect();
                (!matched_skills.is_empty()).then(|| {
                    StaffMember::from(Developer {
                        employee_id: employee.employee_id,
                        name: employee.employee_name.clone(),
                        skill_level: employee.skill_level.clone(),
                        project_assignment_yn: employee.project_assignment_yn,
                        matched_skills,
                    })
                })
            })
            .collect())
    }

    async fn skills(&self) -> GatewayResult<Vec<Skill>> {
        let state = self.record(GatewayCall::Skills).await?;
        Ok(state.skills.clone())
    }

    async fn assign_developer(&self, employee_id: EmployeeId) -> GatewayResult<()> {
        let call = GatewayCall::AssignDeveloper(employee_id);
        let endpoint = call.endpoint();
        let mut state = self.record(call).await?;
        let employee = state
            .employees
            .iter_mut()
            .find(|employee| employee.employee_id == employee_id)
            .ok_or_else(|| {
                GatewayError::status(&endpoint, 404, format!("employee {employee_id} not found"))
            })?;
        if employee.project_assignment_yn.is_assigned() {
            return Err(GatewayError::status(
                &endpoint,
                409,
                format!("employee {employee_id} is already assigned"),
            ));
        }
        employee.project_assignment_yn = AssignmentStatus::Assigned;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/memory_gateway_tests.rs"]
mod tests;
