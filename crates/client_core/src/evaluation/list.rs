use std::sync::Arc;

use shared::{
    domain::{ClientId, EvalStatus, ProjectId},
    protocol::{ClientGrade, ProjectWithClientEvalStatus},
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    cache::QueryKey,
    error::{GatewayError, GatewayResult},
    navigation::EvaluationContext,
    ClientContext,
};

#[derive(Debug, Error)]
pub enum ListError {
    #[error("project {0} is not in the completed project list")]
    UnknownProject(ProjectId),
    #[error("project {0} has already been evaluated")]
    AlreadyEvaluated(ProjectId),
}

/// The one action a row offers, decided by its evaluation status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    Evaluate(EvaluationContext),
    LookupGrade {
        client_id: ClientId,
        client_name: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRow {
    pub project: ProjectWithClientEvalStatus,
    pub action: RowAction,
}

impl From<ProjectWithClientEvalStatus> for ProjectRow {
    fn from(project: ProjectWithClientEvalStatus) -> Self {
        let action = match project.eval_status {
            EvalStatus::Pending => RowAction::Evaluate(EvaluationContext {
                project_id: project.project_id,
                project_name: project.project_name.clone(),
                client_id: project.client_id,
                client_name: project.client_name.clone(),
            }),
            EvalStatus::Completed => RowAction::LookupGrade {
                client_id: project.client_id,
                client_name: project.client_name.clone(),
            },
        };
        Self { project, action }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListView {
    Loading,
    Failed(String),
    Loaded(Vec<ProjectRow>),
}

/// Grade overlay opened from a completed row.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeOverlay {
    pub client_name: String,
    pub grade: ClientGrade,
}

impl GradeOverlay {
    pub fn title(&self) -> String {
        format!("{} 고객 등급 정보", self.client_name)
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("평균 점수: {:.2}점", self.grade.average_score),
            format!("신용 등급: {} 등급", self.grade.grade),
            format!("프로젝트 우선순위: {} 순위", self.grade.priority),
        ]
    }
}

pub struct EvaluationListController {
    ctx: ClientContext,
    view: ListView,
}

impl EvaluationListController {
    pub fn new(ctx: ClientContext) -> Self {
        Self {
            ctx,
            view: ListView::Loading,
        }
    }

    pub fn view(&self) -> &ListView {
        &self.view
    }

    fn cache_key(&self) -> QueryKey {
        QueryKey::CompletedProjects(self.ctx.employee_id)
    }

    async fn fetch(&self) -> GatewayResult<Arc<Vec<ProjectWithClientEvalStatus>>> {
        let gateway = Arc::clone(&self.ctx.gateway);
        let employee_id = self.ctx.employee_id;
        self.ctx
            .cache
            .get_or_fetch(self.cache_key(), || async move {
                gateway.completed_projects(employee_id).await
            })
            .await
    }

    /// Loads (or re-reads from cache) the employee's finished projects.
    ///
    /// A failure replaces the table body only when nothing was loaded yet;
    /// otherwise the previous rows stay. Both cases emit an error notice.
    pub async fn load(&mut self) -> &ListView {
        match self.fetch().await {
            Ok(projects) => {
                info!(
                    employee_id = self.ctx.employee_id.0,
                    projects = projects.len(),
                    "evaluation list: loaded"
                );
                self.view = ListView::Loaded(
                    projects.iter().cloned().map(ProjectRow::from).collect(),
                );
            }
            Err(err) => {
                warn!(
                    employee_id = self.ctx.employee_id.0,
                    error = %err,
                    "evaluation list: load failed"
                );
                let message = err.user_message();
                let title = if matches!(self.view, ListView::Loaded(_)) {
                    "프로젝트 목록을 새로고침하지 못했습니다."
                } else {
                    self.view = ListView::Failed(message.clone());
                    "프로젝트 목록을 불러오지 못했습니다."
                };
                self.ctx.notifier.error(title, message);
            }
        }
        &self.view
    }

    pub async fn refresh(&mut self) -> &ListView {
        self.ctx.cache.invalidate(&self.cache_key()).await;
        self.load().await
    }

    pub fn rows(&self) -> &[ProjectRow] {
        match &self.view {
            ListView::Loaded(rows) => rows,
            _ => &[],
        }
    }

    /// Navigation state for the evaluation form of a pending project.
    pub fn evaluate(&self, project_id: ProjectId) -> Result<EvaluationContext, ListError> {
        let row = self
            .rows()
            .iter()
            .find(|row| row.project.project_id == project_id)
            .ok_or(ListError::UnknownProject(project_id))?;
        match &row.action {
            RowAction::Evaluate(context) => Ok(context.clone()),
            RowAction::LookupGrade { .. } => Err(ListError::AlreadyEvaluated(project_id)),
        }
    }

    /// Fetches the client's grade for the overlay. Failures only raise a
    /// notice; the list itself is left as it was.
    pub async fn lookup_grade(
        &self,
        client_id: ClientId,
        client_name: &str,
    ) -> Option<GradeOverlay> {
        match self.ctx.gateway.client_grade(client_id).await {
            Ok(mut grade) => {
                grade.client_id = Some(client_id);
                grade.client_name = Some(client_name.to_string());
                Some(GradeOverlay {
                    client_name: client_name.to_string(),
                    grade,
                })
            }
            Err(err) => {
                self.report_grade_failure(client_id, &err);
                None
            }
        }
    }

    fn report_grade_failure(&self, client_id: ClientId, err: &GatewayError) {
        warn!(client_id = client_id.0, error = %err, "evaluation list: grade lookup failed");
        self.ctx
            .notifier
            .error("등급 조회 중 오류가 발생했습니다.", err.user_message());
    }
}

#[cfg(test)]
#[path = "../tests/list_tests.rs"]
mod tests;
