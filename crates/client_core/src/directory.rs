//! Employee search and the dashboard summary, both read-only views over the
//! roster and the project list.

use std::sync::Arc;

use futures::future::try_join;
use serde::Serialize;
use shared::{
    domain::EvalStatus,
    protocol::{ProjectWithClientEvalStatus, StaffMember},
};
use tracing::warn;

use crate::{cache::QueryKey, error::GatewayResult, ClientContext};

/// Case-insensitive substring match on name, job type or skill level.
/// A blank term matches everyone.
pub fn search_employees<'a>(roster: &'a [StaffMember], term: &str) -> Vec<&'a StaffMember> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return roster.iter().collect();
    }
    roster
        .iter()
        .filter(|member| {
            member.name().to_lowercase().contains(&needle)
                || member.skill_level().to_lowercase().contains(&needle)
                || member
                    .job_type()
                    .is_some_and(|job| job.to_lowercase().contains(&needle))
        })
        .collect()
}

pub struct EmployeeSearchController {
    ctx: ClientContext,
    roster: Arc<Vec<StaffMember>>,
}

impl EmployeeSearchController {
    pub fn new(ctx: ClientContext) -> Self {
        Self {
            ctx,
            roster: Arc::new(Vec::new()),
        }
    }

    pub async fn load(&mut self) -> GatewayResult<()> {
        let gateway = Arc::clone(&self.ctx.gateway);
        let loaded = self
            .ctx
            .cache
            .get_or_fetch(QueryKey::Employees, || async move {
                gateway.employees().await
            })
            .await;
        match loaded {
            Ok(roster) => {
                self.roster = roster;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "employee search: load failed");
                self.ctx
                    .notifier
                    .error("전체 직원 목록 로드 실패", err.user_message());
                Err(err)
            }
        }
    }

    pub fn search(&self, term: &str) -> Vec<&StaffMember> {
        search_employees(&self.roster, term)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DashboardSummary {
    pub total_employees: usize,
    pub assigned_employees: usize,
    pub completed_evaluations: usize,
    pub pending_evaluations: usize,
}

impl DashboardSummary {
    pub fn from_parts(
        roster: &[StaffMember],
        projects: &[ProjectWithClientEvalStatus],
    ) -> Self {
        let completed_evaluations = projects
            .iter()
            .filter(|project| project.eval_status == EvalStatus::Completed)
            .count();
        Self {
            total_employees: roster.len(),
            assigned_employees: roster
                .iter()
                .filter(|member| member.assignment().is_assigned())
                .count(),
            completed_evaluations,
            pending_evaluations: projects.len() - completed_evaluations,
        }
    }
}

/// Headcount and the acting employee's evaluation progress.
pub async fn dashboard_summary(ctx: &ClientContext) -> GatewayResult<DashboardSummary> {
    let roster_gateway = Arc::clone(&ctx.gateway);
    let project_gateway = Arc::clone(&ctx.gateway);
    let employee_id = ctx.employee_id;

    let roster = ctx.cache.get_or_fetch(QueryKey::Employees, || async move {
        roster_gateway.employees().await
    });
    let projects = ctx
        .cache
        .get_or_fetch(QueryKey::CompletedProjects(employee_id), || async move {
            project_gateway.completed_projects(employee_id).await
        });

    let (roster, projects) = try_join(roster, projects).await?;
    Ok(DashboardSummary::from_parts(&roster, &projects))
}

#[cfg(test)]
#[path = "tests/directory_tests.rs"]
mod tests;
