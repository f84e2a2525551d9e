//! Developer staffing page: skill and assignment filters over the roster,
//! plus the assign action.

use std::{collections::BTreeSet, str::FromStr, sync::Arc};

use futures::future::try_join;
use shared::{
    domain::{AssignmentStatus, EmployeeId},
    protocol::{Skill, StaffMember},
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    cache::QueryKey,
    error::{GatewayError, GatewayResult},
    ClientContext,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssignmentFilter {
    #[default]
    All,
    Available,
    Assigned,
}

impl AssignmentFilter {
    pub fn matches(self, status: AssignmentStatus) -> bool {
        match self {
            Self::All => true,
            Self::Available => status == AssignmentStatus::Available,
            Self::Assigned => status == AssignmentStatus::Assigned,
        }
    }
}

impl FromStr for AssignmentFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "0" | "available" => Ok(Self::Available),
            "1" | "assigned" => Ok(Self::Assigned),
            other => Err(format!(
                "unknown assignment filter '{other}' (expected all, available or assigned)"
            )),
        }
    }
}

/// Selected skill names; empty means "all skills".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillFilter(BTreeSet<String>);

impl SkillFilter {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// Adds the skill, or removes it when it was already selected.
    pub fn toggle(&mut self, name: &str) {
        if !self.0.remove(name) {
            self.0.insert(name.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Sorted names, as sent to the search endpoint.
    pub fn names(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }

    pub fn matches(&self, member: &StaffMember) -> bool {
        self.is_empty() || member.skills().iter().any(|skill| self.0.contains(skill))
    }

    pub fn label(&self) -> String {
        let mut names = self.0.iter();
        match (names.next(), self.0.len()) {
            (None, _) => "전체 보기".to_string(),
            (Some(first), 1) => first.clone(),
            (Some(first), n) => format!("{first} 외 {}개", n - 1),
        }
    }
}

/// Skill filter first, then the assignment filter.
pub fn filter_roster(
    roster: &[StaffMember],
    skills: &SkillFilter,
    assignment: AssignmentFilter,
) -> Vec<StaffMember> {
    roster
        .iter()
        .filter(|member| skills.matches(member))
        .filter(|member| assignment.matches(member.assignment()))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterView {
    /// Nothing to show and no skill picked yet.
    NoSkillSelected,
    NoMatches,
    Rows(Vec<StaffMember>),
}

#[derive(Debug, Error)]
pub enum StaffingError {
    #[error("employee {0} is already assigned to a project")]
    AlreadyAssigned(EmployeeId),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

pub struct StaffingController {
    ctx: ClientContext,
    skill_filter: SkillFilter,
    assignment_filter: AssignmentFilter,
    skills: Arc<Vec<Skill>>,
    roster: Arc<Vec<StaffMember>>,
}

impl StaffingController {
    pub fn new(ctx: ClientContext) -> Self {
        Self {
            ctx,
            skill_filter: SkillFilter::default(),
            assignment_filter: AssignmentFilter::All,
            skills: Arc::new(Vec::new()),
            roster: Arc::new(Vec::new()),
        }
    }

    pub fn skill_filter(&self) -> &SkillFilter {
        &self.skill_filter
    }

    pub fn assignment_filter(&self) -> AssignmentFilter {
        self.assignment_filter
    }

    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    pub fn roster(&self) -> &[StaffMember] {
        &self.roster
    }

    /// Changes the skill selection; call `load` to fetch the matching roster.
    pub fn toggle_skill(&mut self, name: &str) {
        self.skill_filter.toggle(name);
    }

    pub fn clear_skills(&mut self) {
        self.skill_filter.clear();
    }

    pub fn set_skills(&mut self, filter: SkillFilter) {
        self.skill_filter = filter;
    }

    pub fn set_assignment_filter(&mut self, filter: AssignmentFilter) {
        self.assignment_filter = filter;
    }

    fn roster_key(&self) -> QueryKey {
        if self.skill_filter.is_empty() {
            QueryKey::Employees
        } else {
            QueryKey::DeveloperSearch(self.skill_filter.names())
        }
    }

    async fn fetch_roster(&self) -> GatewayResult<Arc<Vec<StaffMember>>> {
        let gateway = Arc::clone(&self.ctx.gateway);
        let names = self.skill_filter.names();
        self.ctx
            .cache
            .get_or_fetch(self.roster_key(), || async move {
                if names.is_empty() {
                    gateway.employees().await
                } else {
                    gateway.search_developers(&names).await
                }
            })
            .await
    }

    async fn fetch_skills(&self) -> GatewayResult<Arc<Vec<Skill>>> {
        let gateway = Arc::clone(&self.ctx.gateway);
        self.ctx
            .cache
            .get_or_fetch(QueryKey::Skills, || async move { gateway.skills().await })
            .await
    }

    /// Loads the skill catalog and the roster for the current skill filter:
    /// the full employee list with no skill selected, a skill search
    /// otherwise.
    pub async fn load(&mut self) -> GatewayResult<()> {
        let (skills, roster) = try_join(self.fetch_skills(), self.fetch_roster())
            .await
            .inspect_err(|err| {
                warn!(error = %err, "staffing: load failed");
                self.ctx
                    .notifier
                    .error("데이터 로드 에러", err.user_message());
            })?;
        info!(
            skills = skills.len(),
            roster = roster.len(),
            filter = %self.skill_filter.label(),
            "staffing: loaded"
        );
        self.skills = skills;
        self.roster = roster;
        Ok(())
    }

    pub fn visible(&self) -> Vec<StaffMember> {
        filter_roster(&self.roster, &self.skill_filter, self.assignment_filter)
    }

    pub fn view(&self) -> RosterView {
        let rows = self.visible();
        if !rows.is_empty() {
            RosterView::Rows(rows)
        } else if self.skill_filter.is_empty() {
            RosterView::NoSkillSelected
        } else {
            RosterView::NoMatches
        }
    }

    /// Assigns the employee to a project.
    ///
    /// `known` is the flag as currently displayed; an assigned employee is
    /// refused here without contacting the server. The row is not changed
    /// until the roster is refetched after the server accepts the change.
    pub async fn assign(
        &mut self,
        employee_id: EmployeeId,
        known: AssignmentStatus,
    ) -> Result<(), StaffingError> {
        if known.is_assigned() {
            warn!(
                employee_id = employee_id.0,
                "staffing: assign refused, already assigned"
            );
            self.ctx
                .notifier
                .error("투입 불가", "이미 참여 중인 인력입니다.");
            return Err(StaffingError::AlreadyAssigned(employee_id));
        }

        let name = self
            .roster
            .iter()
            .find(|member| member.employee_id() == employee_id)
            .map(|member| member.name().to_string())
            .unwrap_or_else(|| employee_id.to_string());

        if let Err(err) = self.ctx.gateway.assign_developer(employee_id).await {
            warn!(employee_id = employee_id.0, error = %err, "staffing: assign failed");
            self.ctx.notifier.error("투입 실패", err.user_message());
            return Err(err.into());
        }

        self.ctx.cache.invalidate_where(QueryKey::is_roster).await;
        match self.fetch_roster().await {
            Ok(roster) => self.roster = roster,
            Err(err) => {
                warn!(employee_id = employee_id.0, error = %err, "staffing: roster refetch failed");
                self.ctx
                    .notifier
                    .error("목록을 갱신하지 못했습니다.", err.user_message());
            }
        }
        self.ctx.notifier.success(
            "투입 완료",
            format!("{name}님이 프로젝트에 배정되었습니다."),
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/staffing_tests.rs"]
mod tests;
