use std::{collections::BTreeMap, sync::Arc};

use shared::{
    domain::{ItemCode, ProjectId},
    error::ScoreOutOfRange,
    protocol::{EvaluationItem, EvaluationSubmitPayload, ScoreEntry, MAX_SCORE},
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    cache::QueryKey,
    error::GatewayError,
    navigation::{EvaluationContext, Route},
    ClientContext,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPhase {
    LoadingItems,
    LoadFailed(String),
    Ready,
    Submitting,
    Succeeded,
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("no project/client context for project {0}; open the form from the evaluation list")]
    MissingContext(ProjectId),
    #[error("form is not ready for input (phase: {0:?})")]
    NotReady(FormPhase),
    #[error("item {0} is not part of the evaluation catalog")]
    UnknownItem(ItemCode),
    #[error("the evaluation catalog is empty")]
    EmptyCatalog,
    #[error("scores missing for items {missing:?}")]
    IncompleteScores { missing: Vec<ItemCode> },
    #[error(transparent)]
    Score(#[from] ScoreOutOfRange),
    #[error("failed to load evaluation items: {0}")]
    Load(GatewayError),
    #[error("failed to submit evaluation: {0}")]
    Submit(GatewayError),
}

/// Keystroke filter: only ASCII digits survive.
pub fn sanitize_score_input(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Field-blur rule: empty stays empty, anything above the maximum becomes
/// the maximum, everything else is written in canonical form.
pub fn clamp_committed_score(buffer: &str) -> String {
    let digits = sanitize_score_input(buffer);
    if digits.is_empty() {
        return String::new();
    }
    match digits.parse::<u32>() {
        Ok(value) if value <= MAX_SCORE => value.to_string(),
        // Too many digits to fit is still "above the maximum".
        _ => MAX_SCORE.to_string(),
    }
}

/// Score entry for one project: `LoadingItems -> Ready -> Submitting ->
/// Succeeded`, falling back to `Ready` with every buffer intact when the
/// submission is rejected.
pub struct EvaluationFormController {
    ctx: ClientContext,
    context: EvaluationContext,
    items: Arc<Vec<EvaluationItem>>,
    scores: BTreeMap<ItemCode, String>,
    phase: FormPhase,
}

impl EvaluationFormController {
    /// Opens the form for `project_id`. The context normally comes from the
    /// list; a bare route without one (or for another project) is refused.
    pub async fn open(
        ctx: ClientContext,
        project_id: ProjectId,
        context: Option<EvaluationContext>,
    ) -> Result<Self, FormError> {
        let context = context
            .filter(|context| context.project_id == project_id)
            .ok_or(FormError::MissingContext(project_id))?;

        let mut form = Self {
            ctx,
            context,
            items: Arc::new(Vec::new()),
            scores: BTreeMap::new(),
            phase: FormPhase::LoadingItems,
        };
        form.reload().await;
        Ok(form)
    }

    /// (Re)loads the item catalog and resets every buffer to empty.
    pub async fn reload(&mut self) -> &FormPhase {
        self.phase = FormPhase::LoadingItems;
        let gateway = Arc::clone(&self.ctx.gateway);
        let loaded = self
            .ctx
            .cache
            .get_or_fetch(QueryKey::EvaluationItems, || async move {
                gateway.evaluation_items().await
            })
            .await;

        match loaded {
            Ok(items) => {
                self.scores = items
                    .iter()
                    .map(|item| (item.client_item_code, String::new()))
                    .collect();
                self.items = items;
                self.phase = FormPhase::Ready;
            }
            Err(err) => {
                warn!(
                    project_id = self.context.project_id.0,
                    error = %err,
                    "evaluation form: item load failed"
                );
                self.ctx
                    .notifier
                    .error("평가 항목을 불러오지 못했습니다.", err.user_message());
                self.phase = FormPhase::LoadFailed(err.user_message());
            }
        }
        &self.phase
    }

    pub fn phase(&self) -> &FormPhase {
        &self.phase
    }

    pub fn context(&self) -> &EvaluationContext {
        &self.context
    }

    pub fn items(&self) -> &[EvaluationItem] {
        &self.items
    }

    pub fn score(&self, item: ItemCode) -> Option<&str> {
        self.scores.get(&item).map(String::as_str)
    }

    fn buffer_mut(&mut self, item: ItemCode) -> Result<&mut String, FormError> {
        if self.phase != FormPhase::Ready {
            return Err(FormError::NotReady(self.phase.clone()));
        }
        self.scores
            .get_mut(&item)
            .ok_or(FormError::UnknownItem(item))
    }

    /// Keystroke into the field for `item`.
    pub fn edit(&mut self, item: ItemCode, raw: &str) -> Result<&str, FormError> {
        let buffer = self.buffer_mut(item)?;
        *buffer = sanitize_score_input(raw);
        Ok(buffer.as_str())
    }

    /// Field for `item` lost focus.
    pub fn commit(&mut self, item: ItemCode) -> Result<&str, FormError> {
        let buffer = self.buffer_mut(item)?;
        *buffer = clamp_committed_score(buffer);
        Ok(buffer.as_str())
    }

    /// `edit` followed by `commit`.
    pub fn enter(&mut self, item: ItemCode, raw: &str) -> Result<&str, FormError> {
        self.edit(item, raw)?;
        self.commit(item)
    }

    /// Items whose buffer is still empty, in catalog order.
    pub fn missing_items(&self) -> Vec<ItemCode> {
        self.items
            .iter()
            .map(|item| item.client_item_code)
            .filter(|code| self.scores.get(code).map_or(true, String::is_empty))
            .collect()
    }

    pub fn build_payload(&self) -> Result<EvaluationSubmitPayload, FormError> {
        if self.items.is_empty() {
            return Err(FormError::EmptyCatalog);
        }
        let missing = self.missing_items();
        if !missing.is_empty() {
            return Err(FormError::IncompleteScores { missing });
        }

        let scores = self
            .items
            .iter()
            .map(|item| {
                let code = item.client_item_code;
                let committed = clamp_committed_score(self.score(code).unwrap_or_default());
                let value = committed.parse::<u32>().unwrap_or(MAX_SCORE);
                ScoreEntry::new(code, value)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(EvaluationSubmitPayload {
            evaluator_employee_id: self.ctx.employee_id,
            project_id: self.context.project_id,
            client_id: self.context.client_id,
            scores,
        })
    }

    /// Submits the scores. On success the employee's project list is
    /// invalidated and refetched so the list shows the server's status, and
    /// the route to return to is handed back.
    pub async fn submit(&mut self) -> Result<Route, FormError> {
        if self.phase != FormPhase::Ready {
            return Err(FormError::NotReady(self.phase.clone()));
        }

        let payload = match self.build_payload() {
            Ok(payload) => payload,
            Err(err) => {
                if matches!(err, FormError::IncompleteScores { .. } | FormError::EmptyCatalog) {
                    self.ctx
                        .notifier
                        .warning("모든 평가 항목의 점수를 입력해주세요.");
                }
                return Err(err);
            }
        };

        self.phase = FormPhase::Submitting;
        match self.ctx.gateway.submit_evaluation(&payload).await {
            Ok(()) => {
                info!(
                    project_id = payload.project_id.0,
                    client_id = payload.client_id.0,
                    evaluator = payload.evaluator_employee_id.0,
                    "evaluation form: submitted"
                );
                self.refetch_projects().await;
                self.ctx.notifier.success(
                    "평가가 성공적으로 제출되었습니다.",
                    format!(
                        "{} ({})",
                        self.context.project_name, self.context.client_name
                    ),
                );
                self.phase = FormPhase::Succeeded;
                Ok(Route::EvaluationList)
            }
            Err(err) => {
                warn!(
                    project_id = payload.project_id.0,
                    error = %err,
                    "evaluation form: submit failed"
                );
                self.ctx
                    .notifier
                    .error("제출 중 오류가 발생했습니다.", err.user_message());
                self.phase = FormPhase::Ready;
                Err(FormError::Submit(err))
            }
        }
    }

    async fn refetch_projects(&self) {
        let key = QueryKey::CompletedProjects(self.ctx.employee_id);
        self.ctx.cache.invalidate(&key).await;

        let gateway = Arc::clone(&self.ctx.gateway);
        let employee_id = self.ctx.employee_id;
        let refreshed = self
            .ctx
            .cache
            .get_or_fetch(key, || async move {
                gateway.completed_projects(employee_id).await
            })
            .await;
        if let Err(err) = refreshed {
            // The list retries on its next load.
            warn!(
                employee_id = employee_id.0,
                error = %err,
                "evaluation form: project refetch failed"
            );
        }
    }

    /// Leaves the form, discarding whatever was typed.
    pub fn cancel(self) -> Route {
        info!(
            project_id = self.context.project_id.0,
            "evaluation form: cancelled"
        );
        Route::EvaluationList
    }
}

#[cfg(test)]
#[path = "../tests/form_tests.rs"]
mod tests;
