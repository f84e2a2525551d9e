//! Page routes and the state carried between them.

use std::fmt;

use serde::{Deserialize, Serialize};
use shared::domain::{ClientId, ProjectId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Landing,
    Dashboard,
    EvaluationList,
    EvaluationForm { project_id: ProjectId },
    EmployeeSearch,
    Staffing,
    ClientRanking,
    NotFound(String),
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let trimmed = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Self::Landing,
            ["dashboard"] => Self::Dashboard,
            ["evaluation"] => Self::EvaluationList,
            ["evaluation", id] => match id.parse::<i64>() {
                Ok(id) => Self::EvaluationForm {
                    project_id: ProjectId(id),
                },
                Err(_) => Self::NotFound(path.to_string()),
            },
            ["employees"] => Self::EmployeeSearch,
            ["human-resource"] => Self::Staffing,
            ["client-ranking"] => Self::ClientRanking,
            _ => Self::NotFound(path.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Landing => "/".into(),
            Self::Dashboard => "/dashboard".into(),
            Self::EvaluationList => "/evaluation".into(),
            Self::EvaluationForm { project_id } => format!("/evaluation/{}", project_id.0),
            Self::EmployeeSearch => "/employees".into(),
            Self::Staffing => "/human-resource".into(),
            Self::ClientRanking => "/client-ranking".into(),
            Self::NotFound(path) => path.clone(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Landing => "사내 업무 시스템",
            Self::Dashboard => "대시보드",
            Self::EvaluationList => "종료된 프로젝트 목록",
            Self::EvaluationForm { .. } => "고객 평가 입력",
            Self::EmployeeSearch => "직원 검색",
            Self::Staffing => "개발자 목록",
            Self::ClientRanking => "고객사 순위",
            Self::NotFound(_) => "페이지를 찾을 수 없습니다",
        }
    }

    /// Top-level navigation entries, in menu order.
    pub fn menu() -> [Route; 5] {
        [
            Self::Dashboard,
            Self::EvaluationList,
            Self::EmployeeSearch,
            Self::Staffing,
            Self::ClientRanking,
        ]
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// What the list hands the evaluation form when navigating to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationContext {
    pub project_id: ProjectId,
    pub project_name: String,
    pub client_id: ClientId,
    pub client_name: String,
}

impl EvaluationContext {
    pub fn route(&self) -> Route {
        Route::EvaluationForm {
            project_id: self.project_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_page_route() {
        assert_eq!(Route::parse("/"), Route::Landing);
        assert_eq!(Route::parse(""), Route::Landing);
        assert_eq!(Route::parse("/dashboard"), Route::Dashboard);
        assert_eq!(Route::parse("/evaluation/"), Route::EvaluationList);
        assert_eq!(
            Route::parse("/evaluation/42?from=list"),
            Route::EvaluationForm {
                project_id: ProjectId(42)
            }
        );
        assert_eq!(Route::parse("/employees"), Route::EmployeeSearch);
        assert_eq!(Route::parse("/human-resource"), Route::Staffing);
        assert_eq!(Route::parse("/client-ranking"), Route::ClientRanking);
    }

    #[test]
    fn unknown_paths_fall_back_to_not_found() {
        assert_eq!(
            Route::parse("/evaluation/abc"),
            Route::NotFound("/evaluation/abc".into())
        );
        assert_eq!(Route::parse("/nope"), Route::NotFound("/nope".into()));
    }

    #[test]
    fn path_round_trips_through_parse() {
        for route in Route::menu() {
            assert_eq!(Route::parse(&route.path()), route);
        }
        let form = Route::EvaluationForm {
            project_id: ProjectId(7),
        };
        assert_eq!(Route::parse(&form.path()), form);
    }
}
