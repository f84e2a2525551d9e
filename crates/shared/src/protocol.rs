use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        AssignmentStatus, ClientId, EmployeeId, EvalStatus, Grade, ItemCode, ProjectId, SkillId,
    },
    error::ScoreOutOfRange,
};

pub const MAX_SCORE: u32 = 100;

/// A finished project the employee took part in, with its client-evaluation status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectWithClientEvalStatus {
    pub project_id: ProjectId,
    pub project_name: String,
    pub end_date: String,
    pub client_id: ClientId,
    pub client_name: String,
    pub eval_status: EvalStatus,
}

impl ProjectWithClientEvalStatus {
    /// `YYYY-MM-DD` for anything that parses as a date or timestamp, the raw
    /// value otherwise.
    pub fn end_date_display(&self) -> String {
        parse_end_date(&self.end_date)
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| self.end_date.clone())
    }
}

fn parse_end_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationItem {
    pub client_item_code: ItemCode,
    pub item_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub client_item_code: ItemCode,
    pub score: u8,
}

impl ScoreEntry {
    pub fn new(client_item_code: ItemCode, score: u32) -> Result<Self, ScoreOutOfRange> {
        if score > MAX_SCORE {
            return Err(ScoreOutOfRange(score));
        }
        Ok(Self {
            client_item_code,
            score: score as u8,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationSubmitPayload {
    pub evaluator_employee_id: EmployeeId,
    pub project_id: ProjectId,
    pub client_id: ClientId,
    pub scores: Vec<ScoreEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientGrade {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    pub average_score: f64,
    pub grade: Grade,
    pub priority: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRanking {
    pub client_id: ClientId,
    pub client_name: String,
    pub average_score: f64,
    pub grade: Grade,
    pub rank: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub skill_id: SkillId,
    pub skill_name: String,
}

/// Row of the full employee roster (`GET /api/employees`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    #[serde(default)]
    pub job_type: String,
    pub skill_level: String,
    pub project_assignment_yn: AssignmentStatus,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Row of a skill search (`GET /api/developers/search`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Developer {
    pub employee_id: EmployeeId,
    pub name: String,
    pub skill_level: String,
    pub project_assignment_yn: AssignmentStatus,
    #[serde(default)]
    pub matched_skills: Vec<String>,
}

/// A staffing roster row, tagged by the endpoint it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StaffMember {
    Employee(Employee),
    Developer(Developer),
}

impl StaffMember {
    pub fn employee_id(&self) -> EmployeeId {
        match self {
            Self::Employee(e) => e.employee_id,
            Self::Developer(d) => d.employee_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Employee(e) => &e.employee_name,
            Self::Developer(d) => &d.name,
        }
    }

    pub fn skill_level(&self) -> &str {
        match self {
            Self::Employee(e) => &e.skill_level,
            Self::Developer(d) => &d.skill_level,
        }
    }

    pub fn assignment(&self) -> AssignmentStatus {
        match self {
            Self::Employee(e) => e.project_assignment_yn,
            Self::Developer(d) => d.project_assignment_yn,
        }
    }

    /// Full skill list for roster rows, matched skills for search rows.
    pub fn skills(&self) -> &[String] {
        match self {
            Self::Employee(e) => &e.skills,
            Self::Developer(d) => &d.matched_skills,
        }
    }

    pub fn job_type(&self) -> Option<&str> {
        match self {
            Self::Employee(e) => Some(&e.job_type),
            Self::Developer(_) => None,
        }
    }
}

impl From<Employee> for StaffMember {
    fn from(value: Employee) -> Self {
        Self::Employee(value)
    }
}

impl From<Developer> for StaffMember {
    fn from(value: Developer) -> Self {
        Self::Developer(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(end_date: &str) -> ProjectWithClientEvalStatus {
        ProjectWithClientEvalStatus {
            project_id: ProjectId(1),
            project_name: "ERP".into(),
            end_date: end_date.into(),
            client_id: ClientId(2),
            client_name: "ACME".into(),
            eval_status: EvalStatus::Pending,
        }
    }

    #[test]
    fn end_date_display_normalizes_dates_and_timestamps() {
        assert_eq!(project("2024-03-31").end_date_display(), "2024-03-31");
        assert_eq!(
            project("2024-03-31T00:00:00+09:00").end_date_display(),
            "2024-03-31"
        );
        assert_eq!(
            project("2024-03-31T12:30:00.000").end_date_display(),
            "2024-03-31"
        );
        assert_eq!(project("unknown").end_date_display(), "unknown");
    }

    #[test]
    fn project_status_decodes_korean_labels() {
        let raw = r#"{"project_id":5,"project_name":"ERP","end_date":"2024-01-02",
            "client_id":9,"client_name":"ACME","eval_status":"미완료"}"#;
        let parsed: ProjectWithClientEvalStatus = serde_json::from_str(raw).expect("decode");
        assert_eq!(parsed.eval_status, EvalStatus::Pending);
        assert_eq!(parsed.project_id, ProjectId(5));

        let encoded = serde_json::to_value(EvalStatus::Completed).expect("encode");
        assert_eq!(encoded, serde_json::json!("완료"));
    }

    #[test]
    fn grade_accepts_numbers_and_text() {
        let numeric: ClientGrade =
            serde_json::from_str(r#"{"average_score":81.5,"grade":2,"priority":1}"#)
                .expect("numeric grade");
        assert_eq!(numeric.grade.as_str(), "2");

        let fractional: ClientGrade =
            serde_json::from_str(r#"{"average_score":81.5,"grade":2.5,"priority":1}"#)
                .expect("fractional grade");
        assert_eq!(fractional.grade.as_str(), "2.5");

        let textual: ClientGrade =
            serde_json::from_str(r#"{"average_score":81.5,"grade":" A ","priority":1}"#)
                .expect("text grade");
        assert_eq!(textual.grade.as_str(), "A");
        assert_eq!(
            serde_json::to_value(&textual.grade).expect("encode"),
            serde_json::json!("A")
        );
    }

    #[test]
    fn ids_honor_width_and_alignment() {
        assert_eq!(format!("{:>6}", ProjectId(1)), "     1");
        assert_eq!(format!("{:<6}|", EmployeeId(42)), "42    |");
        assert_eq!(format!("{:06}", ClientId(501)), "000501");
        assert_eq!(ItemCode(101).to_string(), "101");
    }

    #[test]
    fn assignment_flag_rejects_values_other_than_zero_and_one() {
        let raw = r#"{"employee_id":1,"name":"Kim","skill_level":"senior",
            "project_assignment_yn":2,"matched_skills":[]}"#;
        assert!(serde_json::from_str::<Developer>(raw).is_err());

        let raw = raw.replace(":2,", ":1,");
        let dev: Developer = serde_json::from_str(&raw).expect("decode");
        assert_eq!(dev.project_assignment_yn, AssignmentStatus::Assigned);
    }

    #[test]
    fn submit_payload_uses_api_field_names() {
        let payload = EvaluationSubmitPayload {
            evaluator_employee_id: EmployeeId(10002),
            project_id: ProjectId(5),
            client_id: ClientId(7),
            scores: vec![ScoreEntry::new(ItemCode(101), 80).expect("score")],
        };
        let value = serde_json::to_value(&payload).expect("encode");
        assert_eq!(
            value,
            serde_json::json!({
                "evaluator_employee_id": 10002,
                "project_id": 5,
                "client_id": 7,
                "scores": [{"client_item_code": 101, "score": 80}]
            })
        );
        assert_eq!(ScoreEntry::new(ItemCode(1), 101), Err(ScoreOutOfRange(101)));
    }

    #[test]
    fn staff_member_accessors_cover_both_shapes() {
        let employee = StaffMember::from(Employee {
            employee_id: EmployeeId(1),
            employee_name: "Lee".into(),
            job_type: "backend".into(),
            skill_level: "mid".into(),
            project_assignment_yn: AssignmentStatus::Available,
            skills: vec!["Rust".into()],
        });
        let developer = StaffMember::from(Developer {
            employee_id: EmployeeId(2),
            name: "Park".into(),
            skill_level: "senior".into(),
            project_assignment_yn: AssignmentStatus::Assigned,
            matched_skills: vec!["React".into()],
        });

        assert_eq!(employee.name(), "Lee");
        assert_eq!(employee.skills(), ["Rust".to_string()]);
        assert_eq!(employee.job_type(), Some("backend"));
        assert_eq!(developer.name(), "Park");
        assert_eq!(developer.skills(), ["React".to_string()]);
        assert!(developer.assignment().is_assigned());
        assert_eq!(developer.job_type(), None);
    }
}
