use std::sync::Arc;

use shared::{
    domain::{
        AssignmentStatus, ClientId, EmployeeId, EvalStatus, Grade, ItemCode, ProjectId, SkillId,
    },
    protocol::{ClientGrade, Employee, EvaluationItem, ProjectWithClientEvalStatus, Skill},
};
use tokio::sync::broadcast;

use crate::{ClientContext, InMemoryGateway, Notice, Settings};

pub const EVALUATOR: EmployeeId = EmployeeId(10002);

pub fn project(id: i64, client: i64, status: EvalStatus) -> ProjectWithClientEvalStatus {
    ProjectWithClientEvalStatus {
        project_id: ProjectId(id),
        project_name: format!("project-{id}"),
        end_date: "2024-05-31".into(),
        client_id: ClientId(client),
        client_name: format!("client-{client}"),
        eval_status: status,
    }
}

pub fn items() -> Vec<EvaluationItem> {
    [101, 102, 103, 104]
        .into_iter()
        .map(|code| EvaluationItem {
            client_item_code: ItemCode(code),
            item_name: format!("item-{code}"),
        })
        .collect()
}

pub fn employee(id: i64, status: AssignmentStatus, skills: &[&str]) -> Employee {
    Employee {
        employee_id: EmployeeId(id),
        employee_name: format!("emp-{id}"),
        job_type: "개발".into(),
        skill_level: "중급".into(),
        project_assignment_yn: status,
        skills: skills.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn skills(names: &[&str]) -> Vec<Skill> {
    names
        .iter()
        .enumerate()
        .map(|(idx, name)| Skill {
            skill_id: SkillId(idx as i64 + 1),
            skill_name: name.to_string(),
        })
        .collect()
}

/// Project 1 is evaluated (client 501); projects 5 and 6 are pending.
pub fn seeded_gateway() -> InMemoryGateway {
    InMemoryGateway::new()
        .with_projects(
            EVALUATOR,
            vec![
                project(1, 501, EvalStatus::Completed),
                project(5, 502, EvalStatus::Pending),
                project(6, 503, EvalStatus::Pending),
            ],
        )
        .with_items(items())
        .with_grade(
            ClientId(501),
            ClientGrade {
                client_id: None,
                client_name: None,
                average_score: 85.5,
                grade: Grade::new("A"),
                priority: 2,
            },
        )
        .with_employees(vec![
            employee(1, AssignmentStatus::Assigned, &["React", "TypeScript"]),
            employee(2, AssignmentStatus::Available, &["React"]),
            employee(3, AssignmentStatus::Assigned, &["Java"]),
            employee(4, AssignmentStatus::Available, &["Python", "Rust"]),
        ])
        .with_skills(skills(&["React", "TypeScript", "Java", "Python", "Rust"]))
}

pub fn context_for(gateway: Arc<InMemoryGateway>) -> ClientContext {
    let settings = Settings {
        employee_id: EVALUATOR,
        ..Settings::default()
    };
    ClientContext::new(gateway, &settings)
}

pub fn drain(rx: &mut broadcast::Receiver<Notice>) -> Vec<Notice> {
    let mut notices = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        notices.push(notice);
    }
    notices
}
