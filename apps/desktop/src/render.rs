use anyhow::Result;
use client_core::{
    directory::DashboardSummary,
    evaluation::{EvaluationFormController, GradeOverlay, ProjectRow, RowAction},
    staffing::{RosterView, StaffingController},
    Notice, NoticeLevel, Route,
};
use serde::Serialize;
use shared::{
    domain::EmployeeId,
    protocol::{ClientRanking, StaffMember},
};

pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn heading(route: &Route) {
    println!("== {} ({}) ==", route.title(), route.path());
}

pub fn landing(employee_id: EmployeeId) {
    heading(&Route::Landing);
    println!("사번 {employee_id} 으로 접속 중");
    for route in Route::menu() {
        println!("  {:<16} {}", route.path(), route.title());
    }
}

pub fn dashboard(summary: &DashboardSummary) {
    heading(&Route::Dashboard);
    println!("전체 직원      {}", summary.total_employees);
    println!("투입 중 인력   {}", summary.assigned_employees);
    println!("평가 완료      {}", summary.completed_evaluations);
    println!("평가 대기      {}", summary.pending_evaluations);
}

pub fn project_rows(rows: &[ProjectRow]) {
    heading(&Route::EvaluationList);
    if rows.is_empty() {
        println!("종료된 프로젝트가 없습니다.");
        return;
    }
    println!(
        "{:>6}  {:<24} {:<10}  {:<16} {:<6}  작업",
        "ID", "프로젝트", "종료일", "고객사", "상태"
    );
    for row in rows {
        let project = &row.project;
        let action = match &row.action {
            RowAction::Evaluate(context) => format!("평가하기 -> {}", context.route()),
            RowAction::LookupGrade { .. } => "등급 조회".to_string(),
        };
        println!(
            "{:>6}  {:<24} {:<10}  {:<16} {:<6}  {action}",
            project.project_id,
            project.project_name,
            project.end_date_display(),
            project.client_name,
            project.eval_status.label(),
        );
    }
}

pub fn form(form: &EvaluationFormController) {
    let context = form.context();
    heading(&context.route());
    println!("{} / {}", context.project_name, context.client_name);
    for item in form.items() {
        let score = form.score(item.client_item_code).unwrap_or_default();
        println!(
            "  [{}] {:<24} {}",
            item.client_item_code,
            item.item_name,
            if score.is_empty() { "-" } else { score }
        );
    }
}

pub fn grade(overlay: &GradeOverlay) {
    println!("== {} ==", overlay.title());
    for line in overlay.lines() {
        println!("  {line}");
    }
}

pub fn rankings(rows: &[ClientRanking]) {
    heading(&Route::ClientRanking);
    for ranking in rows {
        println!(
            "{:>3}위  {:<16} {:>7.2}점  {}",
            ranking.rank, ranking.client_name, ranking.average_score, ranking.grade
        );
    }
}

pub fn staff(members: &[StaffMember]) {
    if members.is_empty() {
        println!("조건에 맞는 직원이 없습니다.");
        return;
    }
    for member in members {
        println!(
            "{:>6}  {:<10} {:<6} {:<6} {:<8} {}",
            member.employee_id(),
            member.name(),
            member.job_type().unwrap_or("-"),
            member.skill_level(),
            member.assignment().label(),
            member.skills().join(", "),
        );
    }
}

pub fn staffing(staffing: &StaffingController) {
    heading(&Route::Staffing);
    println!(
        "기술: {}  /  투입 여부: {:?}",
        staffing.skill_filter().label(),
        staffing.assignment_filter()
    );
    match staffing.view() {
        RosterView::Rows(rows) => staff(&rows),
        RosterView::NoSkillSelected => println!("기술을 선택해주세요."),
        RosterView::NoMatches => println!("선택한 기술을 보유한 개발자가 없습니다."),
    }
}

pub fn notice(notice: &Notice) {
    let tag = match notice.level {
        NoticeLevel::Success => "완료",
        NoticeLevel::Info => "알림",
        NoticeLevel::Warning => "주의",
        NoticeLevel::Error => "오류",
    };
    match &notice.description {
        Some(description) => eprintln!("[{tag}] {}: {description}", notice.title),
        None => eprintln!("[{tag}] {}", notice.title),
    }
}
