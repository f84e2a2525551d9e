mod render;

use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::{load_settings, normalize_api_base_url, DEFAULT_CONFIG_FILE},
    directory::{dashboard_summary, EmployeeSearchController},
    evaluation::{
        ClientRankingController, EvaluationFormController, EvaluationListController, ListView,
        RankingView, RowAction,
    },
    staffing::{AssignmentFilter, SkillFilter, StaffingController},
    ClientContext, EvaluationContext, InMemoryGateway, Route, Settings,
};
use shared::domain::{EmployeeId, ItemCode, ProjectId};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "workdesk", version, about = "사내 업무 시스템 client")]
struct Cli {
    /// Business API base url (overrides config file and environment).
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Acting employee id, used as list owner and evaluator.
    #[arg(long, global = true)]
    employee_id: Option<i64>,
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Run against built-in sample data instead of the API.
    #[arg(long, global = true)]
    demo: bool,
    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a page by path, e.g. `/evaluation` or `/human-resource`.
    Open {
        path: String,
        /// Navigation state for `/evaluation/{id}` as JSON.
        #[arg(long)]
        state: Option<String>,
    },
    Dashboard,
    /// Finished projects awaiting or holding a client evaluation.
    Evaluations,
    /// Score every evaluation item of a pending project and submit.
    Evaluate {
        project_id: i64,
        /// `ITEM_CODE=SCORE`, once per item.
        #[arg(long = "score", value_parser = parse_score)]
        scores: Vec<(i64, String)>,
    },
    /// Client grade for an evaluated project.
    Grade { project_id: i64 },
    Ranking,
    Employees {
        #[arg(long, default_value = "")]
        search: String,
    },
    Staffing {
        #[arg(long = "skill")]
        skills: Vec<String>,
        /// all, available (0) or assigned (1).
        #[arg(long, default_value = "all")]
        status: AssignmentFilter,
    },
    Assign { employee_id: i64 },
}

fn parse_score(raw: &str) -> Result<(i64, String), String> {
    let (code, score) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ITEM_CODE=SCORE, got '{raw}'"))?;
    let code = code
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("item code must be a number, got '{code}'"))?;
    Ok((code, score.trim().to_string()))
}

fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = load_settings(&cli.config)?;
    if let Some(url) = &cli.api_url {
        settings.api_base_url = normalize_api_base_url(url);
    }
    if let Some(id) = cli.employee_id {
        settings.employee_id = EmployeeId(id);
    }
    Ok(settings)
}

fn build_context(settings: &Settings, demo: bool) -> Result<ClientContext> {
    if demo {
        info!(
            employee_id = settings.employee_id.0,
            "using in-memory sample data"
        );
        let gateway = InMemoryGateway::demo(settings.employee_id);
        return Ok(ClientContext::new(Arc::new(gateway), settings));
    }
    ClientContext::over_http(settings)
        .with_context(|| format!("failed to create api client for {}", settings.api_base_url))
}

struct App {
    ctx: ClientContext,
    json: bool,
}

impl App {
    async fn open(&self, route: Route, state: Option<EvaluationContext>) -> Result<()> {
        info!(route = %route, "navigate");
        let title = route.title();
        match route {
            Route::Landing => {
                render::landing(self.ctx.employee_id);
                Ok(())
            }
            Route::Dashboard => self.dashboard().await,
            Route::EvaluationList => self.evaluations().await,
            Route::EvaluationForm { project_id } => self.form_page(project_id, state).await,
            Route::EmployeeSearch => self.employees("").await,
            Route::Staffing => self.staffing(Vec::new(), AssignmentFilter::All).await,
            Route::ClientRanking => self.ranking().await,
            Route::NotFound(path) => bail!("{title}: {path}"),
        }
    }

    async fn dashboard(&self) -> Result<()> {
        let summary = dashboard_summary(&self.ctx)
            .await
            .context("failed to load dashboard")?;
        if self.json {
            return render::json(&summary);
        }
        render::dashboard(&summary);
        Ok(())
    }

    async fn load_list(&self) -> Result<EvaluationListController> {
        let mut list = EvaluationListController::new(self.ctx.clone());
        if let ListView::Failed(message) = list.load().await {
            bail!("failed to load projects: {message}");
        }
        Ok(list)
    }

    async fn evaluations(&self) -> Result<()> {
        let list = self.load_list().await?;
        if self.json {
            let projects: Vec<_> = list.rows().iter().map(|row| &row.project).collect();
            return render::json(&projects);
        }
        render::project_rows(list.rows());
        Ok(())
    }

    /// A bare `/evaluation/{id}` has no list state; the form refuses it and
    /// the list is shown instead.
    async fn form_page(
        &self,
        project_id: ProjectId,
        state: Option<EvaluationContext>,
    ) -> Result<()> {
        match EvaluationFormController::open(self.ctx.clone(), project_id, state).await {
            Ok(form) => {
                render::form(&form);
                Ok(())
            }
            Err(err) => {
                warn!(project_id = project_id.0, error = %err, "evaluation form refused");
                self.ctx
                    .notifier
                    .warning("평가 목록에서 프로젝트를 선택해주세요.");
                self.evaluations().await
            }
        }
    }

    async fn evaluate(&self, project_id: ProjectId, scores: &[(i64, String)]) -> Result<()> {
        let list = self.load_list().await?;
        let context = list.evaluate(project_id)?;

        let mut form = EvaluationFormController::open(self.ctx.clone(), project_id, Some(context))
            .await?;
        for (code, raw) in scores {
            let committed = form.enter(ItemCode(*code), raw)?;
            info!(item = code, score = committed, "score entered");
        }

        let route = form.submit().await?;
        self.open(route, None).await
    }

    async fn grade(&self, project_id: ProjectId) -> Result<()> {
        let list = self.load_list().await?;
        let row = list
            .rows()
            .iter()
            .find(|row| row.project.project_id == project_id)
            .ok_or_else(|| anyhow!("project {project_id} is not in the completed project list"))?;

        let RowAction::LookupGrade {
            client_id,
            client_name,
        } = &row.action
        else {
            bail!("project {project_id} has not been evaluated yet");
        };

        let overlay = list
            .lookup_grade(*client_id, client_name)
            .await
            .ok_or_else(|| anyhow!("grade lookup for client {client_id} failed"))?;
        if self.json {
            return render::json(&overlay.grade);
        }
        render::grade(&overlay);
        Ok(())
    }

    async fn ranking(&self) -> Result<()> {
        let mut ranking = ClientRankingController::new(self.ctx.clone());
        match ranking.load().await {
            RankingView::Failed(message) => bail!("failed to load rankings: {message}"),
            RankingView::Loaded(rows) if self.json => render::json(rows),
            RankingView::Loaded(rows) => {
                render::rankings(rows);
                Ok(())
            }
            RankingView::Empty | RankingView::Loading => {
                println!("순위 데이터가 없습니다.");
                Ok(())
            }
        }
    }

    async fn employees(&self, term: &str) -> Result<()> {
        let mut search = EmployeeSearchController::new(self.ctx.clone());
        search.load().await.context("failed to load employees")?;
        let matches = search.search(term);
        if self.json {
            return render::json(&matches);
        }
        render::staff(&matches.into_iter().cloned().collect::<Vec<_>>());
        Ok(())
    }

    async fn load_staffing(
        &self,
        skills: Vec<String>,
        status: AssignmentFilter,
    ) -> Result<StaffingController> {
        let mut staffing = StaffingController::new(self.ctx.clone());
        staffing.set_skills(SkillFilter::from_names(skills));
        staffing.set_assignment_filter(status);
        staffing
            .load()
            .await
            .context("failed to load staffing data")?;
        Ok(staffing)
    }

    async fn staffing(&self, skills: Vec<String>, status: AssignmentFilter) -> Result<()> {
        let staffing = self.load_staffing(skills, status).await?;
        if self.json {
            return render::json(&staffing.visible());
        }
        render::staffing(&staffing);
        Ok(())
    }

    async fn assign(&self, employee_id: EmployeeId) -> Result<()> {
        let mut staffing = self.load_staffing(Vec::new(), AssignmentFilter::All).await?;
        let known = staffing
            .roster()
            .iter()
            .find(|member| member.employee_id() == employee_id)
            .map(|member| member.assignment())
            .ok_or_else(|| anyhow!("employee {employee_id} is not on the roster"))?;

        staffing.assign(employee_id, known).await?;
        if self.json {
            return render::json(&staffing.visible());
        }
        render::staffing(&staffing);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;
    info!(
        api = %settings.api_base_url,
        employee_id = settings.employee_id.0,
        demo = cli.demo,
        "workdesk starting"
    );

    let ctx = build_context(&settings, cli.demo)?;
    let mut notices = ctx.notifier.subscribe();
    let app = App {
        ctx,
        json: cli.json,
    };

    let result = match cli.command {
        Command::Open { path, state } => {
            let state = state
                .map(|raw| serde_json::from_str::<EvaluationContext>(&raw))
                .transpose()
                .context("--state must be an evaluation context JSON object")?;
            app.open(Route::parse(&path), state).await
        }
        Command::Dashboard => app.dashboard().await,
        Command::Evaluations => app.evaluations().await,
        Command::Evaluate { project_id, scores } => {
            app.evaluate(ProjectId(project_id), &scores).await
        }
        Command::Grade { project_id } => app.grade(ProjectId(project_id)).await,
        Command::Ranking => app.ranking().await,
        Command::Employees { search } => app.employees(&search).await,
        Command::Staffing { skills, status } => app.staffing(skills, status).await,
        Command::Assign { employee_id } => app.assign(EmployeeId(employee_id)).await,
    };

    while let Ok(notice) = notices.try_recv() {
        render::notice(&notice);
    }
    result
}
