// src/api.rs
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::artifacts::{read_text, ArtifactLayout, ArtifactSet};
use crate::config::DashboardConfig;
use crate::dashboard::render_page;
use crate::runner::{CommandRunner, PipelineRunner, PipelineTrigger, RunOutcome};
use crate::theme::apply_theme;
use crate::topics::Topic;
use crate::view::{build_view, ViewModel, ViewState, NO_NEWSLETTER_MSG};

#[derive(Clone)]
pub struct AppState {
    title: Arc<str>,
    layout: Arc<ArtifactLayout>,
    trigger: Arc<PipelineTrigger>,
}

impl AppState {
    pub fn new(cfg: &DashboardConfig, runner: Arc<dyn PipelineRunner>) -> Self {
        Self {
            title: Arc::from(cfg.title.as_str()),
            layout: Arc::new(cfg.artifacts.clone()),
            trigger: Arc::new(PipelineTrigger::new(runner)),
        }
    }

    /// State wired to the configured external pipeline command.
    pub fn from_config(cfg: &DashboardConfig) -> Self {
        Self::new(cfg, Arc::new(CommandRunner::new(cfg.runner.clone())))
    }

    /// Re-read the artifacts and rebuild the view. The selection comes
    /// from the request alone (`?topic=`); nothing is shared between
    /// visitors.
    pub fn current_view(&self, requested: Option<&str>) -> ViewModel {
        let artifacts = ArtifactSet::load(&self.layout);
        let mut st = ViewState::new();
        if let Some(t) = requested.and_then(|name| name.parse::<Topic>().ok()) {
            st.select(t);
        }
        build_view(&artifacts, &mut st)
    }
}

pub fn router(state: AppState) -> Router {
    let raw_artifacts = ServeDir::new(&state.layout.results_dir);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/", get(dashboard))
        .route("/run", post(run_and_redirect))
        .route("/preview", get(preview))
        .route("/newsletter.html", get(download))
        .route("/api/view", get(api_view))
        .route("/api/run", post(api_run))
        .nest_service("/artifacts", raw_artifacts)
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct TopicQuery {
    #[serde(default)]
    topic: Option<String>,
    /// Set by the `/run` redirect when the click was refused.
    #[serde(default)]
    run: Option<String>,
}

const RUN_BUSY: &str = "busy";

async fn dashboard(State(state): State<AppState>, Query(q): Query<TopicQuery>) -> Html<String> {
    let view = state.current_view(q.topic.as_deref());
    let banner = if q.run.as_deref() == Some(RUN_BUSY) {
        Some(RunOutcome::Busy)
    } else {
        state.trigger.last_outcome()
    };
    Html(render_page(&state.title, &view, banner.as_ref()))
}

async fn api_view(State(state): State<AppState>, Query(q): Query<TopicQuery>) -> Json<ViewModel> {
    Json(state.current_view(q.topic.as_deref()))
}

async fn run_and_redirect(State(state): State<AppState>) -> Redirect {
    // Finished runs are kept on the trigger; a refused one is not.
    match state.trigger.trigger().await {
        RunOutcome::Busy => Redirect::to(&format!("/?run={RUN_BUSY}")),
        _ => Redirect::to("/"),
    }
}

#[derive(serde::Serialize)]
struct RunResp {
    outcome: RunOutcome,
    message: String,
}

async fn api_run(State(state): State<AppState>) -> Json<RunResp> {
    let outcome = state.trigger.trigger().await;
    Json(RunResp {
        message: outcome.message(),
        outcome,
    })
}

/// Final newsletter with the theme injected, or None if there is none yet.
fn themed_newsletter(layout: &ArtifactLayout) -> Option<String> {
    let html = read_text(&layout.newsletter_path());
    if html.trim().is_empty() {
        return None;
    }
    Some(apply_theme(&html))
}

async fn preview(State(state): State<AppState>) -> Response {
    match themed_newsletter(&state.layout) {
        Some(html) => Html(html).into_response(),
        None => (StatusCode::NOT_FOUND, NO_NEWSLETTER_MSG).into_response(),
    }
}

async fn download(State(state): State<AppState>) -> Response {
    match themed_newsletter(&state.layout) {
        Some(html) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/html; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"newsletter.html\"",
                ),
            ],
            html,
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, NO_NEWSLETTER_MSG).into_response(),
    }
}
