use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::html;
use crate::types::{DayKey, Direction, DisplayCell, StoreError, TaskStore};
use crate::view::{CalendarView, FixedAnswer};

/// Application state shared across requests
pub struct AppState {
    /// Requests take turns on the view, one mutation at a time
    pub view: Mutex<CalendarView>,
}

impl AppState {
    pub fn new(view: CalendarView) -> Self {
        Self {
            view: Mutex::new(view),
        }
    }
}

/// Form body for adding or removing a task
#[derive(Debug, Deserialize)]
struct TaskForm {
    text: Option<String>,
}

/// Error response carrying a status code and a plain-text reason
#[derive(Debug)]
struct AppError(StatusCode, String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<StoreError>() {
            Some(store_err @ StoreError::NoTasksForDay(_)) => {
                AppError(StatusCode::NOT_FOUND, store_err.to_string())
            }
            Some(store_err @ StoreError::InvalidDayKey(_)) => {
                AppError(StatusCode::BAD_REQUEST, store_err.to_string())
            }
            None => {
                error!(error = %err, "Request failed");
                AppError(StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        }
    }
}

fn parse_day(raw: &str) -> Result<DayKey, AppError> {
    raw.parse()
        .map_err(|e: StoreError| AppError(StatusCode::BAD_REQUEST, e.to_string()))
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/cells", get(cells_handler))
        .route("/api/tasks", get(tasks_handler))
        .route("/navigate/{direction}", post(navigate_handler))
        .route("/mode", post(toggle_mode_handler))
        .route("/days/{day}/tasks", post(add_task_handler))
        .route("/days/{day}/tasks/remove", post(remove_task_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the web server
pub async fn serve(port: u16, view: CalendarView) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(view));
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Server running at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve the calendar page
async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let view = state.view.lock().await;
    let markup = html::render_page(&view.page(today()));
    Html(markup.into_string())
}

/// Return the current grid as JSON
async fn cells_handler(State(state): State<Arc<AppState>>) -> Json<Vec<DisplayCell>> {
    let view = state.view.lock().await;
    Json(view.cells(today()))
}

/// Return the whole task store as JSON
async fn tasks_handler(State(state): State<Arc<AppState>>) -> Json<TaskStore> {
    let view = state.view.lock().await;
    Json(view.store().clone())
}

async fn navigate_handler(
    State(state): State<Arc<AppState>>,
    Path(direction): Path<String>,
) -> Result<Redirect, AppError> {
    let direction: Direction = direction
        .parse()
        .map_err(|e: String| AppError(StatusCode::BAD_REQUEST, e))?;
    state.view.lock().await.navigate(direction);
    Ok(Redirect::to("/"))
}

async fn toggle_mode_handler(State(state): State<Arc<AppState>>) -> Redirect {
    let mode = state.view.lock().await.toggle_mode();
    info!(mode = mode.as_str(), "View mode switched");
    Redirect::to("/")
}

async fn add_task_handler(
    State(state): State<Arc<AppState>>,
    Path(day): Path<String>,
    Form(form): Form<TaskForm>,
) -> Result<Redirect, AppError> {
    let day = parse_day(&day)?;
    let mut answer = FixedAnswer(form.text);
    state.view.lock().await.add_task_from(day, &mut answer)?;
    Ok(Redirect::to("/"))
}

async fn remove_task_handler(
    State(state): State<Arc<AppState>>,
    Path(day): Path<String>,
    Form(form): Form<TaskForm>,
) -> Result<Redirect, AppError> {
    let day = parse_day(&day)?;
    let text = form.text.unwrap_or_default();
    if let Err(err) = state.view.lock().await.remove_task(&day, &text) {
        warn!(day = %day, error = %err, "Remove rejected");
        return Err(err.into());
    }
    Ok(Redirect::to("/"))
}
