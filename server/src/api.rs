use std::sync::Arc;

/// Shared state behind every API handler.
pub struct AppState {
    pub jobs: crate::jobs::JobStore,
    pub maps: crate::maps::MapRegistry,
    pub storage: Box<dyn crate::storage::DemoStorage>,
    pub match_dir: std::path::PathBuf,
    pub collect: collector::Config,
}

/// Error responses carry a JSON body so the frontend can surface the
/// message directly.
pub struct ApiError(axum::http::StatusCode, String);

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            self.0,
            axum::response::Json(serde_json::json!({ "error": self.1 })),
        )
            .into_response()
    }
}

pub fn router(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(health))
        .route(
            "/parse",
            axum::routing::post(parse::upload)
                .layer(axum::extract::DefaultBodyLimit::max(500 * 1024 * 1024)),
        )
        .nest("/match/", matches::router())
        .merge(maps::router())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

pub mod parse {
    use super::{ApiError, AppState};
    use axum::extract::State;
    use futures::StreamExt;
    use futures::TryStreamExt;
    use std::sync::Arc;

    pub async fn upload(
        State(state): State<Arc<AppState>>,
        mut form: axum::extract::Multipart,
    ) -> Result<(axum::http::StatusCode, axum::response::Json<crate::jobs::ParseJob>), ApiError>
    {
        while let Some(field) = form.next_field().await.map_err(|err| {
            ApiError(
                axum::http::StatusCode::BAD_REQUEST,
                format!("Reading upload: {}", err),
            )
        })? {
            if field.name().map(|n| n != "demo").unwrap_or(true) {
                continue;
            }

            if let Some(file_name) = field.file_name() {
                let matches = std::path::Path::new(file_name)
                    .extension()
                    .map(|ext| ext == collector::replay::FILE_EXTENSION)
                    .unwrap_or(false);
                if !matches {
                    return Err(ApiError(
                        axum::http::StatusCode::BAD_REQUEST,
                        format!(
                            "Expected a .{} upload, got {:?}",
                            collector::replay::FILE_EXTENSION,
                            file_name
                        ),
                    ));
                }
            }

            let id = uuid::Uuid::now_v7().to_string();
            state.jobs.create(id.clone());

            let stream = field
                .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))
                .boxed();
            if let Err(err) = state.storage.store(id.clone(), stream).await {
                tracing::error!("Storing upload {}: {}", id, err);
                state.jobs.mark_error(&id, err);
                return Err(ApiError(
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Storing the upload failed".to_string(),
                ));
            }

            tokio::task::spawn(crate::worker::process(state.clone(), id.clone()));

            return match state.jobs.get(&id) {
                Some(job) => Ok((axum::http::StatusCode::ACCEPTED, axum::response::Json(job))),
                None => Err(ApiError(
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Job vanished before it started".to_string(),
                )),
            };
        }

        Err(ApiError(
            axum::http::StatusCode::BAD_REQUEST,
            "Missing 'demo' field in upload".to_string(),
        ))
    }
}

pub mod matches {
    use super::{ApiError, AppState};
    use axum::extract::{Path, State};
    use axum::response::IntoResponse;
    use std::sync::Arc;

    pub fn router() -> axum::Router<Arc<AppState>> {
        axum::Router::new()
            .route("/:id/status", axum::routing::get(status))
            .route("/:id", axum::routing::get(get_match))
    }

    async fn status(
        State(state): State<Arc<AppState>>,
        Path(id): Path<String>,
    ) -> Result<axum::response::Json<crate::jobs::ParseJob>, ApiError> {
        match state.jobs.get(&id) {
            Some(job) => Ok(axum::response::Json(job)),
            None => Err(ApiError(
                axum::http::StatusCode::NOT_FOUND,
                format!("No parse job {}", id),
            )),
        }
    }

    async fn get_match(
        State(state): State<Arc<AppState>>,
        Path(id): Path<String>,
    ) -> Result<axum::response::Response, ApiError> {
        if id.contains("..") || id.contains('/') || id.contains('\\') {
            return Err(ApiError(
                axum::http::StatusCode::BAD_REQUEST,
                "Invalid match id".to_string(),
            ));
        }

        // A job that is still parsing (or failed) answers with its record,
        // the frontend polls until the document itself comes back.
        if let Some(job) = state.jobs.get(&id) {
            if job.status != crate::jobs::JobStatus::Ready {
                return Ok(axum::response::Json(job).into_response());
            }
        }

        let path = state.match_dir.join(format!("{}.json", id));
        match tokio::fs::read(&path).await {
            Ok(content) => Ok((
                [(axum::http::header::CONTENT_TYPE, "application/json")],
                content,
            )
                .into_response()),
            Err(_) => Err(ApiError(
                axum::http::StatusCode::NOT_FOUND,
                format!("No match {}", id),
            )),
        }
    }
}

pub mod maps {
    use super::{ApiError, AppState};
    use axum::extract::{Path, State};
    use std::sync::Arc;

    #[derive(Debug, serde::Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MapSummary {
        pub name: String,
        pub display_name: String,
    }

    pub fn router() -> axum::Router<Arc<AppState>> {
        axum::Router::new()
            .route("/maps", axum::routing::get(list))
            .route("/maps/:name/radar.png", axum::routing::get(radar))
    }

    async fn list(State(state): State<Arc<AppState>>) -> axum::response::Json<Vec<MapSummary>> {
        axum::response::Json(
            state
                .maps
                .all()
                .into_iter()
                .map(|config| MapSummary {
                    name: config.name,
                    display_name: config.display_name,
                })
                .collect(),
        )
    }

    async fn radar(
        State(state): State<Arc<AppState>>,
        Path(name): Path<String>,
    ) -> Result<impl axum::response::IntoResponse, ApiError> {
        // Radar files are resolved through the registry, never from the raw
        // request path.
        let config = state.maps.get(&name).ok_or_else(|| {
            ApiError(
                axum::http::StatusCode::NOT_FOUND,
                format!("Unknown map {}", name),
            )
        })?;

        let path = state.maps.radar_path(&config.radar_file);
        match tokio::fs::read(&path).await {
            Ok(content) => Ok((
                [(axum::http::header::CONTENT_TYPE, "image/png")],
                content,
            )),
            Err(err) => {
                tracing::warn!("Reading radar {}: {}", path.display(), err);
                Err(ApiError(
                    axum::http::StatusCode::NOT_FOUND,
                    format!("No radar image for {}", name),
                ))
            }
        }
    }
}
