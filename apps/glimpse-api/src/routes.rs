use axum::{
	Json, Router,
	extract::{Path, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use glimpse_service::{
	CreateFolderRequest, Error, Folder, FolderContents, SearchRequest, SearchResponse,
	UpdateFolderRequest, UploadRequest, UploadResponse,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/objects/upload", post(upload))
		.route("/v1/search", post(search))
		.route("/v1/folders", get(list_folders).post(create_folder))
		.route("/v1/folders/tree", get(folder_tree))
		.route(
			"/v1/folders/{folder_id}",
			get(folder_contents).post(update_folder).delete(delete_folder),
		)
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn upload(
	State(state): State<AppState>,
	Json(payload): Json<UploadRequest>,
) -> Result<Json<UploadResponse>, ApiError> {
	let response = state.service.upload(payload).await?;

	Ok(Json(response))
}

async fn search(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let response = state.service.search(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct FolderListResponse {
	folders: Vec<Folder>,
}

async fn list_folders(
	State(state): State<AppState>,
) -> Result<Json<FolderListResponse>, ApiError> {
	let folders = state.service.list_folders().await?;

	Ok(Json(FolderListResponse { folders }))
}

#[derive(Debug, Serialize)]
struct FolderTreeResponse {
	tree: String,
}

async fn folder_tree(
	State(state): State<AppState>,
) -> Result<Json<FolderTreeResponse>, ApiError> {
	let tree = state.service.render_folder_tree().await?;

	Ok(Json(FolderTreeResponse { tree }))
}

async fn create_folder(
	State(state): State<AppState>,
	Json(payload): Json<CreateFolderRequest>,
) -> Result<(StatusCode, Json<Folder>), ApiError> {
	let folder = state.service.create_folder(payload).await?;

	Ok((StatusCode::CREATED, Json(folder)))
}

async fn update_folder(
	State(state): State<AppState>,
	Path(folder_id): Path<i64>,
	Json(payload): Json<UpdateFolderRequest>,
) -> Result<Json<Folder>, ApiError> {
	let folder = state.service.update_folder(folder_id, payload).await?;

	Ok(Json(folder))
}

async fn folder_contents(
	State(state): State<AppState>,
	Path(folder_id): Path<i64>,
) -> Result<Json<FolderContents>, ApiError> {
	let contents = state.service.folder_contents(folder_id).await?;

	Ok(Json(contents))
}

async fn delete_folder(
	State(state): State<AppState>,
	Path(folder_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
	state.service.delete_folder(folder_id).await?;

	Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message } =>
				Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message),
			Error::NotFound { message } => Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message),
			Error::Conflict { message } => Self::new(StatusCode::CONFLICT, "CONFLICT", message),
			Error::Provider { message } => {
				tracing::error!(error = %message, "Provider failure.");

				Self::new(StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", message)
			},
			Error::VectorStore { message } => {
				tracing::error!(error = %message, "Vector store failure.");

				Self::new(StatusCode::BAD_GATEWAY, "VECTOR_STORE_ERROR", message)
			},
			Error::Storage { message } => {
				tracing::error!(error = %message, "Storage failure.");

				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", "Storage failure.")
			},
			err @ Error::CorruptHierarchy { .. } => {
				tracing::error!(error = %err, "Folder hierarchy is corrupt.");

				Self::new(StatusCode::INTERNAL_SERVER_ERROR, "CORRUPT_HIERARCHY", err.to_string())
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
