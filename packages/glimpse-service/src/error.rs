pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Conflict: {message}")]
	Conflict { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Vector store error: {message}")]
	VectorStore { message: String },
	#[error("Folder hierarchy is corrupt at folder {folder_id}.")]
	CorruptHierarchy { folder_id: i64 },
}
impl From<glimpse_storage::Error> for Error {
	fn from(err: glimpse_storage::Error) -> Self {
		match err {
			glimpse_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			glimpse_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			glimpse_storage::Error::NotFound(message) => Self::NotFound { message },
			glimpse_storage::Error::Conflict(message) => Self::Conflict { message },
			glimpse_storage::Error::Qdrant(inner) =>
				Self::VectorStore { message: inner.to_string() },
		}
	}
}

impl From<glimpse_providers::Error> for Error {
	fn from(err: glimpse_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<glimpse_domain::Error> for Error {
	fn from(err: glimpse_domain::Error) -> Self {
		match err {
			glimpse_domain::Error::CorruptHierarchy { folder_id } =>
				Self::CorruptHierarchy { folder_id },
			glimpse_domain::Error::InvalidContent { message } => Self::Provider { message },
		}
	}
}

impl From<qdrant_client::QdrantError> for Error {
	fn from(err: qdrant_client::QdrantError) -> Self {
		Self::VectorStore { message: err.to_string() }
	}
}
