pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("Folder hierarchy is corrupt: cycle detected at folder {folder_id}.")]
	CorruptHierarchy { folder_id: i64 },
	#[error("Invalid content: {message}")]
	InvalidContent { message: String },
}
