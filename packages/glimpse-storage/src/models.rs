use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FolderRow {
	pub folder_id: i64,
	pub name: String,
	pub parent_id: i64,
}

/// Object columns without the stored payload.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ObjectSummary {
	pub object_id: i64,
	pub name: String,
	pub description: String,
	pub folder_id: i64,
	pub provenance: String,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewObject {
	pub name: String,
	pub payload: Vec<u8>,
	pub description: String,
	pub folder_id: i64,
	pub provenance: String,
}
