//! Relational side of the catalog: folders and the objects filed in them.

use serde::Serialize;
use time::OffsetDateTime;

use glimpse_domain::folder::Folder;
use glimpse_storage::{
	db::Db,
	models::{FolderRow, ObjectSummary as ObjectSummaryRow},
	queries,
};

pub use glimpse_storage::models::NewObject;

use crate::{BoxFuture, Result};

/// A cataloged object as returned by search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Object {
	pub object_id: i64,
	pub name: String,
	pub description: String,
	pub folder_id: i64,
	pub provenance: String,
	#[serde(serialize_with = "crate::time_serde::serialize")]
	pub created_at: OffsetDateTime,
}

pub trait Catalog
where
	Self: Send + Sync,
{
	/// One consistent snapshot of every folder, root included.
	fn list_folders(&self) -> BoxFuture<'_, Result<Vec<Folder>>>;

	fn insert_folder<'a>(&'a self, name: &'a str, parent_id: i64) -> BoxFuture<'a, Result<Folder>>;

	fn update_folder<'a>(&'a self, folder: &'a Folder) -> BoxFuture<'a, Result<Folder>>;

	fn delete_folder(&self, folder_id: i64) -> BoxFuture<'_, Result<()>>;

	fn count_objects(&self, folder_id: i64) -> BoxFuture<'_, Result<u64>>;

	fn create_object<'a>(&'a self, object: &'a NewObject) -> BoxFuture<'a, Result<i64>>;

	/// `None` when the object no longer exists.
	fn get_object(&self, object_id: i64) -> BoxFuture<'_, Result<Option<Object>>>;

	fn objects_in_folder(&self, folder_id: i64) -> BoxFuture<'_, Result<Vec<Object>>>;
}

impl Catalog for Db {
	fn list_folders(&self) -> BoxFuture<'_, Result<Vec<Folder>>> {
		Box::pin(async move {
			let rows = queries::list_folders(&self.pool).await?;

			Ok(rows.into_iter().map(folder_from_row).collect())
		})
	}

	fn insert_folder<'a>(&'a self, name: &'a str, parent_id: i64) -> BoxFuture<'a, Result<Folder>> {
		Box::pin(async move {
			let row = queries::insert_folder(self, name, parent_id).await?;

			Ok(folder_from_row(row))
		})
	}

	fn update_folder<'a>(&'a self, folder: &'a Folder) -> BoxFuture<'a, Result<Folder>> {
		Box::pin(async move {
			let row =
				queries::update_folder(self, folder.id, folder.name.as_str(), folder.parent_id)
					.await?;

			Ok(folder_from_row(row))
		})
	}

	fn delete_folder(&self, folder_id: i64) -> BoxFuture<'_, Result<()>> {
		Box::pin(async move { Ok(queries::delete_folder(self, folder_id).await?) })
	}

	fn count_objects(&self, folder_id: i64) -> BoxFuture<'_, Result<u64>> {
		Box::pin(async move { Ok(queries::count_objects_in_folder(&self.pool, folder_id).await?) })
	}

	fn create_object<'a>(&'a self, object: &'a NewObject) -> BoxFuture<'a, Result<i64>> {
		Box::pin(async move { Ok(queries::insert_object(&self.pool, object).await?) })
	}

	fn get_object(&self, object_id: i64) -> BoxFuture<'_, Result<Option<Object>>> {
		Box::pin(async move {
			Ok(queries::get_object(&self.pool, object_id).await?.map(object_from_row))
		})
	}

	fn objects_in_folder(&self, folder_id: i64) -> BoxFuture<'_, Result<Vec<Object>>> {
		Box::pin(async move {
			let rows = queries::list_objects_in_folder(&self.pool, folder_id).await?;

			Ok(rows.into_iter().map(object_from_row).collect())
		})
	}
}

fn folder_from_row(row: FolderRow) -> Folder {
	Folder { id: row.folder_id, name: row.name, parent_id: row.parent_id }
}

fn object_from_row(row: ObjectSummaryRow) -> Object {
	Object {
		object_id: row.object_id,
		name: row.name,
		description: row.description,
		folder_id: row.folder_id,
		provenance: row.provenance,
		created_at: row.created_at,
	}
}
