use sqlx::{PgConnection, PgExecutor};

use crate::{
	Error, Result,
	db::Db,
	models::{FolderRow, NewObject, ObjectSummary},
};

pub async fn list_folders<'e, E>(executor: E) -> Result<Vec<FolderRow>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, FolderRow>(
		"\
SELECT folder_id, name, parent_id
FROM folders
ORDER BY parent_id ASC, folder_id ASC",
	)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

/// Inserts a folder while holding a row lock on its parent.
pub async fn insert_folder(db: &Db, name: &str, parent_id: i64) -> Result<FolderRow> {
	let mut tx = db.pool.begin().await?;

	lock_folder(&mut *tx, parent_id).await?;

	let row = sqlx::query_as::<_, FolderRow>(
		"\
INSERT INTO folders (name, parent_id)
VALUES ($1, $2)
RETURNING folder_id, name, parent_id",
	)
	.bind(name)
	.bind(parent_id)
	.fetch_one(&mut *tx)
	.await
	.map_err(|err| duplicate_name(err, name, parent_id))?;

	tx.commit().await?;

	tracing::info!(folder_id = row.folder_id, parent_id, "Folder created.");

	Ok(row)
}

/// Renames and reparents a folder while holding row locks on it and its new parent.
pub async fn update_folder(
	db: &Db,
	folder_id: i64,
	name: &str,
	parent_id: i64,
) -> Result<FolderRow> {
	let mut tx = db.pool.begin().await?;

	lock_folder(&mut *tx, folder_id).await?;
	lock_folder(&mut *tx, parent_id).await?;

	let row = sqlx::query_as::<_, FolderRow>(
		"\
UPDATE folders
SET name = $2, parent_id = $3
WHERE folder_id = $1
RETURNING folder_id, name, parent_id",
	)
	.bind(folder_id)
	.bind(name)
	.bind(parent_id)
	.fetch_one(&mut *tx)
	.await
	.map_err(|err| duplicate_name(err, name, parent_id))?;

	tx.commit().await?;

	tracing::info!(folder_id, parent_id, "Folder updated.");

	Ok(row)
}

/// Deletes an empty folder. Children or filed objects are a conflict.
pub async fn delete_folder(db: &Db, folder_id: i64) -> Result<()> {
	let mut tx = db.pool.begin().await?;

	lock_folder(&mut *tx, folder_id).await?;

	let children: i64 = sqlx::query_scalar(
		"SELECT count(*) FROM folders WHERE parent_id = $1 AND folder_id <> $1",
	)
	.bind(folder_id)
	.fetch_one(&mut *tx)
	.await?;

	if children > 0 {
		return Err(Error::Conflict(format!("Folder {folder_id} still has subfolders.")));
	}

	let objects: i64 = sqlx::query_scalar("SELECT count(*) FROM objects WHERE folder_id = $1")
		.bind(folder_id)
		.fetch_one(&mut *tx)
		.await?;

	if objects > 0 {
		return Err(Error::Conflict(format!("Folder {folder_id} still holds objects.")));
	}

	sqlx::query("DELETE FROM folders WHERE folder_id = $1")
		.bind(folder_id)
		.execute(&mut *tx)
		.await?;

	tx.commit().await?;

	tracing::info!(folder_id, "Folder deleted.");

	Ok(())
}

pub async fn count_objects_in_folder<'e, E>(executor: E, folder_id: i64) -> Result<u64>
where
	E: PgExecutor<'e>,
{
	let count: i64 = sqlx::query_scalar("SELECT count(*) FROM objects WHERE folder_id = $1")
		.bind(folder_id)
		.fetch_one(executor)
		.await?;

	Ok(count.max(0) as u64)
}

pub async fn insert_object<'e, E>(executor: E, object: &NewObject) -> Result<i64>
where
	E: PgExecutor<'e>,
{
	let object_id: i64 = sqlx::query_scalar(
		"\
INSERT INTO objects (name, payload, description, folder_id, provenance)
VALUES ($1, $2, $3, $4, $5)
RETURNING object_id",
	)
	.bind(object.name.as_str())
	.bind(object.payload.as_slice())
	.bind(object.description.as_str())
	.bind(object.folder_id)
	.bind(object.provenance.as_str())
	.fetch_one(executor)
	.await
	.map_err(|err| match &err {
		sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() =>
			Error::NotFound(format!("Folder {} does not exist.", object.folder_id)),
		_ => Error::Sqlx(err),
	})?;

	Ok(object_id)
}

pub async fn get_object<'e, E>(executor: E, object_id: i64) -> Result<Option<ObjectSummary>>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_as::<_, ObjectSummary>(
		"\
SELECT object_id, name, description, folder_id, provenance, created_at
FROM objects
WHERE object_id = $1",
	)
	.bind(object_id)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}

pub async fn list_objects_in_folder<'e, E>(
	executor: E,
	folder_id: i64,
) -> Result<Vec<ObjectSummary>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, ObjectSummary>(
		"\
SELECT object_id, name, description, folder_id, provenance, created_at
FROM objects
WHERE folder_id = $1
ORDER BY object_id ASC",
	)
	.bind(folder_id)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

async fn lock_folder(conn: &mut PgConnection, folder_id: i64) -> Result<()> {
	let locked: Option<i64> =
		sqlx::query_scalar("SELECT folder_id FROM folders WHERE folder_id = $1 FOR UPDATE")
			.bind(folder_id)
			.fetch_optional(conn)
			.await?;

	match locked {
		Some(_) => Ok(()),
		None => Err(Error::NotFound(format!("Folder {folder_id} does not exist."))),
	}
}

fn duplicate_name(err: sqlx::Error, name: &str, parent_id: i64) -> Error {
	match &err {
		sqlx::Error::Database(db_err) if db_err.is_unique_violation() => Error::Conflict(format!(
			"A folder named {name:?} already exists under folder {parent_id}."
		)),
		_ => Error::Sqlx(err),
	}
}
