use serde::{Deserialize, Serialize};

use glimpse_domain::folder::{Folder, FolderTree, ROOT_FOLDER_ID};

use crate::{Error, GlimpseService, Object, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateFolderRequest {
	pub name: String,
	#[serde(default)]
	pub parent_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateFolderRequest {
	pub name: String,
	pub parent_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FolderContents {
	pub folder_id: i64,
	pub subfolders: Vec<Folder>,
	pub objects: Vec<Object>,
}

impl GlimpseService {
	/// Every folder ordered by `(parent_id, id)`.
	pub async fn list_folders(&self) -> Result<Vec<Folder>> {
		Ok(self.folder_tree().await?.into_folders())
	}

	pub async fn create_folder(&self, req: CreateFolderRequest) -> Result<Folder> {
		let name = validate_name(&req.name)?;
		let tree = self.folder_tree().await?;

		ensure_parent(&tree, req.parent_id)?;
		ensure_unique_name(&tree, req.parent_id, name, None)?;

		self.catalog.insert_folder(name, req.parent_id).await
	}

	pub async fn update_folder(&self, folder_id: i64, req: UpdateFolderRequest) -> Result<Folder> {
		if folder_id == ROOT_FOLDER_ID {
			return Err(Error::InvalidRequest {
				message: "The root folder cannot be modified.".to_string(),
			});
		}

		let name = validate_name(&req.name)?;
		let tree = self.folder_tree().await?;

		if tree.get(folder_id).is_none() {
			return Err(not_found(folder_id));
		}

		ensure_parent(&tree, req.parent_id)?;

		if tree.is_within(req.parent_id, folder_id)? {
			return Err(Error::InvalidRequest {
				message: format!(
					"Folder {folder_id} cannot be moved under itself or a descendant."
				),
			});
		}

		ensure_unique_name(&tree, req.parent_id, name, Some(folder_id))?;

		let folder = Folder { id: folder_id, name: name.to_string(), parent_id: req.parent_id };

		self.catalog.update_folder(&folder).await
	}

	pub async fn delete_folder(&self, folder_id: i64) -> Result<()> {
		if folder_id == ROOT_FOLDER_ID {
			return Err(Error::InvalidRequest {
				message: "The root folder cannot be deleted.".to_string(),
			});
		}

		let tree = self.folder_tree().await?;

		if tree.get(folder_id).is_none() {
			return Err(not_found(folder_id));
		}
		if tree.children(folder_id).next().is_some() {
			return Err(Error::Conflict {
				message: format!("Folder {folder_id} still has subfolders."),
			});
		}
		if self.catalog.count_objects(folder_id).await? > 0 {
			return Err(Error::Conflict {
				message: format!("Folder {folder_id} still holds objects."),
			});
		}

		self.catalog.delete_folder(folder_id).await
	}

	pub async fn folder_contents(&self, folder_id: i64) -> Result<FolderContents> {
		let tree = self.folder_tree().await?;

		if !tree.contains(folder_id) {
			return Err(not_found(folder_id));
		}

		let subfolders = tree.children(folder_id).cloned().collect();
		let objects = self.catalog.objects_in_folder(folder_id).await?;

		Ok(FolderContents { folder_id, subfolders, objects })
	}
}

fn validate_name(raw: &str) -> Result<&str> {
	let name = raw.trim();

	if name.is_empty() {
		return Err(Error::InvalidRequest { message: "Folder name must be non-empty.".to_string() });
	}

	Ok(name)
}

fn ensure_parent(tree: &FolderTree, parent_id: i64) -> Result<()> {
	if tree.contains(parent_id) {
		Ok(())
	} else {
		Err(Error::InvalidRequest { message: format!("Parent folder {parent_id} does not exist.") })
	}
}

fn ensure_unique_name(
	tree: &FolderTree,
	parent_id: i64,
	name: &str,
	except: Option<i64>,
) -> Result<()> {
	let taken = tree
		.children(parent_id)
		.any(|sibling| sibling.name == name && Some(sibling.id) != except);

	if taken {
		return Err(Error::Conflict {
			message: format!("A folder named {name:?} already exists under folder {parent_id}."),
		});
	}

	Ok(())
}

fn not_found(folder_id: i64) -> Error {
	Error::NotFound { message: format!("Folder {folder_id} does not exist.") }
}
