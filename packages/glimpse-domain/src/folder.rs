use std::{
	collections::{HashMap, HashSet},
	fmt::Write,
};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const ROOT_FOLDER_ID: i64 = 0;
pub const ROOT_FOLDER_NAME: &str = "Root";

const TREE_HEADER: &str = "Folder structure:";
const INDENT: &str = "  ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
	pub id: i64,
	pub name: String,
	pub parent_id: i64,
}

/// Snapshot of the folder forest, ordered by `(parent_id, id)`.
#[derive(Debug, Clone, Default)]
pub struct FolderTree {
	folders: Vec<Folder>,
	positions: HashMap<i64, usize>,
}
impl FolderTree {
	pub fn new(mut folders: Vec<Folder>) -> Self {
		folders.sort_by_key(|folder| (folder.parent_id, folder.id));

		let positions =
			folders.iter().enumerate().map(|(position, folder)| (folder.id, position)).collect();

		Self { folders, positions }
	}

	pub fn folders(&self) -> &[Folder] {
		&self.folders
	}

	pub fn into_folders(self) -> Vec<Folder> {
		self.folders
	}

	pub fn get(&self, folder_id: i64) -> Option<&Folder> {
		self.positions.get(&folder_id).map(|position| &self.folders[*position])
	}

	pub fn contains(&self, folder_id: i64) -> bool {
		folder_id == ROOT_FOLDER_ID || self.positions.contains_key(&folder_id)
	}

	/// Distance from `folder_id` to the root.
	///
	/// Unknown ids and dangling parent links end the walk without error. A parent chain that
	/// revisits a folder yields [`Error::CorruptHierarchy`].
	pub fn depth(&self, folder_id: i64) -> Result<usize> {
		let mut depth = 0;
		let mut visited = HashSet::new();
		let mut current = folder_id;

		while current != ROOT_FOLDER_ID {
			let Some(folder) = self.get(current) else {
				break;
			};

			if !visited.insert(current) {
				return Err(Error::CorruptHierarchy { folder_id: current });
			}

			depth += 1;
			current = folder.parent_id;
		}

		Ok(depth)
	}

	/// True when `ancestor_id` appears on the parent chain of `folder_id`, or they are equal.
	pub fn is_within(&self, folder_id: i64, ancestor_id: i64) -> Result<bool> {
		let mut visited = HashSet::new();
		let mut current = folder_id;

		loop {
			if current == ancestor_id {
				return Ok(true);
			}
			if current == ROOT_FOLDER_ID {
				return Ok(false);
			}

			let Some(folder) = self.get(current) else {
				return Ok(false);
			};

			if !visited.insert(current) {
				return Err(Error::CorruptHierarchy { folder_id: current });
			}

			current = folder.parent_id;
		}
	}

	pub fn children(&self, parent_id: i64) -> impl Iterator<Item = &Folder> {
		self.folders
			.iter()
			.filter(move |folder| folder.parent_id == parent_id && folder.id != parent_id)
	}

	/// Indented text form of the hierarchy, fed verbatim to the classification model.
	///
	/// Folders are written depth-first from the root with children in id order. Subtrees hanging
	/// off a missing parent follow, each at its computed depth.
	pub fn render(&self) -> Result<String> {
		let mut depths = HashMap::with_capacity(self.folders.len());

		for folder in &self.folders {
			depths.insert(folder.id, self.depth(folder.id)?);
		}

		let mut out = String::new();
		let mut emitted = HashSet::new();

		out.push_str(TREE_HEADER);
		out.push('\n');

		let mut tops = Vec::new();

		if self.positions.contains_key(&ROOT_FOLDER_ID) {
			tops.push(ROOT_FOLDER_ID);
		}

		tops.extend(
			self.folders
				.iter()
				.filter(|folder| {
					folder.id != ROOT_FOLDER_ID && !self.positions.contains_key(&folder.parent_id)
				})
				.map(|folder| folder.id),
		);

		for top in tops {
			let mut stack = vec![top];

			while let Some(folder_id) = stack.pop() {
				if !emitted.insert(folder_id) {
					continue;
				}

				let Some(folder) = self.get(folder_id) else {
					continue;
				};
				let depth = depths.get(&folder_id).copied().unwrap_or_default();

				let _ = writeln!(
					out,
					"{}- {} (ID: {})",
					INDENT.repeat(depth),
					folder.name,
					folder.id
				);

				let mut children =
					self.children(folder_id).map(|child| child.id).collect::<Vec<_>>();

				children.sort_unstable();

				stack.extend(children.into_iter().rev());
			}
		}

		Ok(out)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn folder(id: i64, name: &str, parent_id: i64) -> Folder {
		Folder { id, name: name.to_string(), parent_id }
	}

	fn sample_tree() -> FolderTree {
		FolderTree::new(vec![
			folder(3, "LeetCode", 1),
			folder(0, ROOT_FOLDER_NAME, 0),
			folder(2, "Recipes", 0),
			folder(1, "Algorithms", 0),
			folder(4, "Luogu", 1),
		])
	}

	#[test]
	fn folders_are_sorted_by_parent_then_id() {
		let tree = sample_tree();
		let order = tree.folders().iter().map(|folder| folder.id).collect::<Vec<_>>();

		assert_eq!(order, vec![0, 1, 2, 3, 4]);
	}

	#[test]
	fn depth_follows_parent_links() {
		let tree = FolderTree::new(vec![
			folder(0, ROOT_FOLDER_NAME, 0),
			folder(1, "A", 0),
			folder(2, "B", 1),
		]);

		assert_eq!(tree.depth(0), Ok(0));
		assert_eq!(tree.depth(1), Ok(1));
		assert_eq!(tree.depth(2), Ok(2));
	}

	#[test]
	fn unknown_folder_has_zero_depth() {
		assert_eq!(sample_tree().depth(99), Ok(0));
	}

	#[test]
	fn dangling_parent_ends_the_walk() {
		let tree = FolderTree::new(vec![folder(5, "Orphan", 42), folder(6, "Child", 5)]);

		assert_eq!(tree.depth(5), Ok(1));
		assert_eq!(tree.depth(6), Ok(2));
	}

	#[test]
	fn cycles_are_reported_instead_of_looping() {
		let tree = FolderTree::new(vec![
			folder(0, ROOT_FOLDER_NAME, 0),
			folder(1, "A", 2),
			folder(2, "B", 1),
		]);

		assert!(matches!(tree.depth(1), Err(Error::CorruptHierarchy { .. })));
		assert!(matches!(tree.render(), Err(Error::CorruptHierarchy { .. })));
	}

	#[test]
	fn render_writes_depth_first_with_indentation() {
		let rendered = sample_tree().render().expect("render failed");

		assert_eq!(
			rendered,
			"Folder structure:\n\
			 - Root (ID: 0)\n\
			 \x20\x20- Algorithms (ID: 1)\n\
			 \x20\x20\x20\x20- LeetCode (ID: 3)\n\
			 \x20\x20\x20\x20- Luogu (ID: 4)\n\
			 \x20\x20- Recipes (ID: 2)\n"
		);
	}

	#[test]
	fn render_appends_detached_subtrees() {
		let tree = FolderTree::new(vec![
			folder(0, ROOT_FOLDER_NAME, 0),
			folder(7, "Detached", 40),
			folder(8, "Leaf", 7),
		]);
		let rendered = tree.render().expect("render failed");

		assert_eq!(
			rendered,
			"Folder structure:\n- Root (ID: 0)\n  - Detached (ID: 7)\n    - Leaf (ID: 8)\n"
		);
	}

	#[test]
	fn is_within_detects_descendants() {
		let tree = sample_tree();

		assert_eq!(tree.is_within(3, 1), Ok(true));
		assert_eq!(tree.is_within(1, 1), Ok(true));
		assert_eq!(tree.is_within(2, 1), Ok(false));
		assert_eq!(tree.is_within(4, ROOT_FOLDER_ID), Ok(true));
	}
}
