use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::BuildOptions;
use crate::DeclarationSite;
use crate::naming::file_extension;

/// A project file offered to the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalFile {
	/// Absolute, lexically normalized path.
	pub path: PathBuf,
	/// UTF-8 text with any byte-order mark removed. `None` when the file is not
	/// valid UTF-8.
	pub text: Option<String>,
}

impl AdditionalFile {
	pub fn new(path: impl AsRef<Path>, text: Option<String>) -> Self {
		Self {
			path: normalize_path(path.as_ref()),
			text,
		}
	}

	/// Decode raw file bytes the way resources are decoded at runtime.
	pub fn from_bytes(path: impl AsRef<Path>, bytes: Vec<u8>) -> Self {
		let bytes = match bytes.strip_prefix(b"\xEF\xBB\xBF") {
			Some(rest) => rest.to_vec(),
			None => bytes,
		};

		Self::new(path, String::from_utf8(bytes).ok())
	}

	pub fn file_name(&self) -> &str {
		self.path
			.file_name()
			.and_then(|name| name.to_str())
			.unwrap_or_default()
	}
}

/// An additional file selected for a declaration site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCandidate {
	pub path: PathBuf,
	pub file_name: String,
	/// Identity the resource is embedded under.
	pub resource_name: String,
	pub text: Option<String>,
}

/// The folder a declaration site takes its resources from.
///
/// A configured path starting with `/` is relative to the crate root;
/// anything else is relative to the folder of the declaring source file.
pub fn resolve_search_path(site: &DeclarationSite, options: &BuildOptions) -> PathBuf {
	resolve_search_dir(site, &options.project_dir)
}

/// [`resolve_search_path`] with only the crate root at hand.
pub fn resolve_search_dir(site: &DeclarationSite, project_dir: &Path) -> PathBuf {
	let configured = site.attribute.path.as_str();

	let search_path = match configured.strip_prefix('/') {
		Some(rest) => project_dir.join(rest),
		None => {
			let declaring_dir = site
				.source_file
				.parent()
				.map_or_else(|| project_dir.to_path_buf(), Path::to_path_buf);
			declaring_dir.join(configured)
		}
	};

	normalize_path(&search_path)
}

/// The files in exactly `search_path` (not its subfolders) whose extension is
/// `extension`, compared case-sensitively, ordered by file name.
pub fn select_candidates(
	search_path: &Path,
	extension: &str,
	files: &[AdditionalFile],
	options: &BuildOptions,
) -> Vec<ResourceCandidate> {
	let mut candidates: Vec<ResourceCandidate> = files
		.iter()
		.filter(|file| file.path.parent() == Some(search_path))
		.filter(|file| file_extension(file.file_name()) == extension)
		.map(|file| {
			ResourceCandidate {
				path: file.path.clone(),
				file_name: file.file_name().to_string(),
				resource_name: embedded_resource_name(
					&file.path,
					&options.project_dir,
					&options.root_namespace,
				),
				text: file.text.clone(),
			}
		})
		.collect();

	candidates.sort_by(|a, b| {
		a.file_name
			.cmp(&b.file_name)
			.then_with(|| a.path.cmp(&b.path))
	});
	candidates
}

/// The identity a file is embedded under: the root namespace, a dot, then the
/// path relative to the crate root with separators replaced by dots.
///
/// ```
/// use std::path::Path;
///
/// use embedres_core::embedded_resource_name;
///
/// let name = embedded_resource_name(
/// 	Path::new("/work/demo/src/Queries/example.sql"),
/// 	Path::new("/work/demo"),
/// 	"demo",
/// );
/// assert_eq!(name, "demo.src.Queries.example.sql");
/// ```
pub fn embedded_resource_name(path: &Path, project_dir: &Path, root_namespace: &str) -> String {
	let path = normalize_path(path);
	let project_dir = normalize_path(project_dir);
	let relative = path.strip_prefix(&project_dir).unwrap_or(&path);

	let dotted = relative
		.components()
		.filter_map(|component| {
			match component {
				Component::Normal(part) => Some(part.to_string_lossy()),
				Component::Prefix(prefix) => Some(prefix.as_os_str().to_string_lossy()),
				Component::RootDir | Component::CurDir | Component::ParentDir => None,
			}
		})
		.collect::<Vec<_>>()
		.join(".");

	if root_namespace.is_empty() {
		dotted
	} else {
		format!("{root_namespace}.{dotted}")
	}
}

/// Fold `.` and `..` components without touching the file system.
pub fn normalize_path(path: &Path) -> PathBuf {
	let mut normalized = PathBuf::new();

	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				match normalized.components().next_back() {
					Some(Component::Normal(_)) => {
						normalized.pop();
					}
					Some(Component::RootDir | Component::Prefix(_)) => {}
					_ => normalized.push(".."),
				}
			}
			other => normalized.push(other.as_os_str()),
		}
	}

	normalized
}
