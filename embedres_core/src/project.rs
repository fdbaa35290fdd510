use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::AdditionalFile;
use crate::EmbedresConfig;
use crate::EmbedresError;
use crate::EmbedresResult;
use crate::SourceFile;
use crate::extract_declarations;
use crate::module_path_for_source;
use crate::naming::file_extension;
use crate::normalize_path;
use crate::resolve_search_dir;

/// The files of a crate, ready to feed the generator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFiles {
	/// Absolute source roots, from `sources` in the config.
	pub source_roots: Vec<PathBuf>,
	/// Rust sources of the library or binary target, in path order.
	pub sources: Vec<SourceFile>,
	/// Files a declaration site can select, in path order.
	pub additional_files: Vec<AdditionalFile>,
	/// Files matching `[resources] embed`, or `None` when no embed patterns are
	/// configured.
	pub embedded_files: Option<Vec<PathBuf>>,
}

/// Collect the crate at `root`.
///
/// Files matched by `.gitignore` (unless `disable_gitignore` is set) or by
/// `[exclude] patterns` are skipped, as are hidden directories, `target` and
/// nested crates with their own `Cargo.toml`. Rust sources under the source
/// roots are always read. Other files are read only when a declaration site
/// in those sources can select them: they sit directly in its resource folder
/// and have its extension. Only those files count against `max_file_size`.
/// When `[resources] include` is set, resources must also match it.
#[tracing::instrument(skip(config), fields(root = %root.display()))]
pub fn collect_project(root: &Path, config: &EmbedresConfig) -> EmbedresResult<ProjectFiles> {
	let root = normalize_path(root);
	let paths = collect_files(&root, &config.exclude.patterns, config.disable_gitignore)?;
	let include_set = build_glob_set(&config.resources.include)?;
	let embed_set = build_glob_set(&config.resources.embed)?;

	let source_roots: Vec<PathBuf> = config
		.sources
		.iter()
		.map(|source| normalize_path(&root.join(source)))
		.collect();

	let mut project = ProjectFiles {
		source_roots,
		..ProjectFiles::default()
	};
	let mut embedded_files = Vec::new();
	let mut resource_paths = Vec::new();

	for path in paths {
		let relative = path.strip_prefix(&root).unwrap_or(&path).to_path_buf();

		if let Some(module_path) = source_module_path(&project.source_roots, &path) {
			match AdditionalFile::from_bytes(&path, std::fs::read(&path)?).text {
				Some(text) => {
					project.sources.push(SourceFile {
						path: path.clone(),
						module_path,
						text,
					});
				}
				None => tracing::warn!(path = %path.display(), "skipping source file that is not UTF-8"),
			}
		}

		if config.resources.include.is_empty() || include_set.is_match(&relative) {
			if !config.resources.embed.is_empty() && embed_set.is_match(&relative) {
				embedded_files.push(path.clone());
			}
			resource_paths.push(path);
		}
	}

	let folders = resource_folders(&root, &project.sources);
	let mut skipped = 0_usize;

	for path in resource_paths {
		if !is_selectable(&folders, &path) {
			skipped += 1;
			continue;
		}

		let metadata = std::fs::metadata(&path)?;
		if metadata.len() > config.max_file_size {
			return Err(EmbedresError::FileTooLarge {
				path: path.display().to_string(),
				size: metadata.len(),
				limit: config.max_file_size,
			});
		}

		project
			.additional_files
			.push(AdditionalFile::from_bytes(&path, std::fs::read(&path)?));
	}

	if !config.resources.embed.is_empty() {
		project.embedded_files = Some(embedded_files);
	}

	tracing::debug!(
		sources = project.sources.len(),
		files = project.additional_files.len(),
		skipped,
		"collected project files"
	);

	Ok(project)
}

/// Resource folders of every declaration site in `sources`, with the
/// extensions selected from each.
fn resource_folders(root: &Path, sources: &[SourceFile]) -> BTreeMap<PathBuf, BTreeSet<String>> {
	let mut folders: BTreeMap<PathBuf, BTreeSet<String>> = BTreeMap::new();

	for source in sources {
		for site in extract_declarations(&source.path, &source.module_path, &source.text) {
			folders
				.entry(resolve_search_dir(&site, root))
				.or_default()
				.insert(site.attribute.extension);
		}
	}

	folders
}

fn is_selectable(folders: &BTreeMap<PathBuf, BTreeSet<String>>, path: &Path) -> bool {
	let Some(extensions) = path.parent().and_then(|parent| folders.get(parent)) else {
		return false;
	};

	path.file_name()
		.and_then(|name| name.to_str())
		.is_some_and(|name| extensions.contains(file_extension(name)))
}

/// The module a file defines when it belongs to the crate's own target.
fn source_module_path(source_roots: &[PathBuf], path: &Path) -> Option<Vec<String>> {
	if path.extension().and_then(|ext| ext.to_str()) != Some("rs") {
		return None;
	}

	source_roots.iter().find_map(|source_root| {
		// `main.rs` next to `lib.rs` is a separate binary target.
		if path == source_root.join("main.rs") && source_root.join("lib.rs").is_file() {
			return None;
		}
		module_path_for_source(source_root, path)
	})
}

/// Build a `GlobSet` from glob patterns relative to the crate root.
fn build_glob_set(patterns: &[String]) -> EmbedresResult<GlobSet> {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		let glob = Glob::new(pattern).map_err(|e| {
			EmbedresError::InvalidPattern {
				pattern: pattern.clone(),
				reason: e.to_string(),
			}
		})?;
		builder.add(glob);
	}
	builder.build().map_err(|e| {
		EmbedresError::InvalidPattern {
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

/// Build a `Gitignore` matcher from `[exclude] patterns`. These follow
/// `.gitignore` syntax and are applied on top of any `.gitignore` rules.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> EmbedresResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			EmbedresError::InvalidPattern {
				pattern: pattern.clone(),
				reason: e.to_string(),
			}
		})?;
	}
	builder.build().map_err(|e| {
		EmbedresError::InvalidPattern {
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

/// Build a `Gitignore` matcher from the crate's `.gitignore` file (if any).
fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.exists() {
		if let Some(error) = builder.add(&gitignore_path) {
			tracing::warn!(%error, "ignoring unreadable .gitignore rules");
		}
	}
	builder.build().unwrap_or_else(|_| Gitignore::empty())
}

fn collect_files(
	root: &Path,
	exclude_patterns: &[String],
	disable_gitignore: bool,
) -> EmbedresResult<Vec<PathBuf>> {
	let mut files = Vec::new();
	let mut visited_dirs = HashSet::new();

	let gitignore = if disable_gitignore {
		Gitignore::empty()
	} else {
		build_gitignore(root)
	};
	let custom_exclude = build_exclude_matcher(root, exclude_patterns)?;

	walk_dir(
		root,
		&mut files,
		&gitignore,
		&custom_exclude,
		&mut visited_dirs,
	)?;
	files.sort();
	Ok(files)
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || name == "target"
}

fn has_own_manifest(dir: &Path) -> bool {
	dir.join("Cargo.toml").is_file()
}

fn walk_dir(
	dir: &Path,
	files: &mut Vec<PathBuf>,
	gitignore: &Gitignore,
	custom_exclude: &Gitignore,
	visited_dirs: &mut HashSet<PathBuf>,
) -> EmbedresResult<()> {
	if !dir.is_dir() {
		return Ok(());
	}

	let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
	if !visited_dirs.insert(canonical) {
		return Err(EmbedresError::SymlinkCycle {
			path: dir.display().to_string(),
		});
	}

	for entry in std::fs::read_dir(dir)? {
		let path = entry?.path();
		let is_dir = path.is_dir();

		if is_dir
			&& path
				.file_name()
				.and_then(|name| name.to_str())
				.is_some_and(is_ignored_directory_name)
		{
			continue;
		}

		if gitignore.matched(&path, is_dir).is_ignore() {
			continue;
		}

		if custom_exclude.matched(&path, is_dir).is_ignore() {
			continue;
		}

		if is_dir {
			if has_own_manifest(&path) {
				continue;
			}
			walk_dir(&path, files, gitignore, custom_exclude, visited_dirs)?;
		} else if path.is_file() {
			files.push(normalize_path(&path));
		}
	}

	Ok(())
}
