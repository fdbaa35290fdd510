use std::path::Path;
use std::path::PathBuf;

use crate::AdditionalFile;
use crate::BuildOptions;
use crate::DeclarationSite;
use crate::GeneratorInput;
use crate::SourceFile;
use crate::extract_declarations;

pub(crate) const PROJECT_DIR: &str = "/project";

pub(crate) fn options() -> BuildOptions {
	BuildOptions::new(PROJECT_DIR, "Demo")
}

pub(crate) fn project_path(relative: &str) -> PathBuf {
	Path::new(PROJECT_DIR).join(relative)
}

/// The first declaration site in `text`, read as `src/lib.rs`.
pub(crate) fn site(text: &str) -> DeclarationSite {
	extract_declarations(&project_path("src/lib.rs"), &[], text)
		.into_iter()
		.next()
		.expect("fixture declares a site")
}

pub(crate) fn source(relative: &str, module_path: &[&str], text: &str) -> SourceFile {
	SourceFile {
		path: project_path(relative),
		module_path: module_path.iter().map(ToString::to_string).collect(),
		text: text.to_string(),
	}
}

pub(crate) fn text_file(relative: &str, text: &str) -> AdditionalFile {
	AdditionalFile::new(project_path(relative), Some(text.to_string()))
}

pub(crate) const QUERIES_SOURCE: &str = r"
use embedres::embedded_resource_properties;

#[embedded_resource_properties]
pub struct Queries;
";

/// `Queries` at the crate root with two text resources.
pub(crate) fn queries_input() -> GeneratorInput {
	let mut input = GeneratorInput::new(options());
	input.sources = vec![source("src/lib.rs", &[], QUERIES_SOURCE)];
	input.additional_files = vec![
		text_file("src/Queries/example.txt", "Example text content"),
		text_file("src/Queries/second.txt", "Second"),
		text_file("src/Queries/ignored.sql", "SELECT 1;"),
	];
	input
}

/// Write `files` below a fresh temporary crate root.
pub(crate) fn temp_project(files: &[(&str, &str)]) -> tempfile::TempDir {
	let dir = tempfile::tempdir().expect("create temp dir");
	for (relative, content) in files {
		write_file(dir.path(), relative, content);
	}
	dir
}

pub(crate) fn write_file(root: &Path, relative: &str, content: &str) {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).expect("create parent dir");
	}
	std::fs::write(path, content).expect("write fixture file");
}
