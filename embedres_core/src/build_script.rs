//! Entry point for a crate's `build.rs`.
//!
//! ```rust,ignore
//! // build.rs
//! fn main() -> miette::Result<()> {
//! 	embedres_core::build_script::generate()?;
//! 	Ok(())
//! }
//! ```
//!
//! ```rust,ignore
//! // src/lib.rs
//! embedres::include_generated!();
//! ```

use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;

use crate::BuildOptions;
use crate::CancellationToken;
use crate::EmbedresConfig;
use crate::EmbedresError;
use crate::EmbedresResult;
use crate::GeneratorDriver;
use crate::GeneratorInput;
use crate::RunResult;
use crate::collect_project;
use crate::emit::ARTIFACT_DIR;
use crate::index_cache;
use crate::options::TRACKED_ENV_VARS;

const ARTIFACT_SUFFIX: &str = ".g.rs";

/// What a generation pass did on disk.
#[derive(Debug, Clone)]
pub struct GenerationReport {
	pub artifact_dir: PathBuf,
	/// Artifacts whose content changed.
	pub written: Vec<PathBuf>,
	/// Artifacts of earlier passes that are no longer produced.
	pub removed: Vec<PathBuf>,
	/// Paths whose changes must rerun the build script.
	pub rerun_paths: Vec<PathBuf>,
	pub run: RunResult,
}

/// Generate the accessors for the crate being built and print the Cargo
/// directives. Call this from `build.rs`.
pub fn generate() -> EmbedresResult<GenerationReport> {
	let options = BuildOptions::from_env()?;
	let out_dir = std::env::var_os("OUT_DIR")
		.map(PathBuf::from)
		.ok_or_else(|| EmbedresError::MissingEnv("OUT_DIR".to_string()))?;

	let report = generate_into(options, &out_dir.join(ARTIFACT_DIR), &CancellationToken::new())?;

	for path in &report.rerun_paths {
		println!("cargo:rerun-if-changed={}", path.display());
	}
	for name in TRACKED_ENV_VARS {
		println!("cargo:rerun-if-env-changed={name}");
	}
	for diagnostic in &report.run.diagnostics {
		println!("cargo:warning=embedres: {}", diagnostic.message());
	}

	Ok(report)
}

/// Generate every artifact for the crate at `options.project_dir` into
/// `artifact_dir`.
///
/// Only artifacts whose content changed are rewritten. Nothing is written when
/// the pass fails or `token` is cancelled before the write phase.
#[tracing::instrument(skip(options, token), fields(project = %options.project_dir.display()))]
pub fn generate_into(
	options: BuildOptions,
	artifact_dir: &Path,
	token: &CancellationToken,
) -> EmbedresResult<GenerationReport> {
	let config_path = EmbedresConfig::resolve_path(&options.project_dir);
	let config = EmbedresConfig::load(&options.project_dir)?.unwrap_or_default();
	let options = options.with_config(&config);

	let project = collect_project(&options.project_dir, &config)?;
	token.check()?;

	let cache_key = index_cache::build_cache_key(&options);
	let state = index_cache::load(artifact_dir, &cache_key).unwrap_or_default();
	let mut driver = GeneratorDriver::with_state(state);

	let mut rerun_paths: BTreeSet<PathBuf> = project.source_roots.iter().cloned().collect();
	rerun_paths.extend(config_path);
	let gitignore_path = options.project_dir.join(".gitignore");
	if !config.disable_gitignore && gitignore_path.is_file() {
		rerun_paths.insert(gitignore_path);
	}

	let input = GeneratorInput {
		options,
		sources: project.sources,
		additional_files: project.additional_files,
		embedded_files: project.embedded_files,
	};
	let run = driver.run(&input, token)?;
	token.check()?;

	rerun_paths.extend(run.search_paths.iter().cloned());
	rerun_paths.extend(run.embedded_files.iter().cloned());
	rerun_paths.retain(|path| path.exists());

	std::fs::create_dir_all(artifact_dir)?;
	let mut written = Vec::new();
	let mut produced = BTreeSet::new();

	for source in &run.sources {
		let path = artifact_dir.join(&source.hint_name);
		produced.insert(source.hint_name.clone());

		let unchanged = std::fs::read(&path).is_ok_and(|existing| existing == source.source.as_bytes());
		if unchanged {
			continue;
		}

		index_cache::write_atomic(&path, source.source.as_bytes())?;
		tracing::debug!(artifact = %source.hint_name, "wrote artifact");
		written.push(path);
	}

	let removed = remove_stale_artifacts(artifact_dir, &produced)?;
	index_cache::save(
		artifact_dir,
		&index_cache::GenerationCache::new(cache_key, driver.into_state()),
	);

	tracing::info!(
		written = written.len(),
		removed = removed.len(),
		artifacts = run.sources.len(),
		"embedres generation finished"
	);

	Ok(GenerationReport {
		artifact_dir: artifact_dir.to_path_buf(),
		written,
		removed,
		rerun_paths: rerun_paths.into_iter().collect(),
		run,
	})
}

fn remove_stale_artifacts(
	artifact_dir: &Path,
	produced: &BTreeSet<String>,
) -> EmbedresResult<Vec<PathBuf>> {
	let mut removed = Vec::new();

	for entry in std::fs::read_dir(artifact_dir)? {
		let path = entry?.path();
		let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
			continue;
		};

		if name.ends_with(ARTIFACT_SUFFIX) && !produced.contains(name) && path.is_file() {
			std::fs::remove_file(&path)?;
			tracing::debug!(artifact = name, "removed stale artifact");
			removed.push(path);
		}
	}

	removed.sort();
	Ok(removed)
}
