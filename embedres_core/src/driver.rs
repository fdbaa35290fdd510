use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use serde::Deserialize;
use serde::Serialize;

use crate::AdditionalFile;
use crate::BuildOptions;
use crate::DeclarationSite;
use crate::EmbedresError;
use crate::EmbedresResult;
use crate::ResourceCandidate;
use crate::declaration::extract_declarations;
use crate::emit;
use crate::embedded_resource_name;
use crate::naming::hint_name;
use crate::naming::property_name;
use crate::resolve_search_path;
use crate::select_candidates;

/// Names under which step outputs are reported in [`RunResult::tracked_steps`].
pub mod tracking_names {
	pub const INITIAL_EXTRACTION: &str = "InitialExtraction";
	pub const COMBINE: &str = "Combine";
	pub const SOURCE_OUTPUT: &str = "SourceOutput";
	pub const MANIFEST: &str = "Manifest";
}

/// Why a step output has its current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepRunReason {
	/// No previous output under this key.
	New,
	/// Recomputed and equal to the previous output.
	Unchanged,
	/// Recomputed and different from the previous output.
	Modified,
	/// Input equal to the previous run; the previous output was reused.
	Cached,
	/// Produced by the previous run but not by this one.
	Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedOutput {
	pub key: String,
	pub reason: StepRunReason,
}

/// Shared flag for abandoning a run. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
	cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cancel(&self) {
		self.cancelled.store(true, Ordering::SeqCst);
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancelled.load(Ordering::SeqCst)
	}

	/// Fail with [`EmbedresError::Cancelled`] once cancelled.
	pub fn check(&self) -> EmbedresResult<()> {
		if self.is_cancelled() {
			return Err(EmbedresError::Cancelled);
		}
		Ok(())
	}
}

/// A Rust source file of the crate being built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
	pub path: PathBuf,
	/// Module the file defines; see
	/// [`module_path_for_source`](crate::module_path_for_source).
	pub module_path: Vec<String>,
	pub text: String,
}

/// Everything one generation pass reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorInput {
	pub options: BuildOptions,
	pub sources: Vec<SourceFile>,
	pub additional_files: Vec<AdditionalFile>,
	/// Files compiled into the binary. `None` embeds every file selected by a
	/// declaration site.
	pub embedded_files: Option<Vec<PathBuf>>,
}

impl GeneratorInput {
	pub fn new(options: BuildOptions) -> Self {
		Self {
			options,
			sources: Vec::new(),
			additional_files: Vec::new(),
			embedded_files: None,
		}
	}
}

/// One accessor to generate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPropertyDescriptor {
	pub property_name: String,
	pub candidate: ResourceCandidate,
}

/// A declaration site joined with its resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationUnit {
	pub site: DeclarationSite,
	pub search_path: PathBuf,
	/// `search_path` as shown in documentation, relative to the crate root.
	pub search_folder: String,
	pub properties: Vec<GeneratedPropertyDescriptor>,
	pub is_design_time_build: bool,
}

/// A file embedded into the crate's manifest.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ManifestEntry {
	pub resource_name: String,
	pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSource {
	/// File name of the artifact below `OUT_DIR/embedres`.
	pub hint_name: String,
	pub source: String,
}

/// Problems worth reporting that do not stop generation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GeneratorDiagnostic {
	/// Several files of one site map to the same accessor name. The generated
	/// `impl` block then fails to compile.
	DuplicatePropertyName {
		type_display: String,
		property_name: String,
		file_names: Vec<String>,
	},
	/// The type is private to a submodule, so the generated `impl` block at the
	/// crate root cannot name it.
	UnreachableType { type_display: String },
	/// An accessor's file is not valid UTF-8 and fails to read at runtime.
	InvalidUtf8Resource { type_display: String, file_name: String },
	/// An accessor's file is left out of the `[resources] embed` set and fails
	/// to read at runtime.
	ResourceNotEmbedded {
		type_display: String,
		resource_name: String,
	},
}

impl GeneratorDiagnostic {
	pub fn message(&self) -> String {
		match self {
			Self::DuplicatePropertyName {
				type_display,
				property_name,
				file_names,
			} => {
				format!(
					"`{type_display}`: files {} all produce the accessor `{property_name}`",
					file_names
						.iter()
						.map(|name| format!("`{name}`"))
						.collect::<Vec<_>>()
						.join(", ")
				)
			}
			Self::UnreachableType { type_display } => {
				format!(
					"`{type_display}` is private to its module; mark it `pub(crate)` so the generated \
					 accessors can extend it"
				)
			}
			Self::InvalidUtf8Resource {
				type_display,
				file_name,
			} => format!("`{type_display}`: resource `{file_name}` is not valid UTF-8"),
			Self::ResourceNotEmbedded {
				type_display,
				resource_name,
			} => {
				format!(
					"`{type_display}`: resource `{resource_name}` is not in the `[resources] embed` set"
				)
			}
		}
	}
}

/// Output of one generation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
	/// Site artifacts ordered by hint name, then the manifest and the index.
	pub sources: Vec<GeneratedSource>,
	pub diagnostics: Vec<GeneratorDiagnostic>,
	/// Step outputs by tracking name, ordered by key.
	pub tracked_steps: BTreeMap<&'static str, Vec<TrackedOutput>>,
	/// Every resolved search path, for rebuild tracking.
	pub search_paths: Vec<PathBuf>,
	/// Every embedded file, for rebuild tracking.
	pub embedded_files: Vec<PathBuf>,
}

impl RunResult {
	pub fn source(&self, hint_name: &str) -> Option<&GeneratedSource> {
		self.sources
			.iter()
			.find(|source| source.hint_name == hint_name)
	}

	/// Run reasons reported for one step.
	pub fn reasons(&self, step: &str) -> Vec<StepRunReason> {
		self.tracked_steps
			.get(step)
			.map(|outputs| outputs.iter().map(|output| output.reason).collect())
			.unwrap_or_default()
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEntry<I, O> {
	pub input: I,
	pub output: O,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombineInput {
	pub site: DeclarationSite,
	pub options: BuildOptions,
	/// Only the files in the site's search path.
	pub files: Vec<AdditionalFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestInput {
	pub entries: Vec<ManifestEntry>,
	pub project_dir: PathBuf,
	pub hint_names: Vec<String>,
}

/// Every step's last inputs and outputs, keyed per item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverState {
	pub extraction: BTreeMap<String, StepEntry<SourceFile, Vec<DeclarationSite>>>,
	pub combine: BTreeMap<String, StepEntry<CombineInput, GenerationUnit>>,
	/// Keyed by artifact file name.
	pub source_output: BTreeMap<String, StepEntry<GenerationUnit, String>>,
	pub manifest: BTreeMap<String, StepEntry<ManifestInput, Vec<GeneratedSource>>>,
}

/// Incremental generator. Keeps the state of the last successful run so the
/// next run only recomputes what changed.
#[derive(Debug, Clone, Default)]
pub struct GeneratorDriver {
	state: DriverState,
}

impl GeneratorDriver {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_state(state: DriverState) -> Self {
		Self { state }
	}

	pub fn state(&self) -> &DriverState {
		&self.state
	}

	pub fn into_state(self) -> DriverState {
		self.state
	}

	/// Run one generation pass.
	///
	/// On error, including cancellation, the driver keeps the state of the
	/// previous successful run.
	#[tracing::instrument(skip_all, fields(sources = input.sources.len(), files = input.additional_files.len()))]
	pub fn run(
		&mut self,
		input: &GeneratorInput,
		token: &CancellationToken,
	) -> EmbedresResult<RunResult> {
		let options = &input.options;
		let mut tracked_steps = BTreeMap::new();

		// InitialExtraction
		let items = input
			.sources
			.iter()
			.map(|source| (source_key(&source.path), source.clone()))
			.collect();
		let extraction = run_step(
			tracking_names::INITIAL_EXTRACTION,
			items,
			&self.state.extraction,
			token,
			&mut tracked_steps,
			|source: &SourceFile| {
				Ok(extract_declarations(
					&source.path,
					&source.module_path,
					&source.text,
				))
			},
		)?;

		// Combine
		let files_by_dir = files_by_parent(&input.additional_files);
		let mut search_paths = BTreeSet::new();
		let mut combine_keys = BTreeSet::new();
		let mut items = Vec::new();
		for entry in extraction.values() {
			for site in &entry.output {
				let search_path = resolve_search_path(site, options);
				let files = files_by_dir.get(&search_path).cloned().unwrap_or_default();
				let base = combine_key(site);
				items.push((
					claim_key(&mut combine_keys, &base, |count| format!("{base}#{count}")),
					CombineInput {
						site: site.clone(),
						options: options.clone(),
						files,
					},
				));
				search_paths.insert(search_path);
			}
		}
		let combine = run_step(
			tracking_names::COMBINE,
			items,
			&self.state.combine,
			token,
			&mut tracked_steps,
			|input: &CombineInput| Ok(combine_site(input)),
		)?;

		// SourceOutput
		let mut artifact_names = BTreeSet::new();
		let items = combine
			.values()
			.map(|entry| {
				let base = hint_name(&entry.output.site.display_string());
				let stem = base.strip_suffix(".g.rs").unwrap_or(&base).to_string();
				let key = claim_key(&mut artifact_names, &base, |count| format!("{stem}.{count}.g.rs"));
				(key, entry.output.clone())
			})
			.collect();
		let source_output = run_step(
			tracking_names::SOURCE_OUTPUT,
			items,
			&self.state.source_output,
			token,
			&mut tracked_steps,
			|unit: &GenerationUnit| emit::render_site(unit),
		)?;

		// Manifest
		let entries = embedded_entries(input, combine.values().map(|entry| &entry.output));
		let hint_names: Vec<String> = source_output.keys().cloned().collect();
		let manifest_input = ManifestInput {
			entries: entries.clone(),
			project_dir: options.project_dir.clone(),
			hint_names,
		};
		let manifest = run_step(
			tracking_names::MANIFEST,
			vec![(tracking_names::MANIFEST.to_string(), manifest_input)],
			&self.state.manifest,
			token,
			&mut tracked_steps,
			|input: &ManifestInput| {
				Ok(vec![
					GeneratedSource {
						hint_name: emit::MANIFEST_HINT_NAME.to_string(),
						source: emit::render_manifest(&input.entries, &input.project_dir)?,
					},
					GeneratedSource {
						hint_name: emit::INDEX_HINT_NAME.to_string(),
						source: emit::render_index(input.hint_names.iter().map(String::as_str))?,
					},
				])
			},
		)?;

		let diagnostics = collect_diagnostics(combine.values().map(|entry| &entry.output), &entries);
		for diagnostic in &diagnostics {
			tracing::warn!("{}", diagnostic.message());
		}

		let mut sources: Vec<GeneratedSource> = source_output
			.iter()
			.map(|(name, entry)| {
				GeneratedSource {
					hint_name: name.clone(),
					source: entry.output.clone(),
				}
			})
			.collect();
		for entry in manifest.values() {
			sources.extend(entry.output.iter().cloned());
		}

		self.state = DriverState {
			extraction,
			combine,
			source_output,
			manifest,
		};

		Ok(RunResult {
			sources,
			diagnostics,
			tracked_steps,
			search_paths: search_paths.into_iter().collect(),
			embedded_files: entries.into_iter().map(|entry| entry.path).collect(),
		})
	}
}

/// Run one step over `items`, reusing `previous` outputs whose input is
/// unchanged.
fn run_step<I, O>(
	step: &'static str,
	items: Vec<(String, I)>,
	previous: &BTreeMap<String, StepEntry<I, O>>,
	token: &CancellationToken,
	tracked_steps: &mut BTreeMap<&'static str, Vec<TrackedOutput>>,
	compute: impl Fn(&I) -> EmbedresResult<O>,
) -> EmbedresResult<BTreeMap<String, StepEntry<I, O>>>
where
	I: Clone + PartialEq,
	O: Clone + PartialEq,
{
	let mut current = BTreeMap::new();
	let mut reasons = BTreeMap::new();

	for (key, input) in items {
		token.check()?;

		let previous_entry = previous.get(&key);
		let (output, reason) = match previous_entry {
			Some(entry) if entry.input == input => (entry.output.clone(), StepRunReason::Cached),
			Some(entry) => {
				let output = compute(&input)?;
				let reason = if output == entry.output {
					StepRunReason::Unchanged
				} else {
					StepRunReason::Modified
				};
				(output, reason)
			}
			None => (compute(&input)?, StepRunReason::New),
		};

		reasons.insert(key.clone(), reason);
		current.insert(key, StepEntry { input, output });
	}

	for key in previous.keys() {
		if !current.contains_key(key) {
			reasons.insert(key.clone(), StepRunReason::Removed);
		}
	}

	tracing::debug!(step, ?reasons, "step finished");

	tracked_steps.insert(
		step,
		reasons
			.into_iter()
			.map(|(key, reason)| TrackedOutput { key, reason })
			.collect(),
	);

	Ok(current)
}

/// Source file, display name and cfg of a site.
fn combine_key(site: &DeclarationSite) -> String {
	format!(
		"{}#{}{}",
		source_key(&site.source_file),
		site.display_string(),
		site.cfg_attributes().concat()
	)
}

/// `base`, or the first `numbered(2..)` not yet in `taken`. Sites that share
/// a name, such as cfg alternatives of one type, keep separate outputs.
fn claim_key(taken: &mut BTreeSet<String>, base: &str, numbered: impl Fn(usize) -> String) -> String {
	let mut key = base.to_string();
	let mut count = 2;
	while !taken.insert(key.clone()) {
		key = numbered(count);
		count += 1;
	}
	key
}

fn source_key(path: &Path) -> String {
	path.to_string_lossy().replace('\\', "/")
}

fn files_by_parent(files: &[AdditionalFile]) -> BTreeMap<PathBuf, Vec<AdditionalFile>> {
	let mut by_parent: BTreeMap<PathBuf, Vec<AdditionalFile>> = BTreeMap::new();
	for file in files {
		if let Some(parent) = file.path.parent() {
			by_parent
				.entry(parent.to_path_buf())
				.or_default()
				.push(file.clone());
		}
	}
	by_parent
}

fn combine_site(input: &CombineInput) -> GenerationUnit {
	let site = &input.site;
	let search_path = resolve_search_path(site, &input.options);
	let candidates = select_candidates(
		&search_path,
		&site.attribute.extension,
		&input.files,
		&input.options,
	);

	let properties = candidates
		.into_iter()
		.map(|candidate| {
			GeneratedPropertyDescriptor {
				property_name: property_name(&candidate.file_name, &site.name),
				candidate,
			}
		})
		.collect();

	GenerationUnit {
		search_folder: search_folder(&search_path, &input.options.project_dir),
		site: site.clone(),
		search_path,
		properties,
		is_design_time_build: input.options.is_design_time_build,
	}
}

fn search_folder(search_path: &Path, project_dir: &Path) -> String {
	match search_path.strip_prefix(project_dir) {
		Ok(relative) if relative.as_os_str().is_empty() => ".".to_string(),
		Ok(relative) => source_key(relative),
		Err(_) => source_key(search_path),
	}
}

/// The explicit embed set when configured, otherwise every selected file.
/// Sorted by resource name.
fn embedded_entries<'a>(
	input: &GeneratorInput,
	units: impl Iterator<Item = &'a GenerationUnit>,
) -> Vec<ManifestEntry> {
	let options = &input.options;
	let entries: BTreeSet<ManifestEntry> = match &input.embedded_files {
		Some(paths) => {
			paths
				.iter()
				.map(|path| {
					ManifestEntry {
						resource_name: embedded_resource_name(
							path,
							&options.project_dir,
							&options.root_namespace,
						),
						path: path.clone(),
					}
				})
				.collect()
		}
		None => {
			units
				.flat_map(|unit| &unit.properties)
				.map(|property| {
					ManifestEntry {
						resource_name: property.candidate.resource_name.clone(),
						path: property.candidate.path.clone(),
					}
				})
				.collect()
		}
	};

	let mut entries: Vec<ManifestEntry> = entries.into_iter().collect();
	entries.dedup_by(|a, b| a.resource_name == b.resource_name);
	entries
}

fn collect_diagnostics<'a>(
	units: impl Iterator<Item = &'a GenerationUnit>,
	embedded: &[ManifestEntry],
) -> Vec<GeneratorDiagnostic> {
	let embedded: BTreeSet<&str> = embedded
		.iter()
		.map(|entry| entry.resource_name.as_str())
		.collect();
	let mut diagnostics = Vec::new();

	for unit in units {
		let type_display = unit.site.display_string();

		if !unit.site.is_reachable_from_crate_root() {
			diagnostics.push(GeneratorDiagnostic::UnreachableType {
				type_display: type_display.clone(),
			});
		}

		let mut by_name: BTreeMap<&str, Vec<String>> = BTreeMap::new();
		for property in &unit.properties {
			by_name
				.entry(property.property_name.as_str())
				.or_default()
				.push(property.candidate.file_name.clone());

			if property.candidate.text.is_none() {
				diagnostics.push(GeneratorDiagnostic::InvalidUtf8Resource {
					type_display: type_display.clone(),
					file_name: property.candidate.file_name.clone(),
				});
			}

			if !embedded.contains(property.candidate.resource_name.as_str()) {
				diagnostics.push(GeneratorDiagnostic::ResourceNotEmbedded {
					type_display: type_display.clone(),
					resource_name: property.candidate.resource_name.clone(),
				});
			}
		}

		for (property_name, file_names) in by_name {
			if file_names.len() > 1 {
				diagnostics.push(GeneratorDiagnostic::DuplicatePropertyName {
					type_display: type_display.clone(),
					property_name: property_name.to_string(),
					file_names,
				});
			}
		}
	}

	diagnostics
}
