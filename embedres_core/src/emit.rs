use std::path::Path;

use minijinja::Environment;
use serde::Serialize;

use crate::EmbedresError;
use crate::EmbedresResult;
use crate::GenerationUnit;
use crate::ManifestEntry;
use crate::templates;

/// Directory below `OUT_DIR` holding every artifact.
pub const ARTIFACT_DIR: &str = "embedres";
/// Artifact declaring the crate's resource manifest.
pub const MANIFEST_HINT_NAME: &str = "_embedded_resource_reader.g.rs";
/// Artifact including every other artifact; see `embedres::include_generated!`.
pub const INDEX_HINT_NAME: &str = "embedded_resources.g.rs";

const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize)]
struct SiteContext<'a> {
	version: &'a str,
	summary: Vec<String>,
	cfg_attributes: Vec<String>,
	impl_generics: &'a str,
	self_type: String,
	where_clause: &'a str,
	before_read: String,
	after_read: String,
	visibility: &'a str,
	properties: Vec<PropertyContext>,
}

#[derive(Serialize)]
struct PropertyContext {
	name: String,
	name_literal: String,
	resource_name: String,
	doc: Vec<String>,
}

#[derive(Serialize)]
struct ManifestContext<'a> {
	version: &'a str,
	resource_count: usize,
	resources: Vec<ManifestResourceContext>,
}

#[derive(Serialize)]
struct ManifestResourceContext {
	name: String,
	source: String,
}

#[derive(Serialize)]
struct IndexContext<'a> {
	version: &'a str,
	artifacts: Vec<String>,
}

/// Render the `impl` block for one declaration site.
pub fn render_site(unit: &GenerationUnit) -> EmbedresResult<String> {
	let site = &unit.site;
	let properties = unit
		.properties
		.iter()
		.map(|property| {
			PropertyContext {
				name: property.property_name.clone(),
				name_literal: string_literal(&property.property_name),
				resource_name: string_literal(&property.candidate.resource_name),
				doc: doc_lines(&property_doc(
					&property.candidate.file_name,
					&property.candidate.resource_name,
					property
						.candidate
						.text
						.as_deref()
						.filter(|_| !unit.is_design_time_build),
				)),
			}
		})
		.collect();

	let context = SiteContext {
		version: GENERATOR_VERSION,
		summary: doc_lines(&site_summary(unit)),
		cfg_attributes: site.cfg_attributes(),
		impl_generics: &site.impl_generics,
		self_type: site.self_type(),
		where_clause: &site.where_clause,
		before_read: hook_value(site.attribute.before_read.as_deref(), "BeforeRead"),
		after_read: hook_value(site.attribute.after_read.as_deref(), "AfterRead"),
		visibility: site.accessor_visibility(),
		properties,
	};

	render(templates::SITE_TEMPLATE_NAME, &context)
}

/// Render the module holding the manifest of every embedded resource.
pub fn render_manifest(entries: &[ManifestEntry], project_dir: &Path) -> EmbedresResult<String> {
	let resources: Vec<_> = entries
		.iter()
		.map(|entry| {
			ManifestResourceContext {
				name: string_literal(&entry.resource_name),
				source: include_source(&entry.path, project_dir),
			}
		})
		.collect();

	let context = ManifestContext {
		version: GENERATOR_VERSION,
		resource_count: resources.len(),
		resources,
	};

	render(templates::MANIFEST_TEMPLATE_NAME, &context)
}

/// Render the index including the manifest and every site artifact.
pub fn render_index<'a>(hint_names: impl IntoIterator<Item = &'a str>) -> EmbedresResult<String> {
	let artifacts = std::iter::once::<&'a str>(MANIFEST_HINT_NAME)
		.chain(hint_names)
		.map(|hint_name| string_literal(&format!("/{ARTIFACT_DIR}/{hint_name}")))
		.collect();

	let context = IndexContext {
		version: GENERATOR_VERSION,
		artifacts,
	};

	render(templates::INDEX_TEMPLATE_NAME, &context)
}

fn environment() -> EmbedresResult<Environment<'static>> {
	let mut env = Environment::new();
	env.set_keep_trailing_newline(true);
	env.set_trim_blocks(true);
	env.set_lstrip_blocks(true);

	for (name, source) in [
		("header.g.rs", templates::HEADER),
		(templates::SITE_TEMPLATE_NAME, templates::SITE_TEMPLATE),
		(templates::MANIFEST_TEMPLATE_NAME, templates::MANIFEST_TEMPLATE),
		(templates::INDEX_TEMPLATE_NAME, templates::INDEX_TEMPLATE),
	] {
		env.add_template(name, source).map_err(|e| {
			EmbedresError::TemplateRender {
				template: name.to_string(),
				reason: e.to_string(),
			}
		})?;
	}

	Ok(env)
}

fn render<S: Serialize>(template_name: &str, context: &S) -> EmbedresResult<String> {
	let env = environment()?;
	let to_error = |e: minijinja::Error| {
		EmbedresError::TemplateRender {
			template: template_name.to_string(),
			reason: e.to_string(),
		}
	};

	env.get_template(template_name)
		.map_err(to_error)?
		.render(context)
		.map_err(to_error)
}

/// A Rust string literal for `value`.
fn string_literal(value: &str) -> String {
	format!("{value:?}")
}

fn hook_value(path: Option<&str>, hook_type: &str) -> String {
	match path {
		Some(path) => format!("Some({path} as ::embedres::{hook_type})"),
		None => "None".to_string(),
	}
}

/// Prefix each line for a `///` comment.
fn doc_lines(text: &str) -> Vec<String> {
	text.lines()
		.map(|line| {
			if line.is_empty() {
				String::new()
			} else {
				format!(" {line}")
			}
		})
		.collect()
}

fn site_summary(unit: &GenerationUnit) -> String {
	let mut summary = format!(
		"Accessors for the embedded text resources that:\n\n- are in the folder `{}`\n- have the \
		 extension `{}`\n",
		unit.search_folder, unit.site.attribute.extension,
	);

	if unit.properties.is_empty() {
		summary.push_str("\nNo matching files were found, so there are no accessors.\n");
	}

	summary
}

fn property_doc(file_name: &str, resource_name: &str, preview: Option<&str>) -> String {
	let mut doc = format!("Text of the embedded resource `{file_name}`.\n");

	if let Some(text) = preview {
		let text = normalize_line_endings(text);
		let fence = "`".repeat(longest_backtick_run(&text).max(2) + 1);
		doc.push('\n');
		doc.push_str(&fence);
		doc.push_str("text\n");
		for line in text.lines() {
			doc.push_str(line);
			doc.push('\n');
		}
		doc.push_str(&fence);
		doc.push('\n');
	}

	doc.push_str(&format!(
		"\nRead from `{resource_name}` on first access, then cached.\n"
	));
	doc
}

/// Normalize CR and CRLF line endings to LF.
pub fn normalize_line_endings(content: &str) -> String {
	if content.contains('\r') {
		content.replace("\r\n", "\n").replace('\r', "\n")
	} else {
		content.to_string()
	}
}

fn longest_backtick_run(text: &str) -> usize {
	let mut longest = 0;
	let mut current = 0;

	for c in text.chars() {
		if c == '`' {
			current += 1;
			longest = longest.max(current);
		} else {
			current = 0;
		}
	}

	longest
}

/// The `include_bytes!` argument for a resource file.
fn include_source(path: &Path, project_dir: &Path) -> String {
	match path.strip_prefix(project_dir) {
		Ok(relative) => {
			let relative = relative
				.iter()
				.map(|part| part.to_string_lossy())
				.collect::<Vec<_>>()
				.join("/");
			format!(
				"concat!(env!(\"CARGO_MANIFEST_DIR\"), {})",
				string_literal(&format!("/{relative}"))
			)
		}
		Err(_) => string_literal(&path.to_string_lossy()),
	}
}
