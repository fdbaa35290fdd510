use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::EmbedresConfig;
use crate::EmbedresError;
use crate::EmbedresResult;

pub const DESIGN_TIME_BUILD_ENV: &str = "EMBEDRES_DESIGN_TIME_BUILD";
pub const ROOT_NAMESPACE_ENV: &str = "EMBEDRES_ROOT_NAMESPACE";
pub const MANIFEST_DIR_ENV: &str = "CARGO_MANIFEST_DIR";
pub const PACKAGE_NAME_ENV: &str = "CARGO_PKG_NAME";

/// Environment variables whose changes must rerun the build script.
pub const TRACKED_ENV_VARS: [&str; 3] = [
	DESIGN_TIME_BUILD_ENV,
	ROOT_NAMESPACE_ENV,
	PACKAGE_NAME_ENV,
];

/// Snapshot of the build options, captured once per generation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
	/// Set for builds that only feed an editor or analyzer. Accessor doc
	/// comments then omit the content preview.
	pub is_design_time_build: bool,
	/// Absolute crate root, where `Cargo.toml` lives.
	pub project_dir: PathBuf,
	/// Prefix of every embedded resource identity. May be empty.
	pub root_namespace: String,
}

impl BuildOptions {
	pub fn new(project_dir: impl Into<PathBuf>, root_namespace: impl Into<String>) -> Self {
		Self {
			is_design_time_build: false,
			project_dir: project_dir.into(),
			root_namespace: root_namespace.into(),
		}
	}

	#[must_use]
	pub fn with_design_time_build(mut self, is_design_time_build: bool) -> Self {
		self.is_design_time_build = is_design_time_build;
		self
	}

	/// Read the options from the process environment.
	pub fn from_env() -> EmbedresResult<Self> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Read the options through `lookup`, which maps an environment variable
	/// name to its value.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> EmbedresResult<Self> {
		let project_dir = lookup(MANIFEST_DIR_ENV)
			.filter(|value| !value.is_empty())
			.map(PathBuf::from)
			.ok_or_else(|| EmbedresError::MissingEnv(MANIFEST_DIR_ENV.to_string()))?;

		let is_design_time_build = lookup(DESIGN_TIME_BUILD_ENV)
			.is_some_and(|value| value.trim().eq_ignore_ascii_case("true"));

		let root_namespace = lookup(ROOT_NAMESPACE_ENV)
			.filter(|value| !value.trim().is_empty())
			.or_else(|| lookup(PACKAGE_NAME_ENV).map(|name| name.replace('-', "_")))
			.unwrap_or_default();

		Ok(Self {
			is_design_time_build,
			project_dir,
			root_namespace,
		})
	}

	/// Apply the config file's overrides.
	#[must_use]
	pub fn with_config(mut self, config: &EmbedresConfig) -> Self {
		if let Some(namespace) = &config.root_namespace {
			self.root_namespace.clone_from(namespace);
		}
		self
	}
}
