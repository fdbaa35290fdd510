use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::EmbedresError;
use crate::EmbedresResult;

/// Default maximum size in bytes of a file offered to the generator (10 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"embedres.toml",
	".embedres.toml",
	".config/embedres.toml",
];

/// Configuration loaded from an `embedres.toml` file next to `Cargo.toml`.
///
/// ```toml
/// root_namespace = "my_crate"
/// sources = ["src"]
/// max_file_size = 10485760
/// disable_gitignore = false
///
/// [resources]
/// include = ["src/**/*.sql"]
/// embed = ["src/**/*.sql"]
///
/// [exclude]
/// patterns = ["fixtures/"]
/// ```
///
/// Every field is optional; a crate without a config file behaves as if all
/// defaults were written out.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EmbedresConfig {
	/// Prefix of every embedded resource identity. Overrides
	/// `EMBEDRES_ROOT_NAMESPACE` and `CARGO_PKG_NAME`.
	#[serde(default)]
	pub root_namespace: Option<String>,
	/// Directories, relative to the crate root, scanned for declarations.
	#[serde(default = "default_sources")]
	pub sources: Vec<PathBuf>,
	/// Files larger than this are rejected with
	/// [`EmbedresError::FileTooLarge`].
	#[serde(default = "default_max_file_size")]
	pub max_file_size: u64,
	/// When true, `.gitignore` files are not used for filtering. Use
	/// `[exclude]` patterns instead.
	#[serde(default)]
	pub disable_gitignore: bool,
	#[serde(default)]
	pub resources: ResourcesConfig,
	#[serde(default)]
	pub exclude: ExcludeConfig,
}

impl Default for EmbedresConfig {
	fn default() -> Self {
		Self {
			root_namespace: None,
			sources: default_sources(),
			max_file_size: DEFAULT_MAX_FILE_SIZE,
			disable_gitignore: false,
			resources: ResourcesConfig::default(),
			exclude: ExcludeConfig::default(),
		}
	}
}

/// Which project files are offered as resources and which are embedded.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ResourcesConfig {
	/// Glob patterns, relative to the crate root. When set, only matching
	/// files are offered to declaration sites.
	#[serde(default)]
	pub include: Vec<String>,
	/// Glob patterns, relative to the crate root, of the files compiled into
	/// the binary. When empty, every file selected by some declaration site is
	/// embedded.
	#[serde(default)]
	pub embed: Vec<String>,
}

/// Files and directories to skip while collecting resources.
///
/// Patterns follow gitignore syntax and are applied on top of any `.gitignore`
/// rules (unless `disable_gitignore` is set).
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ExcludeConfig {
	/// Examples: `"fixtures/"`, `"*.bak"`, `"!keep.bak"`.
	#[serde(default)]
	pub patterns: Vec<String>,
}

impl EmbedresConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> EmbedresResult<Option<EmbedresConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::parse(&content)?;
		tracing::debug!(path = %config_path.display(), "loaded embedres config");

		Ok(Some(config))
	}

	/// Parse config file contents.
	pub fn parse(content: &str) -> EmbedresResult<EmbedresConfig> {
		let mut config: EmbedresConfig =
			toml::from_str(content).map_err(|e| EmbedresError::ConfigParse(e.to_string()))?;

		if config
			.root_namespace
			.as_deref()
			.is_some_and(|namespace| namespace.trim().is_empty())
		{
			tracing::warn!("`root_namespace` is blank; falling back to the package name");
			config.root_namespace = None;
		}

		if config.sources.is_empty() {
			tracing::warn!("`sources` is empty; falling back to [\"src\"]");
			config.sources = default_sources();
		}

		Ok(config)
	}
}

fn default_sources() -> Vec<PathBuf> {
	vec![PathBuf::from("src")]
}

fn default_max_file_size() -> u64 {
	DEFAULT_MAX_FILE_SIZE
}
