use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;

use crate::BuildOptions;
use crate::DriverState;

pub(crate) const CACHE_SCHEMA_VERSION: u32 = 1;
const CACHE_FILE_NAME: &str = "index-v1.json";

/// Driver state persisted between build-script runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct GenerationCache {
	pub schema_version: u32,
	pub cache_key: String,
	pub state: DriverState,
}

impl GenerationCache {
	pub(crate) fn new(cache_key: String, state: DriverState) -> Self {
		Self {
			schema_version: CACHE_SCHEMA_VERSION,
			cache_key,
			state,
		}
	}
}

/// Key that invalidates the cache when the generator or the crate changes.
pub(crate) fn build_cache_key(options: &BuildOptions) -> String {
	format!(
		"embedres_core@{}|{}",
		env!("CARGO_PKG_VERSION"),
		options.project_dir.to_string_lossy().replace('\\', "/")
	)
}

pub(crate) fn cache_path(artifact_dir: &Path) -> PathBuf {
	artifact_dir.join(CACHE_FILE_NAME)
}

/// Load the persisted state. Anything unreadable, from another schema or for
/// another key is treated as absent.
pub(crate) fn load(artifact_dir: &Path, cache_key: &str) -> Option<DriverState> {
	let bytes = std::fs::read(cache_path(artifact_dir)).ok()?;
	let cache: GenerationCache = match serde_json::from_slice(&bytes) {
		Ok(cache) => cache,
		Err(error) => {
			tracing::debug!(%error, "discarding unreadable generation cache");
			return None;
		}
	};

	if cache.schema_version != CACHE_SCHEMA_VERSION {
		return None;
	}

	if cache.cache_key != cache_key {
		return None;
	}

	Some(cache.state)
}

/// Best-effort save; failures only cost a full regeneration next time.
pub(crate) fn save(artifact_dir: &Path, cache: &GenerationCache) {
	if std::fs::create_dir_all(artifact_dir).is_err() {
		return;
	}

	let Ok(payload) = serde_json::to_vec(cache) else {
		return;
	};

	if write_atomic(&cache_path(artifact_dir), &payload).is_err() {
		tracing::debug!("failed to save generation cache");
	}
}

/// Write through a temporary file in the same directory, then rename.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
	let file_name = path
		.file_name()
		.map(|name| name.to_string_lossy().into_owned())
		.unwrap_or_default();
	let temp_path = path.with_file_name(format!(
		".{file_name}.tmp-{}-{}",
		std::process::id(),
		SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map_or(0, |duration| duration.as_nanos())
	));

	std::fs::write(&temp_path, contents)?;

	if let Err(error) = std::fs::rename(&temp_path, path) {
		let _ = std::fs::remove_file(&temp_path);
		return Err(error);
	}

	Ok(())
}
