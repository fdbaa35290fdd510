use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum EmbedresError {
	#[error(transparent)]
	#[diagnostic(code(embedres::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(embedres::config_parse),
		help("check that embedres.toml is valid TOML with [resources] and/or [exclude] sections")
	)]
	ConfigParse(String),

	#[error("invalid pattern `{pattern}`: {reason}")]
	#[diagnostic(
		code(embedres::invalid_pattern),
		help("[resources] patterns are globs and [exclude] patterns follow gitignore syntax")
	)]
	InvalidPattern { pattern: String, reason: String },

	#[error("environment variable `{0}` is not set")]
	#[diagnostic(
		code(embedres::missing_env),
		help("embedres_core::build_script::generate() must be called from a cargo build script")
	)]
	MissingEnv(String),

	#[error("file too large: `{path}` is {size} bytes (limit: {limit} bytes)")]
	#[diagnostic(
		code(embedres::file_too_large),
		help("increase `max_file_size` in embedres.toml or exclude this file")
	)]
	FileTooLarge { path: String, size: u64, limit: u64 },

	#[error("symlink cycle detected at: `{path}`")]
	#[diagnostic(
		code(embedres::symlink_cycle),
		help("remove the circular symlink or exclude this path")
	)]
	SymlinkCycle { path: String },

	#[error("failed to render generated source `{template}`: {reason}")]
	#[diagnostic(code(embedres::template_render))]
	TemplateRender { template: String, reason: String },

	#[error("generation was cancelled")]
	#[diagnostic(code(embedres::cancelled))]
	Cancelled,
}

pub type EmbedresResult<T> = Result<T, EmbedresError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
