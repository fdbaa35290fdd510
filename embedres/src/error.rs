use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum ResourceError {
	#[error("embedded resource `{name}` was not found")]
	#[diagnostic(
		code(embedres::resource_not_found),
		help(
			"the file was discovered when the accessor was generated but is not part of the \
			 embedded manifest; check the `[resources] embed` patterns in embedres.toml"
		)
	)]
	NotFound { name: String },

	#[error("embedded resource `{name}` is not valid UTF-8")]
	#[diagnostic(code(embedres::invalid_utf8))]
	InvalidUtf8 {
		name: String,
		#[source]
		source: std::string::FromUtf8Error,
	},
}

pub type ResourceResult<T> = Result<T, ResourceError>;
