//! `embedres_core` is the build-time generator behind [embedres](https://github.com/ifiokjr/embedres). It finds types marked with `#[embedded_resource_properties]` in a crate's sources, pairs each with the text files in its resource folder, and writes one lazily loaded, cached accessor per file into `OUT_DIR`.
//!
//! ## Processing Pipeline
//!
//! ```text
//! build.rs
//!   → Project collection (walks the crate, honours .gitignore and embedres.toml)
//!   → InitialExtraction (syn: source file → declaration sites)
//!   → Combine (site × files × options → generation unit with accessor names)
//!   → SourceOutput (unit → `impl` block, rendered with minijinja)
//!   → Manifest (embedded files → shared reader module and index)
//!   → OUT_DIR/embedres/*.g.rs, included by `embedres::include_generated!()`
//! ```
//!
//! Every step is tracked: a run with inputs equal to the previous run reuses
//! the previous outputs and reports them as [`StepRunReason::Cached`].
//!
//! ## Modules
//!
//! - [`naming`]: accessor names from file names, artifact names from types.
//! - [`config`]: `embedres.toml` discovery and parsing.
//! - [`project`]: collecting sources and resource files from disk.
//! - [`build_script`]: the `build.rs` entry point.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use embedres_core::BuildOptions;
//! use embedres_core::CancellationToken;
//! use embedres_core::build_script::generate_into;
//!
//! let options = BuildOptions::new("/work/my_crate", "my_crate");
//! let report = generate_into(
//! 	options,
//! 	Path::new("/work/target/embedres"),
//! 	&CancellationToken::new(),
//! )
//! .unwrap();
//!
//! for diagnostic in &report.run.diagnostics {
//! 	eprintln!("{}", diagnostic.message());
//! }
//! ```

pub use config::*;
pub use declaration::*;
pub use driver::*;
pub use emit::*;
pub use error::*;
pub use locator::*;
pub use options::*;
pub use project::*;

pub mod build_script;
pub mod config;
mod declaration;
mod driver;
mod emit;
#[allow(unused_assignments)]
mod error;
pub(crate) mod index_cache;
mod locator;
pub mod naming;
mod options;
pub mod project;
pub(crate) mod templates;

#[cfg(test)]
mod __fixtures;
