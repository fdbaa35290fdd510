//! `embedres` is the runtime half of the [embedres](https://github.com/ifiokjr/embedres) generator. Code generated by `embedres_core` at build time calls into this crate to read embedded text resources lazily and cache them.
//!
//! ## How it fits together
//!
//! ```text
//! #[embedded_resource_properties(".sql", "SqlQueries")] on a type
//!   → build.rs runs embedres_core::build_script::generate()
//!   → OUT_DIR/embedres/*.g.rs (one impl block per type + a shared manifest)
//!   → embedres::include_generated!() at the crate root
//!   → SqlQuery::SelectAll() reads `src/SqlQueries/SelectAll.sql` once and caches it
//! ```
//!
//! ## Key Types
//!
//! - [`BackingSlot`]: The per-accessor cache holding the loaded text.
//! - [`ResourceHooks`]: The optional before-read and after-read hooks of a type.
//! - [`ResourceManifest`]: The table of resources embedded into the crate.
//! - [`ResourceError`]: Why an accessor could not produce its text.
//!
//! ## Hooks
//!
//! A before-read hook sees the cached value before the cache is checked and
//! may set it, which replaces the embedded text for the rest of the process.
//! An after-read hook sees a copy of the value just before it is returned and
//! may rewrite that copy; the cache is left alone.
//!
//! ```rust
//! use embedres::BackingSlot;
//! use embedres::ResourceHooks;
//! use embedres::ResourceResult;
//!
//! fn read(_resource_name: &str) -> ResourceResult<String> {
//! 	Ok("SELECT * FROM Customers;".to_owned())
//! }
//!
//! fn shout(value: &mut String, _resource_name: &str, _property_name: &str) {
//! 	*value = value.to_uppercase();
//! }
//!
//! static SLOT: BackingSlot = BackingSlot::new();
//! const HOOKS: ResourceHooks = ResourceHooks {
//! 	before_read: None,
//! 	after_read: Some(shout),
//! };
//!
//! let value = SLOT.load("demo.SelectAll.sql", "SelectAll", &HOOKS, read).unwrap();
//! assert_eq!(value, "SELECT * FROM CUSTOMERS;");
//! assert!(SLOT.is_set());
//! ```

pub use embedres_macros::embedded_resource_properties;
pub use error::*;
pub use hooks::*;
pub use manifest::*;
pub use slot::*;

#[allow(unused_assignments)]
mod error;
mod hooks;
mod manifest;
mod slot;

/// Include everything `embedres_core` generated for this crate.
///
/// Invoke once at the crate root (`lib.rs` or `main.rs`). The generated
/// accessors refer to the types they extend through `crate::` paths and share
/// a crate-private `__embedded_resources` module, so the include must live at
/// the root.
#[macro_export]
macro_rules! include_generated {
	() => {
		include!(concat!(
			env!("OUT_DIR"),
			"/embedres/embedded_resources.g.rs"
		));
	};
}
