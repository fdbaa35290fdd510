//! Marker attribute for the embedres generator.
//!
//! The attribute itself generates nothing. `embedres_core` reads it from the
//! crate's sources in `build.rs` and emits the accessors into `OUT_DIR`; this
//! macro only keeps the attribute legal and rejects items the generator cannot
//! extend.

use proc_macro::TokenStream;
use quote::ToTokens;
use syn::Item;
use syn::parse_macro_input;

/// Generate one accessor per embedded resource file found for this type.
///
/// ```rust,ignore
/// #[embedded_resource_properties(".sql", "SqlQueries")]
/// pub struct SqlQuery;
///
/// #[embedded_resource_properties(extension = ".sql", path = "/queries", after_read = "Self::trim")]
/// pub struct TrimmedQuery;
/// ```
///
/// Arguments, positional or named:
///
/// - `extension`: file extension to include, with its leading dot. Defaults
///   to `".txt"`.
/// - `path`: folder holding the files. A leading `/` makes it relative to the
///   crate root (where `Cargo.toml` lives); otherwise it is relative to the
///   folder of the source file declaring the type. Defaults to the type name.
/// - `before_read`: path of a `fn(&mut Option<String>, &str, &str)` called
///   with the cached value before it is checked.
/// - `after_read`: path of a `fn(&mut String, &str, &str)` called with the
///   value about to be returned.
///
/// Values that are not string literals are ignored and the default is used.
///
/// The generated `impl` block is included at the crate root and names the
/// hooks from there. A hook defined in a submodule, or on a type declared in
/// one, must therefore be at least `pub(crate)`. Private hooks only work
/// when both the hook and the type live in the crate root module.
///
/// `#[cfg(..)]` attributes on the type and on the inline modules around it
/// are repeated on the generated `impl` block.
#[proc_macro_attribute]
pub fn embedded_resource_properties(_attr: TokenStream, item: TokenStream) -> TokenStream {
	let input = parse_macro_input!(item as Item);

	match input {
		Item::Struct(_) | Item::Enum(_) | Item::Union(_) => input.into_token_stream().into(),
		other => {
			syn::Error::new_spanned(
				other,
				"#[embedded_resource_properties] can only be applied to a struct, enum, or union",
			)
			.to_compile_error()
			.into()
		}
	}
}
