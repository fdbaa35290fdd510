use std::path::Path;
use std::path::PathBuf;

use quote::ToTokens;
use serde::Deserialize;
use serde::Serialize;
use syn::Attribute;
use syn::Expr;
use syn::ExprLit;
use syn::Fields;
use syn::Generics;
use syn::Item;
use syn::Lit;
use syn::PathArguments;
use syn::Token;
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;

/// Name of the marker attribute, matched by the last path segment so both
/// `#[embedded_resource_properties]` and `#[embedres::embedded_resource_properties]`
/// are found.
pub const ATTRIBUTE_NAME: &str = "embedded_resource_properties";
pub const DEFAULT_EXTENSION: &str = ".txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclarationKind {
	Struct,
	TupleStruct,
	UnitStruct,
	Enum,
	Union,
}

/// Declared visibility of the container type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
	/// `pub`
	Public,
	/// `pub(crate)`
	Crate,
	/// `pub(super)`, `pub(in path)` and `pub(self)`, stored as written.
	Restricted(String),
	/// No visibility keyword.
	Inherited,
}

/// Arguments of the marker attribute, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAttribute {
	pub extension: String,
	pub path: String,
	/// Crate-qualified path of the before-read hook.
	pub before_read: Option<String>,
	/// Crate-qualified path of the after-read hook.
	pub after_read: Option<String>,
}

impl ResourceAttribute {
	pub fn new(type_name: &str) -> Self {
		Self {
			extension: DEFAULT_EXTENSION.to_string(),
			path: type_name.to_string(),
			before_read: None,
			after_read: None,
		}
	}
}

/// A struct, enum or union carrying the marker attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationSite {
	/// Simple name, without `r#`.
	pub name: String,
	/// Modules from the crate root; empty for the crate root itself.
	pub module_path: Vec<String>,
	pub source_file: PathBuf,
	pub visibility: Visibility,
	pub kind: DeclarationKind,
	/// `<T: Clone>` as written for `impl<..>`; empty without generics.
	pub impl_generics: String,
	/// `<T>` as written after the type name; empty without generics.
	pub ty_generics: String,
	/// `where ..` clause; empty without one.
	pub where_clause: String,
	/// Generic parameter names, used for display.
	pub generic_names: Vec<String>,
	/// `#[cfg(..)]` predicates of the enclosing inline modules and the item,
	/// outermost first.
	pub cfg: Vec<String>,
	pub attribute: ResourceAttribute,
}

impl DeclarationSite {
	/// Module-qualified name with generic parameters, e.g. `queries::Queries<T>`.
	pub fn display_string(&self) -> String {
		let mut display = self
			.module_path
			.iter()
			.map(String::as_str)
			.chain(std::iter::once(self.name.as_str()))
			.collect::<Vec<_>>()
			.join("::");

		if !self.generic_names.is_empty() {
			display.push('<');
			display.push_str(&self.generic_names.join(","));
			display.push('>');
		}

		display
	}

	/// The type as named from the `impl` block, e.g. `crate::queries::Queries<T>`.
	pub fn self_type(&self) -> String {
		let mut self_type = String::from("crate");
		for segment in &self.module_path {
			self_type.push_str("::");
			self_type.push_str(segment);
		}
		self_type.push_str("::");
		self_type.push_str(&self.name);
		self_type.push_str(&self.ty_generics);
		self_type
	}

	/// The `#[cfg(..)]` attributes the generated `impl` block repeats, so it
	/// exists exactly when the type does.
	pub fn cfg_attributes(&self) -> Vec<String> {
		self.cfg
			.iter()
			.map(|predicate| format!("#[cfg({predicate})]"))
			.collect()
	}

	/// Visibility keyword for the generated accessors, with a trailing space.
	pub fn accessor_visibility(&self) -> &'static str {
		match self.visibility {
			Visibility::Public => "pub ",
			_ => "pub(crate) ",
		}
	}

	/// Whether the crate root, where the generated code is included, can name
	/// this type.
	pub fn is_reachable_from_crate_root(&self) -> bool {
		self.module_path.is_empty() || !matches!(self.visibility, Visibility::Inherited)
	}
}

/// The module a source file defines, relative to the crate root.
///
/// `lib.rs` and `main.rs` directly under `source_root` are the crate root,
/// `a/mod.rs` is `a` and `a/b.rs` is `a::b`. Files under `bin/` belong to other
/// targets and return `None`, as does anything that is not a `.rs` file below
/// `source_root`.
pub fn module_path_for_source(source_root: &Path, file: &Path) -> Option<Vec<String>> {
	let relative = file.strip_prefix(source_root).ok()?;
	let mut parts: Vec<String> = relative
		.iter()
		.map(|part| part.to_string_lossy().into_owned())
		.collect();

	let file_name = parts.pop()?;
	let stem = file_name.strip_suffix(".rs")?;

	if parts.first().is_some_and(|first| first == "bin") {
		return None;
	}

	match stem {
		"lib" | "main" if parts.is_empty() => {}
		"mod" => {}
		_ => parts.push(stem.to_string()),
	}

	Some(parts)
}

/// Find every declaration site in one source file.
///
/// A file that does not parse yields nothing; rustc reports the real error.
#[tracing::instrument(skip(text), fields(file = %file.display()))]
pub fn extract_declarations(file: &Path, module_path: &[String], text: &str) -> Vec<DeclarationSite> {
	let syntax = match syn::parse_file(text) {
		Ok(syntax) => syntax,
		Err(error) => {
			tracing::warn!(%error, "skipping source file that does not parse");
			return Vec::new();
		}
	};

	let mut sites = Vec::new();
	collect_items(file, module_path, &[], &syntax.items, &mut sites);
	tracing::debug!(count = sites.len(), "extracted declaration sites");
	sites
}

fn collect_items(
	file: &Path,
	module_path: &[String],
	cfg: &[String],
	items: &[Item],
	sites: &mut Vec<DeclarationSite>,
) {
	for item in items {
		let (attrs, vis, ident, generics, kind) = match item {
			Item::Struct(item) => {
				let kind = match item.fields {
					Fields::Named(_) => DeclarationKind::Struct,
					Fields::Unnamed(_) => DeclarationKind::TupleStruct,
					Fields::Unit => DeclarationKind::UnitStruct,
				};
				(&item.attrs, &item.vis, &item.ident, &item.generics, kind)
			}
			Item::Enum(item) => {
				(
					&item.attrs,
					&item.vis,
					&item.ident,
					&item.generics,
					DeclarationKind::Enum,
				)
			}
			Item::Union(item) => {
				(
					&item.attrs,
					&item.vis,
					&item.ident,
					&item.generics,
					DeclarationKind::Union,
				)
			}
			Item::Mod(item) => {
				if let Some((_, nested)) = &item.content {
					let mut nested_path = module_path.to_vec();
					nested_path.push(item.ident.unraw().to_string());
					let nested_cfg = with_cfg_predicates(cfg, &item.attrs);
					collect_items(file, &nested_path, &nested_cfg, nested, sites);
				}
				continue;
			}
			_ => continue,
		};

		let Some(attr) = attrs.iter().find(|attr| is_marker_attribute(attr)) else {
			continue;
		};

		let name = ident.unraw().to_string();
		let attribute = parse_attribute(attr, &name, module_path);
		let (impl_generics, ty_generics, where_clause) = split_generics(generics);

		sites.push(DeclarationSite {
			generic_names: generic_names(generics),
			cfg: with_cfg_predicates(cfg, attrs),
			name,
			module_path: module_path.to_vec(),
			source_file: file.to_path_buf(),
			visibility: visibility(vis),
			kind,
			impl_generics,
			ty_generics,
			where_clause,
			attribute,
		});
	}
}

fn is_marker_attribute(attr: &Attribute) -> bool {
	attr.path()
		.segments
		.last()
		.is_some_and(|segment| segment.ident == ATTRIBUTE_NAME)
}

/// `inherited` followed by the predicates of every `#[cfg(..)]` in `attrs`.
fn with_cfg_predicates(inherited: &[String], attrs: &[Attribute]) -> Vec<String> {
	let mut predicates = inherited.to_vec();
	for attr in attrs {
		if !attr.path().is_ident("cfg") {
			continue;
		}
		match &attr.meta {
			syn::Meta::List(list) => predicates.push(list.tokens.to_string()),
			_ => tracing::warn!("ignoring malformed cfg attribute"),
		}
	}
	predicates
}

fn visibility(vis: &syn::Visibility) -> Visibility {
	match vis {
		syn::Visibility::Public(_) => Visibility::Public,
		syn::Visibility::Inherited => Visibility::Inherited,
		syn::Visibility::Restricted(restricted) => {
			if restricted.in_token.is_none() && restricted.path.is_ident("crate") {
				Visibility::Crate
			} else {
				Visibility::Restricted(restricted.to_token_stream().to_string())
			}
		}
	}
}

fn split_generics(generics: &Generics) -> (String, String, String) {
	if generics.params.is_empty() && generics.where_clause.is_none() {
		return (String::new(), String::new(), String::new());
	}

	let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
	(
		impl_generics.to_token_stream().to_string(),
		ty_generics.to_token_stream().to_string(),
		where_clause
			.map(|clause| format!(" {}", clause.to_token_stream()))
			.unwrap_or_default(),
	)
}

fn generic_names(generics: &Generics) -> Vec<String> {
	generics
		.params
		.iter()
		.map(|param| {
			match param {
				syn::GenericParam::Type(param) => param.ident.unraw().to_string(),
				syn::GenericParam::Lifetime(param) => param.lifetime.to_string(),
				syn::GenericParam::Const(param) => param.ident.unraw().to_string(),
			}
		})
		.collect()
}

/// Read the attribute arguments. Positional arguments are `(extension, path)`;
/// named arguments override them. Anything that is not a string literal keeps
/// the default.
fn parse_attribute(attr: &Attribute, type_name: &str, module_path: &[String]) -> ResourceAttribute {
	let mut attribute = ResourceAttribute::new(type_name);

	if matches!(attr.meta, syn::Meta::Path(_)) {
		return attribute;
	}

	let arguments = match attr.parse_args_with(Punctuated::<Expr, Token![,]>::parse_terminated) {
		Ok(arguments) => arguments,
		Err(error) => {
			tracing::warn!(%error, type_name, "ignoring malformed attribute arguments");
			return attribute;
		}
	};

	let mut named = Vec::new();
	let mut position = 0;

	for argument in arguments {
		match argument {
			Expr::Assign(assign) => named.push(assign),
			positional => {
				match (position, string_value(&positional)) {
					(0, Some(extension)) => attribute.extension = extension,
					(1, Some(path)) => attribute.path = path,
					(0 | 1, None) => {
						tracing::warn!(type_name, position, "ignoring non-string attribute argument");
					}
					_ => {
						tracing::warn!(type_name, position, "ignoring extra attribute argument");
					}
				}
				position += 1;
			}
		}
	}

	for assign in named {
		let key = match assign.left.as_ref() {
			Expr::Path(path) => path.path.get_ident().map(|ident| ident.unraw().to_string()),
			_ => None,
		};
		let Some(key) = key else {
			tracing::warn!(type_name, "ignoring attribute argument with a non-identifier name");
			continue;
		};
		let Some(value) = string_value(&assign.right) else {
			tracing::warn!(type_name, key = %key, "ignoring non-string attribute argument");
			continue;
		};

		match key.as_str() {
			"extension" => attribute.extension = value,
			"path" => attribute.path = value,
			"before_read" => attribute.before_read = qualify_hook_path(&value, module_path),
			"after_read" => attribute.after_read = qualify_hook_path(&value, module_path),
			_ => tracing::warn!(type_name, key = %key, "ignoring unknown attribute argument"),
		}
	}

	attribute
}

fn string_value(expr: &Expr) -> Option<String> {
	match expr {
		Expr::Lit(ExprLit {
			lit: Lit::Str(value),
			..
		}) => Some(value.value()),
		_ => None,
	}
}

/// Make a hook path valid from the crate root.
///
/// `Self::`, `crate::` and `::` paths are kept; `self::` and `super::` are
/// resolved against `module_path`; anything else is taken as relative to the
/// declaring module.
pub fn qualify_hook_path(value: &str, module_path: &[String]) -> Option<String> {
	let path = match syn::parse_str::<syn::Path>(value.trim()) {
		Ok(path) => path,
		Err(error) => {
			tracing::warn!(value, %error, "ignoring hook that is not a path");
			return None;
		}
	};

	if path
		.segments
		.iter()
		.any(|segment| !matches!(segment.arguments, PathArguments::None))
	{
		tracing::warn!(value, "ignoring hook path with generic arguments");
		return None;
	}

	let segments: Vec<String> = path
		.segments
		.iter()
		.map(|segment| segment.ident.to_string())
		.collect();

	if path.leading_colon.is_some() {
		return Some(format!("::{}", segments.join("::")));
	}

	let mut resolved: Vec<String> = vec!["crate".to_string()];
	let mut remaining = segments.as_slice();

	match segments.first().map(String::as_str) {
		Some("Self" | "crate") => return Some(segments.join("::")),
		Some("self") => {
			resolved.extend(module_path.iter().cloned());
			remaining = &segments[1..];
		}
		Some("super") => {
			let mut base = module_path.to_vec();
			while remaining.first().is_some_and(|segment| segment == "super") {
				if base.pop().is_none() {
					tracing::warn!(value, "ignoring hook path that leaves the crate");
					return None;
				}
				remaining = &remaining[1..];
			}
			resolved.extend(base);
		}
		_ => resolved.extend(module_path.iter().cloned()),
	}

	resolved.extend(remaining.iter().cloned());
	Some(resolved.join("::"))
}
