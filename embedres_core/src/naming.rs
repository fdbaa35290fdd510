//! Turning file names into accessor names and type names into artifact names.
//!
//! A resource file `1example(1).txt` on a type `Queries` becomes the accessor
//! `_1example_open_1_close_`: characters that cannot appear in a Rust
//! identifier are spelled out (`(` → `_open_`) or written as their code point
//! (`😀` → `_u1F600_`), a leading digit gets an underscore, and the first
//! character is upper-cased.
//!
//! Two different file names can map to the same accessor name, for example
//! `example.txt` and `Example.txt`. The driver reports this as a diagnostic
//! and rustc rejects the duplicate definition.

use std::fmt::Write;

/// Spelled-out names for common characters that are not valid in an
/// identifier.
const CHARACTER_NAMES: &[(char, &str)] = &[
	('.', "dot"),
	('-', "minus"),
	('+', "plus"),
	('*', "times"),
	('/', "slash"),
	('%', "pct"),
	('<', "lt"),
	('>', "gt"),
	('=', "eq"),
	('&', "amp"),
	('|', "pipe"),
	('^', "hat"),
	('!', "excl"),
	('?', "quest"),
	(':', "colon"),
	(',', "comma"),
	(';', "semi"),
	('~', "tilde"),
	('`', "grave"),
	('@', "at"),
	('#', "hash"),
	('$', "dollar"),
	('\\', "backslash"),
	('\'', "apos"),
	('"', "quot"),
	('[', "start"),
	(']', "end"),
	('{', "begin"),
	('}', "finish"),
	('(', "open"),
	(')', "close"),
	(' ', "space"),
	('\t', "tab"),
	('\r', "CR"),
	('\n', "LF"),
];

/// Identifiers that survive transliteration but still cannot name a function.
const RESERVED_NAMES: &[&str] = &["", "_", "Self"];

/// The accessor name for the resource file `file_name` on the type
/// `enclosing_type_name`.
///
/// The name is built from the file stem. When the stem produces nothing, or
/// produces the type's own name, the full file name (with extension) is used
/// instead.
pub fn property_name(file_name: &str, enclosing_type_name: &str) -> String {
	let mut name = convert_to_property_name(file_stem(file_name));
	if name.is_empty() || name == enclosing_type_name {
		name = convert_to_property_name(file_name);
	}

	if RESERVED_NAMES.contains(&name.as_str()) {
		name.push('_');
	}

	name
}

/// The file name of a generated artifact for the type displayed as
/// `display_string`, e.g. `queries::Queries<T>` → `queries.Queries_T_.g.rs`.
pub fn hint_name(display_string: &str) -> String {
	format!(
		"{}.g.rs",
		display_string.replace("::", ".").replace(['<', '>'], "_")
	)
}

/// Everything before the last `.`; the whole name when there is none.
pub fn file_stem(file_name: &str) -> &str {
	file_name
		.rfind('.')
		.map_or(file_name, |index| &file_name[..index])
}

/// Everything from the last `.` (inclusive); empty when there is none.
pub fn file_extension(file_name: &str) -> &str {
	file_name
		.rfind('.')
		.map_or("", |index| &file_name[index..])
}

fn character_name(c: char) -> Option<&'static str> {
	CHARACTER_NAMES
		.iter()
		.find(|(candidate, _)| *candidate == c)
		.map(|(_, name)| *name)
}

fn convert_to_property_name(file_name: &str) -> String {
	let mut valid_name = String::with_capacity(file_name.len());
	let mut previous_character_escaped = false;

	for c in file_name.chars() {
		if unicode_ident::is_xid_continue(c) {
			valid_name.push(c);
			previous_character_escaped = false;
			continue;
		}

		if !previous_character_escaped {
			valid_name.push('_');
		}

		match character_name(c) {
			Some(name) => valid_name.push_str(name),
			None => {
				let _ = write!(valid_name, "u{:X}", u32::from(c));
			}
		}

		valid_name.push('_');
		previous_character_escaped = true;
	}

	if let Some(first) = valid_name.chars().next() {
		if first != '_' && !unicode_ident::is_xid_start(first) {
			valid_name.insert(0, '_');
		}
	}

	upper_case_first(&valid_name)
}

/// Upper-case the first character when it maps to exactly one character.
fn upper_case_first(name: &str) -> String {
	let mut chars = name.chars();
	let Some(first) = chars.next() else {
		return String::new();
	};

	let mut upper = first.to_uppercase();
	let replacement = match (upper.next(), upper.next()) {
		(Some(single), None) => single,
		_ => first,
	};

	let mut result = String::with_capacity(name.len());
	result.push(replacement);
	result.push_str(chars.as_str());
	result
}
