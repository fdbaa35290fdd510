use crate::ResourceError;
use crate::ResourceResult;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A single resource compiled into the crate, keyed by its resource identity
/// (`<root namespace>.<relative.path.with.dots>`).
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedResource {
	name: &'static str,
	bytes: &'static [u8],
}

impl EmbeddedResource {
	pub const fn new(name: &'static str, bytes: &'static [u8]) -> Self {
		Self { name, bytes }
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn bytes(&self) -> &'static [u8] {
		self.bytes
	}
}

/// The table of every resource embedded into a crate.
///
/// The generator writes the entries sorted by name, which lets [`read`] use a
/// binary search.
///
/// [`read`]: ResourceManifest::read
#[derive(Debug, Clone, Copy)]
pub struct ResourceManifest {
	resources: &'static [EmbeddedResource],
}

impl ResourceManifest {
	pub const fn new(resources: &'static [EmbeddedResource]) -> Self {
		Self { resources }
	}

	/// Look up a resource by identity.
	pub fn get(&self, name: &str) -> Option<&EmbeddedResource> {
		self.resources
			.binary_search_by(|resource| resource.name.cmp(name))
			.ok()
			.map(|index| &self.resources[index])
	}

	/// Read a resource as UTF-8 text. A leading byte order mark is dropped.
	pub fn read(&self, name: &str) -> ResourceResult<String> {
		let resource = self.get(name).ok_or_else(|| {
			ResourceError::NotFound {
				name: name.to_string(),
			}
		})?;
		let bytes = resource.bytes.strip_prefix(UTF8_BOM).unwrap_or(resource.bytes);

		String::from_utf8(bytes.to_vec()).map_err(|source| {
			ResourceError::InvalidUtf8 {
				name: name.to_string(),
				source,
			}
		})
	}

	/// Identities of every embedded resource, in manifest order.
	pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.resources.iter().map(|resource| resource.name)
	}

	pub fn len(&self) -> usize {
		self.resources.len()
	}

	pub fn is_empty(&self) -> bool {
		self.resources.is_empty()
	}
}
