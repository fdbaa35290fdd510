use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use crate::ResourceHooks;
use crate::ResourceResult;

/// The cache behind one generated accessor.
///
/// A slot starts unset and becomes set either on the first successful read or
/// when a before-read hook stores a value. It never becomes unset again. The
/// whole check-read-store sequence runs under a lock, so concurrent first
/// calls read the resource once.
#[derive(Debug, Default)]
pub struct BackingSlot {
	value: Mutex<Option<String>>,
}

impl BackingSlot {
	pub const fn new() -> Self {
		Self {
			value: Mutex::new(None),
		}
	}

	/// Whether a value has been cached.
	pub fn is_set(&self) -> bool {
		self.lock().is_some()
	}

	/// Produce the accessor's value.
	///
	/// 1. `hooks.before_read` sees the slot and may fill it.
	/// 2. An unset slot is filled from `read(resource_name)`.
	/// 3. `hooks.after_read` rewrites a copy of the cached value.
	///
	/// A failed read leaves the slot unset and returns the error.
	pub fn load(
		&self,
		resource_name: &str,
		property_name: &str,
		hooks: &ResourceHooks,
		read: fn(&str) -> ResourceResult<String>,
	) -> ResourceResult<String> {
		let mut value = {
			let mut slot = self.lock();
			hooks.before_read(&mut slot, resource_name, property_name);

			match slot.as_ref() {
				Some(cached) => cached.clone(),
				None => {
					let text = read(resource_name)?;
					*slot = Some(text.clone());
					text
				}
			}
		};

		hooks.after_read(&mut value, resource_name, property_name);
		Ok(value)
	}

	fn lock(&self) -> MutexGuard<'_, Option<String>> {
		// A panicking hook cannot leave the slot half written, so the data is
		// still usable after poisoning.
		self.value.lock().unwrap_or_else(PoisonError::into_inner)
	}
}
