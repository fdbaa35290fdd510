/// Called before the cache is checked, with the backing slot itself, the
/// resource identity and the accessor name. Setting the slot skips the
/// embedded read for this and every later call.
pub type BeforeRead = fn(backing_slot: &mut Option<String>, resource_name: &str, property_name: &str);

/// Called with a copy of the value about to be returned, the resource identity
/// and the accessor name. Changes affect only this call's return value.
pub type AfterRead = fn(value: &mut String, resource_name: &str, property_name: &str);

/// The customization points shared by every accessor of one generated type.
///
/// A `None` hook is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceHooks {
	pub before_read: Option<BeforeRead>,
	pub after_read: Option<AfterRead>,
}

impl ResourceHooks {
	/// No hooks at all.
	pub const NONE: Self = Self {
		before_read: None,
		after_read: None,
	};

	pub(crate) fn before_read(
		&self,
		backing_slot: &mut Option<String>,
		resource_name: &str,
		property_name: &str,
	) {
		if let Some(hook) = self.before_read {
			hook(backing_slot, resource_name, property_name);
		}
	}

	pub(crate) fn after_read(&self, value: &mut String, resource_name: &str, property_name: &str) {
		if let Some(hook) = self.after_read {
			hook(value, resource_name, property_name);
		}
	}
}
