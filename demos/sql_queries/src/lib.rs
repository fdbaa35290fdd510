//! Each `.sql` file in `src/SqlQueries` becomes an accessor on the types
//! below, so `SelectAll.sql` turns into `SelectAll()`. The accessor of a file
//! with characters that are not valid in identifiers spells them out:
//! `order-count.sql` would become `Order_minus_count()`.

use embedres::embedded_resource_properties;

embedres::include_generated!();

/// The queries as written.
#[embedded_resource_properties(".sql", "SqlQueries")]
pub struct SqlQuery;

/// The queries in lower case. The cached text keeps its original casing.
#[embedded_resource_properties(".sql", "SqlQueries", after_read = "Self::lowercase")]
pub struct SqlQueryLowercase;

impl SqlQueryLowercase {
	fn lowercase(value: &mut String, _resource_name: &str, _property_name: &str) {
		*value = value.to_lowercase();
	}
}

/// The queries with `SelectAll` pointed at the view of new customers.
#[embedded_resource_properties(".sql", "SqlQueries", before_read = "Self::override_select_all")]
pub struct SqlQueryOverrides;

impl SqlQueryOverrides {
	pub const SELECT_ALL_OVERRIDE: &'static str = "SELECT * FROM NewCustomersView;";

	fn override_select_all(
		backing_slot: &mut Option<String>,
		_resource_name: &str,
		property_name: &str,
	) {
		if backing_slot.is_none() && property_name == "SelectAll" {
			*backing_slot = Some(Self::SELECT_ALL_OVERRIDE.to_string());
		}
	}
}
