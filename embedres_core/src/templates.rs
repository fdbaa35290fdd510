//! Output templates. Every value is prepared in Rust before rendering, so the
//! templates only lay out lines.

pub(crate) const HEADER: &str = "\
// <auto-generated>
//     This code was generated by embedres_core {{ version }}.
//     Changes to this file are overwritten on the next build.
// </auto-generated>
";

pub(crate) const SITE_TEMPLATE_NAME: &str = "site.g.rs";
pub(crate) const SITE_TEMPLATE: &str = "\
{% include 'header.g.rs' %}

{% for line in summary %}
///{{ line }}
{% endfor %}
{% for attribute in cfg_attributes %}
{{ attribute }}
{% endfor %}
#[allow(non_snake_case, dead_code, unused_qualifications)]
impl{{ impl_generics }} {{ self_type }}{{ where_clause }} {
	#[doc(hidden)]
	const EMBEDDED_RESOURCE_HOOKS: ::embedres::ResourceHooks = ::embedres::ResourceHooks {
		before_read: {{ before_read }},
		after_read: {{ after_read }},
	};
{% for property in properties %}

{% for line in property.doc %}
	///{{ line }}
{% endfor %}
	{{ visibility }}fn {{ property.name }}() -> ::embedres::ResourceResult<::std::string::String> {
		static BACKING_SLOT: ::embedres::BackingSlot = ::embedres::BackingSlot::new();
		const RESOURCE_NAME: &str = {{ property.resource_name }};

		BACKING_SLOT.load(
			RESOURCE_NAME,
			{{ property.name_literal }},
			&Self::EMBEDDED_RESOURCE_HOOKS,
			crate::__embedded_resources::read,
		)
	}
{% endfor %}
}
";

pub(crate) const MANIFEST_TEMPLATE_NAME: &str = "manifest.g.rs";
pub(crate) const MANIFEST_TEMPLATE: &str = "\
{% include 'header.g.rs' %}

/// Resources compiled into this crate, read by the generated accessors.
#[doc(hidden)]
#[allow(dead_code)]
pub(crate) mod __embedded_resources {
	static RESOURCES: [::embedres::EmbeddedResource; {{ resource_count }}] = [
{% for resource in resources %}
		::embedres::EmbeddedResource::new(
			{{ resource.name }},
			include_bytes!({{ resource.source }}),
		),
{% endfor %}
	];

	pub(crate) static MANIFEST: ::embedres::ResourceManifest =
		::embedres::ResourceManifest::new(&RESOURCES);

	pub(crate) fn read(resource_name: &str) -> ::embedres::ResourceResult<::std::string::String> {
		MANIFEST.read(resource_name)
	}
}
";

pub(crate) const INDEX_TEMPLATE_NAME: &str = "index.g.rs";
pub(crate) const INDEX_TEMPLATE: &str = "\
{% include 'header.g.rs' %}

{% for artifact in artifacts %}
include!(concat!(env!(\"OUT_DIR\"), {{ artifact }}));
{% endfor %}
";
