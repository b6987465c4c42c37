//! Identity mapper schema
//!
//! Endpoint: `identity-mappers`

use pingdirectory_core::schema::AttributeType;

use super::{ConfigFamily, DefaultValue, Variant, base_schema, property, with_server_defaults};

pub const RESOURCE_TYPE: &str = "identity_mapper";

const URN_PREFIX: &str = "urn:pingidentity:schemas:configuration:2.0:identity-mapper:";

static VARIANTS: &[Variant] = &[
    Variant::new("exact-match")
        .attributes(&["match_attribute", "match_base_dn", "match_filter"])
        .defaults(&[("match_attribute", DefaultValue::Set(&["uid"]))]),
    Variant::new("regular-expression")
        .attributes(&[
            "match_attribute",
            "match_base_dn",
            "match_filter",
            "match_pattern",
            "replace_pattern",
        ])
        .required(&["match_pattern"])
        .defaults(&[("match_attribute", DefaultValue::Set(&["uid"]))]),
    Variant::new("aggregate").attributes(&[
        "all_included_identity_mapper",
        "any_included_identity_mapper",
    ]),
    Variant::new("third-party")
        .attributes(&["extension_class", "extension_argument"])
        .required(&["extension_class"]),
];

pub fn family() -> ConfigFamily {
    let type_names: Vec<&str> = VARIANTS.iter().map(|v| v.type_name).collect();

    let schema = base_schema(
        "pingdirectory_identity_mapper",
        &type_names,
        "Manages a Identity Mapper.",
    )
    .attribute(
        property("match_attribute", AttributeType::string_set())
            .with_description("Specifies the attribute whose value should exactly match the ID string provided to this identity mapper."),
    )
    .attribute(
        property("match_base_dn", AttributeType::string_set())
            .with_provider_name("matchBaseDN")
            .with_description("Specifies the set of base DNs below which to search for users."),
    )
    .attribute(
        property("match_filter", AttributeType::String)
            .with_description("An optional filter that mapped users must match."),
    )
    .attribute(
        property("match_pattern", AttributeType::String)
            .with_description("Specifies the regular expression pattern that is used to identify portions of the ID string that will be replaced."),
    )
    .attribute(
        property("replace_pattern", AttributeType::String)
            .with_description("Specifies the replacement pattern that should be used for substrings in the ID string that match the provided regular expression pattern."),
    )
    .attribute(
        property("all_included_identity_mapper", AttributeType::string_set())
            .with_description("The set of identity mappers that must all match the target entry."),
    )
    .attribute(
        property("any_included_identity_mapper", AttributeType::string_set())
            .with_description("The set of identity mappers that will be used to identify the target entry."),
    )
    .attribute(
        property("extension_class", AttributeType::String)
            .with_description("The fully-qualified name of the Java class providing the logic for the Third Party Identity Mapper."),
    )
    .attribute(
        property("extension_argument", AttributeType::string_set())
            .with_description("The set of arguments used to customize the behavior for the Third Party Identity Mapper."),
    );

    ConfigFamily {
        resource_type: RESOURCE_TYPE,
        display_name: "Identity Mapper",
        endpoint: "identity-mappers",
        name_property: "mapperName",
        schema_urn_prefix: URN_PREFIX,
        variants: VARIANTS,
        schema: with_server_defaults(schema),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pingdirectory_core::resource::Value;

    #[test]
    fn match_attribute_defaults_to_uid() {
        let family = family();
        assert_eq!(
            family
                .variant("exact-match")
                .and_then(|v| v.default_for("match_attribute")),
            Some(Value::set(["uid"]))
        );
        assert!(
            family
                .variant("aggregate")
                .unwrap()
                .default_for("match_attribute")
                .is_none()
        );
    }

    #[test]
    fn match_pattern_only_applies_to_regular_expression() {
        let family = family();
        assert!(family.variant("regular-expression").unwrap().applies("match_pattern"));
        assert!(!family.variant("exact-match").unwrap().applies("match_pattern"));
        assert!(family.variant("exact-match").unwrap().applies("description"));
    }
}
