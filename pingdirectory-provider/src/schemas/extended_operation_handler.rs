//! Extended operation handler schema
//!
//! Endpoint: `extended-operation-handlers`

use pingdirectory_core::schema::{AttributeType, types};

use super::{ConfigFamily, DefaultValue, Variant, base_schema, property, with_server_defaults};
use crate::version::ProductVersion;

pub const RESOURCE_TYPE: &str = "extended_operation_handler";

const URN_PREFIX: &str = "urn:pingidentity:schemas:configuration:2.0:extended-operation-handler:";

const ALLOWED_OPERATIONS: &[&str] = &["add", "delete", "modify", "modify-dn"];

static VARIANTS: &[Variant] = &[
    Variant::new("cancel"),
    Variant::new("batch"),
    Variant::new("get-connection-id"),
    Variant::new("get-changelog-batch"),
    Variant::new("get-supported-otp-delivery-mechanisms"),
    Variant::new("single-use-tokens")
        .attributes(&[
            "password_generator",
            "default_otp_delivery_mechanism",
            "default_single_use_token_validity_duration",
        ])
        .required(&["password_generator"]),
    Variant::new("validate-totp-password")
        .attributes(&[
            "shared_secret_attribute_type",
            "time_interval_duration",
            "adjacent_intervals_to_check",
            "prevent_totp_reuse",
        ])
        .defaults(&[
            ("time_interval_duration", DefaultValue::String("30 s")),
            ("adjacent_intervals_to_check", DefaultValue::Int(2)),
            ("prevent_totp_reuse", DefaultValue::Bool(false)),
        ]),
    Variant::new("replace-certificate")
        .attributes(&[
            "allow_remotely_provided_certificates",
            "connection_criteria",
            "request_criteria",
        ])
        .defaults(&[(
            "allow_remotely_provided_certificates",
            DefaultValue::Bool(false),
        )]),
    Variant::new("generate-password")
        .attributes(&[
            "default_password_policy",
            "default_password_generator",
            "maximum_passwords_per_request",
            "maximum_validation_attempts_per_password",
        ])
        .required(&["default_password_generator"])
        .defaults(&[
            ("maximum_passwords_per_request", DefaultValue::Int(1)),
            ("maximum_validation_attempts_per_password", DefaultValue::Int(5)),
        ]),
    Variant::new("collect-support-data"),
    Variant::new("export-reversible-passwords"),
    Variant::new("custom").read_only(),
    Variant::new("get-password-quality-requirements"),
    Variant::new("password-modify")
        .attributes(&["identity_mapper"])
        .required(&["identity_mapper"]),
    Variant::new("password-policy-state"),
    Variant::new("third-party")
        .attributes(&["extension_class", "extension_argument"])
        .required(&["extension_class"]),
    Variant::new("multi-update").attributes(&["allowed_operation"]),
    Variant::new("notification-subscription"),
    Variant::new("start-tls"),
    Variant::new("deliver-otp")
        .attributes(&[
            "identity_mapper",
            "password_generator",
            "default_otp_delivery_mechanism",
        ])
        .required(&["identity_mapper", "password_generator"]),
    Variant::new("deliver-password-reset-token")
        .attributes(&[
            "password_generator",
            "default_token_delivery_mechanism",
            "password_reset_token_validity_duration",
        ])
        .required(&["password_generator"]),
    Variant::new("get-password-policy-state-issues").since(ProductVersion::V9_2),
];

pub fn family() -> ConfigFamily {
    let type_names: Vec<&str> = VARIANTS.iter().map(|v| v.type_name).collect();

    let schema = base_schema(
        "pingdirectory_extended_operation_handler",
        &type_names,
        "Manages a Extended Operation Handler.",
    )
    .attribute(
        property("identity_mapper", AttributeType::String).with_description(
            "Specifies the name of the identity mapper that should be used in conjunction with authorization identities.",
        ),
    )
    .attribute(
        property("password_generator", AttributeType::String)
            .with_description("The password generator that will be used to create one-time passwords or tokens."),
    )
    .attribute(
        property("default_otp_delivery_mechanism", AttributeType::string_set())
            .with_provider_name("defaultOTPDeliveryMechanism")
            .with_description("The set of delivery mechanisms used when the request does not name any."),
    )
    .attribute(
        property("default_single_use_token_validity_duration", types::duration())
            .with_description("The default length of time that a single-use token will be considered valid."),
    )
    .attribute(
        property("default_token_delivery_mechanism", AttributeType::string_set())
            .with_description("The set of delivery mechanisms used for password reset tokens when the request does not name any."),
    )
    .attribute(
        property("password_reset_token_validity_duration", types::duration())
            .with_description("The maximum length of time that a password reset token should be considered valid."),
    )
    .attribute(
        property("shared_secret_attribute_type", AttributeType::String)
            .with_description("The name or OID of the attribute type that holds the TOTP shared secret."),
    )
    .attribute(
        property("time_interval_duration", types::duration())
            .with_description("The duration of the time interval used for TOTP processing."),
    )
    .attribute(
        property("adjacent_intervals_to_check", types::non_negative_int())
            .with_description("The number of adjacent time intervals that should be checked around the current interval."),
    )
    .attribute(
        property("prevent_totp_reuse", AttributeType::Bool)
            .with_provider_name("preventTOTPReuse")
            .with_description("Indicates whether to prevent a TOTP password from being used more than once."),
    )
    .attribute(
        property("allow_remotely_provided_certificates", AttributeType::Bool)
            .with_description("Indicates whether clients may provide a new listener certificate chain in the request."),
    )
    .attribute(
        property(
            "allowed_operation",
            AttributeType::Set(Box::new(AttributeType::enumeration(ALLOWED_OPERATIONS))),
        )
        .with_description("The types of operations that may be included in a multi-update request."),
    )
    .attribute(
        property("connection_criteria", AttributeType::String)
            .with_description("A set of criteria that client connections must satisfy to use this handler."),
    )
    .attribute(
        property("request_criteria", AttributeType::String)
            .with_description("A set of criteria that requests must satisfy to be processed by this handler."),
    )
    .attribute(
        property("default_password_policy", AttributeType::String)
            .with_description("The password policy used when no target user is specified."),
    )
    .attribute(
        property("default_password_generator", AttributeType::String)
            .with_description("The default password generator used when no password policy is involved."),
    )
    .attribute(
        property("maximum_passwords_per_request", types::positive_int())
            .with_description("The maximum number of passwords that may be generated in a single request."),
    )
    .attribute(
        property("maximum_validation_attempts_per_password", types::non_negative_int())
            .with_description("The maximum number of attempts to generate a password that passes validation."),
    )
    .attribute(
        property("extension_class", AttributeType::String)
            .with_description("The fully-qualified name of the Java class providing the logic for the Third Party Extended Operation Handler."),
    )
    .attribute(
        property("extension_argument", AttributeType::string_set())
            .with_description("The set of arguments used to customize the behavior for the Third Party Extended Operation Handler."),
    );

    ConfigFamily {
        resource_type: RESOURCE_TYPE,
        display_name: "Extended Operation Handler",
        endpoint: "extended-operation-handlers",
        name_property: "handlerName",
        schema_urn_prefix: URN_PREFIX,
        variants: VARIANTS,
        schema: with_server_defaults(schema),
    }
}
