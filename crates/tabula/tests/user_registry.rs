//! End-to-end scenario over a realistic schema: builders, keyed lists,
//! all three wire formats, and descriptor-driven reflection.

use std::sync::Arc;

use serde_json::json;
use tabula::{
    descriptor::json as descriptor_json, map_strings, EnumDescriptor, Error, FieldDescriptor,
    JsonFlavor, Serializer, StructBuilder, StructDescriptor, TypeDescriptor, Value,
    VariantDescriptor,
};

fn pet_descriptor() -> Arc<StructDescriptor> {
    StructDescriptor::new(
        "Pet",
        vec![
            FieldDescriptor::new("name", TypeDescriptor::string()),
            FieldDescriptor::new("height_in_meters", TypeDescriptor::float32()),
            FieldDescriptor::new("picture", TypeDescriptor::string()),
        ],
    )
    .unwrap()
}

fn status_descriptor() -> Arc<EnumDescriptor> {
    let trial = TypeDescriptor::Struct(
        StructDescriptor::new(
            "Trial",
            vec![FieldDescriptor::new(
                "start_time",
                TypeDescriptor::timestamp(),
            )],
        )
        .unwrap(),
    );
    EnumDescriptor::new(
        "SubscriptionStatus",
        vec![
            VariantDescriptor::constant("free", 1),
            VariantDescriptor::constant("premium", 2),
            VariantDescriptor::wrapper("trial", 3, trial),
        ],
    )
    .unwrap()
}

fn user_descriptor() -> Arc<StructDescriptor> {
    StructDescriptor::new(
        "User",
        vec![
            FieldDescriptor::new("user_id", TypeDescriptor::int32()),
            FieldDescriptor::new("name", TypeDescriptor::string()),
            FieldDescriptor::new("quote", TypeDescriptor::string()),
            FieldDescriptor::new(
                "pets",
                TypeDescriptor::list(TypeDescriptor::Struct(pet_descriptor())),
            ),
            FieldDescriptor::new(
                "subscription_status",
                TypeDescriptor::Enum(status_descriptor()),
            ),
        ],
    )
    .unwrap()
}

fn registry_descriptor() -> Arc<StructDescriptor> {
    StructDescriptor::new(
        "UserRegistry",
        vec![FieldDescriptor::new(
            "users",
            TypeDescriptor::keyed_list(
                TypeDescriptor::Struct(user_descriptor()),
                "user_id",
            )
            .unwrap(),
        )],
    )
    .unwrap()
}

fn pet(name: &str, height: f32, picture: &str) -> Value {
    StructBuilder::full(pet_descriptor())
        .set("name", Value::str(name))
        .unwrap()
        .set("height_in_meters", Value::Float32(height))
        .unwrap()
        .set("picture", Value::str(picture))
        .unwrap()
        .build()
        .unwrap()
}

fn john() -> Value {
    StructBuilder::full(user_descriptor())
        .set("user_id", Value::Int32(42))
        .unwrap()
        .set("name", Value::str("John Doe"))
        .unwrap()
        .set("quote", Value::str("Coffee is just a socially acceptable form of rage."))
        .unwrap()
        .set_elements("pets", vec![pet("Dumbo", 1.0, "🐘")])
        .unwrap()
        .set(
            "subscription_status",
            status_descriptor().constant("free").unwrap(),
        )
        .unwrap()
        .build()
        .unwrap()
}

#[test]
fn full_builder_catches_omissions() {
    let err = StructBuilder::full(user_descriptor())
        .set("user_id", Value::Int32(42))
        .unwrap()
        .build()
        .unwrap_err();
    assert_eq!(err, Error::MissingRequiredField("name".to_string()));
}

#[test]
fn partial_builder_defaults_and_matches_default_instance() {
    let jane = StructBuilder::partial(user_descriptor())
        .set("user_id", Value::Int32(43))
        .unwrap()
        .set("name", Value::str("Jane Doe"))
        .unwrap()
        .build()
        .unwrap();
    let sv = jane.as_struct().unwrap();
    assert_eq!(sv.field(2), Some(&Value::str("")));
    assert!(sv.field(3).unwrap().as_list().unwrap().is_empty());
    assert!(sv.field(4).unwrap().as_enum().unwrap().is_unknown());

    let empty = StructBuilder::partial(user_descriptor()).build().unwrap();
    let default = Value::default_of(&TypeDescriptor::Struct(user_descriptor()));
    assert_eq!(empty, default);
}

#[test]
fn copy_builder_modifies_without_restating() {
    let john = john();
    let evil = StructBuilder::from_value(user_descriptor(), &john)
        .unwrap()
        .set("name", Value::str("Evil John"))
        .unwrap()
        .set("quote", Value::str("I solemnly swear I am up to no good."))
        .unwrap()
        .build()
        .unwrap();
    let sv = evil.as_struct().unwrap();
    assert_eq!(sv.field(0), Some(&Value::Int32(42)));
    assert_eq!(sv.field(1), Some(&Value::str("Evil John")));
    // untouched list field shares storage with the original
    assert!(sv
        .field(3)
        .unwrap()
        .as_list()
        .unwrap()
        .ptr_eq(john.as_struct().unwrap().field(3).unwrap().as_list().unwrap()));
}

#[test]
fn keyed_registry_lookup_last_wins() {
    let john = john();
    let jane = StructBuilder::partial(user_descriptor())
        .set("user_id", Value::Int32(43))
        .unwrap()
        .set("name", Value::str("Jane Doe"))
        .unwrap()
        .build()
        .unwrap();
    let evil_john = StructBuilder::from_value(user_descriptor(), &john)
        .unwrap()
        .set("name", Value::str("Evil John"))
        .unwrap()
        .build()
        .unwrap();

    let registry = StructBuilder::full(registry_descriptor())
        .set_elements("users", vec![john.clone(), jane.clone(), evil_john.clone()])
        .unwrap()
        .build()
        .unwrap();
    let users = registry.as_struct().unwrap().field(0).unwrap().as_list().unwrap();

    assert_eq!(users.find_by_key(43), Some(&jane));
    // 42 appears twice; the later element wins
    assert_eq!(users.find_by_key(42), Some(&evil_john));
    assert_eq!(users.find_by_key(100), None);
}

#[test]
fn john_encodes_per_wire_contract() {
    let serializer = Serializer::new(TypeDescriptor::Struct(user_descriptor()));
    let john = john();

    let dense = serializer.to_json(&john, JsonFlavor::Dense).unwrap();
    assert_eq!(
        dense,
        json!([
            42,
            "John Doe",
            "Coffee is just a socially acceptable form of rage.",
            [["Dumbo", 1.0, "🐘"]],
            [1]
        ])
    );

    let readable = serializer.to_json(&john, JsonFlavor::Readable).unwrap();
    assert_eq!(
        readable,
        json!({
            "user_id": 42,
            "name": "John Doe",
            "quote": "Coffee is just a socially acceptable form of rage.",
            "pets": [{
                "name": "Dumbo",
                "height_in_meters": 1.0,
                "picture": "🐘"
            }],
            "subscription_status": {"kind": "free"}
        })
    );

    // one decode entry point serves both flavors
    assert_eq!(serializer.from_json(&dense).unwrap(), john);
    assert_eq!(serializer.from_json(&readable).unwrap(), john);

    let bytes = serializer.to_bytes(&john).unwrap();
    assert_eq!(serializer.from_bytes(&bytes).unwrap(), john);
}

#[test]
fn trial_status_readable_form_carries_timestamp_rendering() {
    let status = status_descriptor();
    let trial = status
        .wrap(
            "trial",
            Value::struct_of(vec![Value::timestamp(1743592409000)]),
        )
        .unwrap();
    let serializer = Serializer::new(TypeDescriptor::Enum(status));
    let readable = serializer.to_json(&trial, JsonFlavor::Readable).unwrap();
    assert_eq!(
        readable,
        json!({
            "kind": "trial",
            "value": {
                "start_time": {
                    "unix_millis": 1743592409000i64,
                    "formatted": "2025-04-02T11:13:29.000Z"
                }
            }
        })
    );
    assert_eq!(serializer.from_json(&readable).unwrap(), trial);
    let dense = serializer.to_json(&trial, JsonFlavor::Dense).unwrap();
    assert_eq!(dense, json!([3, [1743592409000i64]]));
    assert_eq!(serializer.from_json(&dense).unwrap(), trial);
}

#[test]
fn parsed_descriptor_drives_generic_decode() {
    // ship the descriptor as JSON, parse it back, and operate purely
    // reflectively on the wire data
    let desc = TypeDescriptor::Struct(user_descriptor());
    let code = descriptor_json::to_json_code(&desc);
    let parsed = descriptor_json::parse_from_json_code(&code).unwrap();
    assert_eq!(parsed, desc);

    let john = john();
    let bytes = Serializer::new(desc).to_bytes(&john).unwrap();
    let reflective = Serializer::new(parsed);
    assert_eq!(reflective.from_bytes(&bytes).unwrap(), john);
}

#[test]
fn all_strings_to_upper_case_via_reflection() {
    let desc = TypeDescriptor::Struct(user_descriptor());
    let shouted = map_strings(&john(), &desc, |s| s.to_uppercase()).unwrap();
    let sv = shouted.as_struct().unwrap();
    assert_eq!(sv.field(1), Some(&Value::str("JOHN DOE")));
    let dumbo = sv.field(3).unwrap().as_list().unwrap().get(0).unwrap();
    assert_eq!(
        dumbo.as_struct().unwrap().field(0),
        Some(&Value::str("DUMBO"))
    );
    assert_eq!(sv.field(0), Some(&Value::Int32(42)));
}
