//! Fixtures shared by the integration tests.
//!
//! The schema lives in `tests/proto/` and is compiled once per
//! test binary with `protox`, which keeps custom field options in the pool.

#![allow(dead_code)]

use std::{collections::HashMap, sync::OnceLock};

use prost_reflect::{
    DescriptorPool, DynamicMessage, ExtensionDescriptor, MapKey, ReflectMessage, Value,
};
use protoredact::Annotation;

pub const SENSITIVE_DATA: &str = "protoredact.test.sensitive_data";
pub const SECRET: &str = "protoredact.test.secret";
pub const MASKED_KEYS: &str = "protoredact.test.masked_keys";

const PROTO_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/proto");
const PROTO_FILES: [&str; 2] = [
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/proto/redact_test.proto"),
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/proto/redact_ext_test.proto"),
];

/// Compiles the test schema into a fresh pool, unrelated to [`pool`].
pub fn compile() -> DescriptorPool {
    let mut compiler = protox::Compiler::new([PROTO_DIR]).expect("proto include path");
    compiler.include_imports(true);
    compiler
        .open_files(PROTO_FILES)
        .expect("test schema compiles");
    compiler.descriptor_pool()
}

pub fn pool() -> DescriptorPool {
    static POOL: OnceLock<DescriptorPool> = OnceLock::new();
    POOL.get_or_init(compile).clone()
}

/// A pool declaring `protoredact.test.Record` without any annotations.
pub fn unannotated_pool() -> DescriptorPool {
    let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/proto/unannotated");
    let mut compiler = protox::Compiler::new([dir]).expect("proto include path");
    compiler
        .open_file(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/proto/unannotated/record.proto"))
        .expect("record.proto compiles");
    compiler.descriptor_pool()
}

pub fn annotation() -> Annotation {
    Annotation::from_pool(&pool(), SENSITIVE_DATA).expect("sensitive_data extension")
}

pub fn new_message(name: &str) -> DynamicMessage {
    let descriptor = pool()
        .get_message_by_name(&format!("protoredact.test.{name}"))
        .expect("message in test schema");
    DynamicMessage::new(descriptor)
}

pub fn record() -> DynamicMessage {
    new_message("Record")
}

pub fn entry() -> DynamicMessage {
    new_message("Entry")
}

/// Sets `field` on `message` and returns it, for building trees inline.
pub fn with(mut message: DynamicMessage, field: &str, value: Value) -> DynamicMessage {
    assert!(
        message.descriptor().get_field_by_name(field).is_some(),
        "unknown field {field}"
    );
    message.set_field_by_name(field, value);
    message
}

pub fn string(value: &str) -> Value {
    Value::String(value.to_owned())
}

pub fn message(value: DynamicMessage) -> Value {
    Value::Message(value)
}

pub fn list(values: impl IntoIterator<Item = DynamicMessage>) -> Value {
    Value::List(values.into_iter().map(Value::Message).collect())
}

pub fn string_map<'a>(entries: impl IntoIterator<Item = (&'a str, Value)>) -> Value {
    Value::Map(
        entries
            .into_iter()
            .map(|(key, value)| (MapKey::String(key.to_owned()), value))
            .collect::<HashMap<_, _>>(),
    )
}

pub fn int_map(entries: impl IntoIterator<Item = (i64, Value)>) -> Value {
    Value::Map(
        entries
            .into_iter()
            .map(|(key, value)| (MapKey::I64(key), value))
            .collect::<HashMap<_, _>>(),
    )
}

/// An `Entry` with only `field_int64` set.
pub fn entry_with_int(value: i64) -> DynamicMessage {
    with(entry(), "field_int64", Value::I64(value))
}

pub fn extension(name: &str) -> ExtensionDescriptor {
    pool()
        .get_extension_by_name(&format!("protoredact.test.{name}"))
        .expect("extension in test schema")
}

/// Sets the extension `name` on `message` and returns it.
pub fn with_ext(mut message: DynamicMessage, name: &str, value: Value) -> DynamicMessage {
    message.set_extension(&extension(name), value);
    message
}
