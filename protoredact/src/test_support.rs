//! Shared fixtures for unit tests.

use std::sync::OnceLock;

use prost_reflect::{DescriptorPool, DynamicMessage, FieldDescriptor};

pub(crate) const SENSITIVE_DATA: &str = "protoredact.test.sensitive_data";
pub(crate) const SECRET: &str = "protoredact.test.secret";

const PROTO_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/proto");
const PROTO_FILES: [&str; 2] = [
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/proto/redact_test.proto"),
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/proto/redact_ext_test.proto"),
];

/// Compiles the test schema into a fresh pool.
pub(crate) fn compile() -> DescriptorPool {
    let mut compiler = protox::Compiler::new([PROTO_DIR]).unwrap();
    compiler.include_imports(true);
    compiler.open_files(PROTO_FILES).unwrap();
    compiler.descriptor_pool()
}

/// Descriptor pool compiled from `tests/proto`, shared by all unit tests.
pub(crate) fn pool() -> DescriptorPool {
    static POOL: OnceLock<DescriptorPool> = OnceLock::new();
    POOL.get_or_init(compile).clone()
}

pub(crate) fn message(name: &str) -> DynamicMessage {
    let descriptor = pool()
        .get_message_by_name(&format!("protoredact.test.{name}"))
        .unwrap();
    DynamicMessage::new(descriptor)
}

pub(crate) fn field(message_name: &str, field_name: &str) -> FieldDescriptor {
    pool()
        .get_message_by_name(&format!("protoredact.test.{message_name}"))
        .unwrap()
        .get_field_by_name(field_name)
        .unwrap()
}
