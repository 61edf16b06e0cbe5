//! Version 1 Program serializer.

use super::ProgramSerializer;

/// Serializer mounted under `/v1`; applies the shared rules unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgramSerializerV1;

impl ProgramSerializer for ProgramSerializerV1 {
    fn version(&self) -> &'static str {
        "v1"
    }
}
