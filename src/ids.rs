// Identifier generation

use uuid::Uuid;

/// Generate `{prefix}-{suffix}`.
///
/// The suffix is a UUIDv7 in simple form: a millisecond timestamp followed by
/// random bits, monotonic within this process.
pub fn generate_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::now_v7().simple())
}
