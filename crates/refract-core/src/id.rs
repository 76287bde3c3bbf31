//! Record identifier generation.

/// Field name of the implicit record identifier.
pub const ID_FIELD: &str = "_id";

/// Generates a new record identifier.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
