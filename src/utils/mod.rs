/// Fixed-width byte encodings
pub mod encoding;
/// Attribute values
pub mod message;
/// Randomness helpers
pub mod random;
/// Group and field helpers
pub mod util;
