/// Key serialization traits
pub mod key;
/// Issuer key pair
pub mod pair;
