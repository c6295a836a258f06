use sha2::{Digest, Sha256};

/// Normalize and one-way hash a single identity field for the
/// Conversions API. The value is lowercased and trimmed before
/// hashing so that case and whitespace variants of the same
/// input always collapse to the same digest.
///
/// Absent or empty input yields None so the outbound payload can
/// carry an explicit null. The hash of an empty string must never
/// be sent, the upstream treats it as a real (junk) identifier.
pub fn hash_identity_field(value: Option<&str>) -> Option<String> {
    let value = value?.trim().to_lowercase();

    if value.is_empty() {
        return None;
    }

    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());

    Some(hex::encode(hasher.finalize()))
}
