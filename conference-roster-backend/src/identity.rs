use sha2::{Digest, Sha256};

/// Storage key of a participant. Only the identity tuple goes in, so the same
/// person keeps the same key across imports whatever else changes in the feed.
/// Collisions are not handled.
#[must_use]
pub fn participant_id(
    last_name: &str,
    first_name: &str,
    suffix: &str,
    registration_number: &str,
) -> String {
    let tuple = [last_name, first_name, suffix, registration_number]
        .join("\0")
        .to_lowercase();
    format!("{:x}", Sha256::digest(tuple.as_bytes()))
}
