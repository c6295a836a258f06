use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

/// Generate a best-effort unique event id for upstream
/// deduplication: `evt_<unix millis>_<8 hex chars>`. The random
/// suffix comes from the thread rng, which is cryptographically
/// secure, so two ids generated in the same millisecond still
/// differ with overwhelming probability.
///
/// Uniqueness is not enforced anywhere, the upstream keys its
/// dedup on this value and collisions are accepted as noise.
pub fn generate_event_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    let suffix: u32 = rand::rng().random();

    format!("evt_{}_{:08x}", millis, suffix)
}
