use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

const SUFFIX_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const SUFFIX_LEN: usize = 9;

/// Client-local event id, `evt_<unix millis>_<9 base36 chars>`.
/// Deliberately independent of the relay's own generator: the
/// emitter always supplies an id so that the browser pixel and
/// the server report under the same deduplication key
pub fn client_event_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_CHARS[rng.random_range(0..SUFFIX_CHARS.len())] as char)
        .collect();

    format!("evt_{}_{}", millis, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_shape_matches_convention() {
        let id = client_event_id();
        let parts: Vec<&str> = id.split('_').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "evt");
        assert!(parts[1].parse::<u128>().unwrap() > 0);
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(
            parts[2]
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        );
    }

    #[test]
    fn rapid_ids_differ() {
        assert_ne!(client_event_id(), client_event_id());
    }
}
