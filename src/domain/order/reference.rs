use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::atomic::{AtomicU16, Ordering};

use super::value_objects::ReferenceCode;

// ============================================================================
// Order Reference Codes
// ============================================================================
//
// Format: CMD<yyyymmddHHMMSS>-<SEQ><RAND>
//   SEQ  - 4 hex digits from a per-generator wrapping counter
//   RAND - 4 Crockford base32 characters
//
// The counter makes 65,536 consecutive codes from one generator distinct even
// within the same second. The random tail separates generators in different
// processes. The orders.reference unique constraint remains the final check.
//
// ============================================================================

pub const REFERENCE_PREFIX: &str = "CMD";

const CROCKFORD: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";
const RANDOM_CHARS: usize = 4;

/// Produces order reference codes
pub trait ReferenceGenerator: Send + Sync {
    fn next_reference(&self, now: DateTime<Utc>) -> ReferenceCode;
}

#[derive(Debug)]
pub struct StampedReferenceGenerator {
    sequence: AtomicU16,
}

impl StampedReferenceGenerator {
    pub fn new() -> Self {
        Self {
            sequence: AtomicU16::new(rand::thread_rng().gen()),
        }
    }
}

impl Default for StampedReferenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceGenerator for StampedReferenceGenerator {
    fn next_reference(&self, now: DateTime<Utc>) -> ReferenceCode {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);

        let mut rng = rand::thread_rng();
        let tail: String = (0..RANDOM_CHARS)
            .map(|_| char::from(CROCKFORD[rng.gen_range(0..CROCKFORD.len())]))
            .collect();

        ReferenceCode(format!(
            "{REFERENCE_PREFIX}{}-{seq:04X}{tail}",
            now.format("%Y%m%d%H%M%S")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    #[test]
    fn test_reference_format() {
        let generator = StampedReferenceGenerator::new();
        let now = Utc.with_ymd_and_hms(2025, 6, 21, 16, 29, 31).unwrap();

        let code = generator.next_reference(now);

        assert!(code.as_str().starts_with("CMD20250621162931-"));
        assert_eq!(code.as_str().len(), "CMD20250621162931-".len() + 8);
    }

    #[test]
    fn test_sequential_references_never_repeat() {
        let generator = StampedReferenceGenerator::new();
        let now = Utc::now();

        let codes: HashSet<ReferenceCode> =
            (0..5000).map(|_| generator.next_reference(now)).collect();

        assert_eq!(codes.len(), 5000);
    }

    #[test]
    fn test_concurrent_generation_is_unique() {
        let generator = std::sync::Arc::new(StampedReferenceGenerator::new());
        let now = Utc::now();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let generator = generator.clone();
                std::thread::spawn(move || {
                    (0..1000)
                        .map(|_| generator.next_reference(now))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut codes = HashSet::new();
        for handle in handles {
            codes.extend(handle.join().unwrap());
        }

        assert_eq!(codes.len(), 4000);
    }
}
