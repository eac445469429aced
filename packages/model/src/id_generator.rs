use crc32fast::Hasher;

/// Hash a session seed (usually the page slug) into the id prefix
pub fn seed_hash(seed: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(seed.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Observed suffixes at or above this are too close to the counter's limit
const MAX_OBSERVED: u64 = u64::MAX / 2;

/// Sequential id generator for page nodes
///
/// Ids look like `<crc32(seed)>-<n>`. The counter only moves forward, so an
/// id is never handed out twice by the same generator. Ids loaded from a host
/// document are fed through [`IdGenerator::observe`] so freshly minted ids
/// skip past them.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u64,
}

impl IdGenerator {
    pub fn new(seed: &str) -> Self {
        Self {
            seed: seed_hash(seed),
            count: 0,
        }
    }

    pub fn from_hash(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate next sequential id
    pub fn new_id(&mut self) -> String {
        self.count = self.count.saturating_add(1);
        format!("{}-{}", self.seed, self.count)
    }

    /// Advance the counter past `id` if it was minted with the same seed.
    ///
    /// Suffixes that leave no room for another id are ignored; a host id
    /// that large can't collide with anything this generator mints.
    pub fn observe(&mut self, id: &str) {
        let suffix = id
            .strip_prefix(self.seed.as_str())
            .and_then(|rest| rest.strip_prefix('-'));

        if let Some(n) = suffix.and_then(|s| s.parse::<u64>().ok()) {
            if n < MAX_OBSERVED {
                self.count = self.count.max(n);
            }
        }
    }

    /// Hashed seed shared by every id this generator mints
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Number of ids minted (or observed) so far
    pub fn count(&self) -> u64 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_hash_is_stable() {
        assert_eq!(seed_hash("landing"), seed_hash("landing"));
        assert_ne!(seed_hash("landing"), seed_hash("pricing"));
    }

    #[test]
    fn test_sequential_ids() {
        let mut gen = IdGenerator::new("page");

        let id1 = gen.new_id();
        let id2 = gen.new_id();

        assert!(id1.ends_with("-1"));
        assert!(id2.ends_with("-2"));
        assert!(id1.starts_with(gen.seed()));
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_observe_skips_existing_ids() {
        let mut gen = IdGenerator::new("page");
        let existing = format!("{}-41", gen.seed());

        gen.observe(&existing);
        gen.observe("unrelated-900");
        gen.observe(&format!("{}-7", gen.seed()));

        assert_eq!(gen.new_id(), format!("{}-42", gen.seed()));
    }

    #[test]
    fn test_observe_ignores_suffixes_near_the_limit() {
        let mut gen = IdGenerator::new("page");
        gen.observe(&format!("{}-{}", gen.seed(), u64::MAX));
        gen.observe(&format!("{}-{}", gen.seed(), u64::MAX / 2));
        gen.observe(&format!("{}-3", gen.seed()));

        assert_eq!(gen.new_id(), format!("{}-4", gen.seed()));
        assert_eq!(gen.count(), 4);
    }
}
