use crc32fast::Hasher;

/// Generate a document seed from its path using CRC32
pub fn get_document_seed(path: &str) -> String {
    let mut buff = String::from(path);
    if !path.starts_with("file://") {
        buff = format!("file://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential ID generator for nodes within a document.
///
/// IDs are stable for the lifetime of a node and never reused after
/// deletion within one session (the counter only moves forward).
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String, // Document seed (CRC32)
    count: u32,   // Sequential counter
}

impl IdGenerator {
    pub fn new(path: &str) -> Self {
        Self {
            seed: get_document_seed(path),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    /// Get document seed
    pub fn seed(&self) -> &str {
        &self.seed
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new("/wildcards.yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_seed_generation() {
        let seed1 = get_document_seed("/wildcards.yaml");
        let seed2 = get_document_seed("/wildcards.yaml");

        // Same path always generates same seed
        assert_eq!(seed1, seed2);

        // Different paths generate different seeds
        let seed3 = get_document_seed("/other.yaml");
        assert_ne!(seed1, seed3);
    }

    #[test]
    fn test_sequential_ids() {
        let mut gen = IdGenerator::new("/wildcards.yaml");

        let id1 = gen.new_id();
        let id2 = gen.new_id();
        let id3 = gen.new_id();

        // IDs are sequential
        assert!(id1.ends_with("-1"));
        assert!(id2.ends_with("-2"));
        assert!(id3.ends_with("-3"));

        // All share same seed
        let seed = gen.seed();
        assert!(id1.starts_with(seed));
        assert!(id2.starts_with(seed));
        assert!(id3.starts_with(seed));
    }
}
