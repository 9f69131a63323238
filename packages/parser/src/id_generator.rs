use crc32fast::Hasher;
use ulid::Ulid;

/// Generate document ID from file path using CRC32
pub fn get_document_id(path: &str) -> String {
    let mut buff = String::from(path);
    if !path.starts_with("file://") {
        buff = format!("file://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone)]
enum Mode {
    /// Timestamp plus random suffix, unique across parses
    Random,
    /// `<seed>-<n>`, deterministic for a given document
    Sequential { seed: String, count: u32 },
}

/// Issues ids for columns and cards.
///
/// Every parse of newly observed text goes through a generator, so ids are
/// never carried across a reparse.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    mode: Mode,
}

impl IdGenerator {
    pub fn random() -> Self {
        Self { mode: Mode::Random }
    }

    pub fn sequential(seed: impl Into<String>) -> Self {
        Self {
            mode: Mode::Sequential {
                seed: seed.into(),
                count: 0,
            },
        }
    }

    /// Sequential ids seeded from the document path
    pub fn for_document(path: &str) -> Self {
        Self::sequential(get_document_id(path))
    }

    pub fn column_id(&mut self) -> String {
        self.next("col")
    }

    pub fn card_id(&mut self) -> String {
        self.next("card")
    }

    fn next(&mut self, prefix: &str) -> String {
        match &mut self.mode {
            Mode::Random => format!("{}-{}", prefix, Ulid::new().to_string().to_lowercase()),
            Mode::Sequential { seed, count } => {
                *count += 1;
                format!("{}-{}", seed, count)
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::random()
    }
}
