//! ID generation utilities.

use ulid::{Generator, Ulid};

use crate::error::{AppError, AppResult};

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// ULIDs are lexicographically sortable by creation time, but two IDs
    /// created within the same millisecond are ordered randomly. Use
    /// [`IdGenerator::generate_ordered`] when order matters.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate `count` IDs whose lexicographic order matches generation order.
    ///
    /// Uses a monotonic ULID generator, so IDs produced in the same
    /// millisecond are incremented instead of randomized.
    pub fn generate_ordered(&self, count: usize) -> AppResult<Vec<String>> {
        let mut generator = Generator::new();
        (0..count)
            .map(|_| {
                generator
                    .generate()
                    .map(|id| id.to_string().to_lowercase())
                    .map_err(|e| AppError::Internal(format!("ID generation failed: {e}")))
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ulid() {
        let id_gen = IdGenerator::new();
        let id1 = id_gen.generate();
        let id2 = id_gen.generate();

        assert_eq!(id1.len(), 26);
        assert_eq!(id2.len(), 26);
        assert_ne!(id1, id2);
        assert_eq!(id1, id1.to_lowercase());
    }

    #[test]
    fn test_generate_ordered_is_sorted() {
        let id_gen = IdGenerator::new();
        let ids = id_gen.generate_ordered(50).unwrap();

        assert_eq!(ids.len(), 50);
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        sorted.dedup();
        assert_eq!(sorted.len(), 50);
    }

    #[test]
    fn test_generate_ordered_empty() {
        assert!(IdGenerator::new().generate_ordered(0).unwrap().is_empty());
    }
}
