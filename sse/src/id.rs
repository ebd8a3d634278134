/// Supplies client identities when the caller does not provide one.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Generates random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_generator_produces_distinct_ids() {
        let generator = UuidGenerator;
        let first = generator.generate();
        assert_ne!(first, generator.generate());
        assert!(uuid::Uuid::parse_str(&first).is_ok());
    }
}
