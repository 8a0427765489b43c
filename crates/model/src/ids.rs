use uuid::Uuid;

/// Source of fresh, stable action identifiers.
pub trait IdSource {
    fn next_id(&mut self) -> String;
}

/// Uppercase random v4 UUIDs, the form the consumer writes itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().hyphenated().to_string().to_uppercase()
    }
}

/// Deterministic UUID-shaped ids (`...-000000000001`, `...-000000000002`, ...).
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    issued: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.issued
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> String {
        self.issued += 1;
        format!("00000000-0000-4000-8000-{:012X}", self.issued)
    }
}

impl<T: IdSource + ?Sized> IdSource for &mut T {
    fn next_id(&mut self) -> String {
        (**self).next_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_are_reproducible() {
        let mut a = SequentialIds::new();
        let mut b = SequentialIds::new();
        let first: Vec<String> = (0..3).map(|_| a.next_id()).collect();
        let second: Vec<String> = (0..3).map(|_| b.next_id()).collect();
        assert_eq!(first, second);
        assert_eq!(first[0], "00000000-0000-4000-8000-000000000001");
        assert_eq!(a.issued(), 3);
    }

    #[test]
    fn random_ids_parse_as_uuids() {
        let id = RandomIds.next_id();
        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(id, id.to_uppercase());
        assert_ne!(id, RandomIds.next_id());
    }
}
