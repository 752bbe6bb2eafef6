//! UUID utilities

use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Generate a fresh study identifier (hyphenated UUIDv4 text)
///
/// Uniqueness is probabilistic; callers do not check for existing ids.
pub fn new_study_id() -> String {
    generate().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_study_ids_are_well_formed_and_distinct() {
        let a = new_study_id();
        let b = new_study_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
        assert_eq!(Uuid::parse_str(&a).unwrap().get_version_num(), 4);
    }
}
