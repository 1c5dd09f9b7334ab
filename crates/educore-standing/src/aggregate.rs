//! Aggregation of per-course elimination flags into the student-level flag.

/// True iff any per-course flag is set. An empty set of records means the
/// student is not eliminated.
pub fn aggregate_elimination<I>(flags: I) -> bool
where
    I: IntoIterator<Item = bool>,
{
    flags.into_iter().any(|eliminated| eliminated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use educore_models::CourseId;

    #[test]
    fn empty_is_not_eliminated() {
        assert!(!aggregate_elimination(std::iter::empty()));
    }

    #[test]
    fn all_false_is_not_eliminated() {
        assert!(!aggregate_elimination([false, false, false]));
    }

    #[test]
    fn any_true_eliminates() {
        assert!(aggregate_elimination([false, true, false]));
        assert!(aggregate_elimination([true]));
    }

    #[test]
    fn works_over_a_flag_map() {
        let mut flags = HashMap::new();
        flags.insert(CourseId::new(), false);
        flags.insert(CourseId::new(), true);
        assert!(aggregate_elimination(flags.into_values()));
    }
}
