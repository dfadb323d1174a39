//! Client-side list filtering

/// Case-insensitive substring match of `term` against any of `fields`
///
/// An empty term matches everything.
pub fn matches(term: &str, fields: &[&str]) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches() {
        assert!(matches("zomato", &["Asha", "pending", "Swiggy/Zomato"]));
        assert!(matches("ZOMATO", &["swiggy/zomato"]));
        assert!(matches("", &[]));
        assert!(!matches("postman", &["Asha", "pending"]));
        assert!(!matches("x", &[]));
    }
}
