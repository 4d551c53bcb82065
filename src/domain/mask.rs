/// Masks personal data for log output, keeping only the first character.
#[must_use]
pub fn mask(value: &str) -> String {
    match value.chars().next() {
        Some(first) => format!("{first}***"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask() {
        assert_eq!(mask("alice@example.com"), "a***");
        assert_eq!(mask("Ölaf"), "Ö***");
        assert_eq!(mask(""), "");
    }
}
