/// Identity key used to unify a person across the squad sheets and the form
/// export: trimmed, lower-cased, internal whitespace runs collapsed to single
/// spaces. Two entries match only if their keys are string-equal; there is no
/// fuzzy matching.
pub fn normalize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for word in raw.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        for ch in word.chars() {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::normalize_name;

    #[test]
    fn collapses_whitespace_and_case() {
        assert_eq!(normalize_name("  Jane   DOE "), "jane doe");
        assert_eq!(normalize_name("Jane\tDoe"), "jane doe");
    }

    #[test]
    fn is_idempotent() {
        let once = normalize_name("  Jane   Doe ");
        assert_eq!(normalize_name(&once), once);
    }

    #[test]
    fn blank_input_yields_empty_key() {
        assert_eq!(normalize_name("   "), "");
        assert_eq!(normalize_name(""), "");
    }
}
