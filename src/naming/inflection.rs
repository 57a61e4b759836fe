//! English singular/plural forms for table and navigation-property names.
//!
//! Only the last word of a compound name is inflected (`CreditProjects` ->
//! `CreditProject`), and the letter case of the original word is kept. The
//! word itself goes through the `Inflector` rule tables in lower case.

use inflector::Inflector;

use super::WORD_BOUNDARIES;

/// Singular form of `name`.
///
/// # Example
///
/// ```rust
/// use poco_codegen::naming::singularize;
///
/// assert_eq!(singularize("Credits"), "Credit");
/// assert_eq!(singularize("Categories"), "Category");
/// assert_eq!(singularize("CreditStatuses"), "CreditStatus");
/// assert_eq!(singularize("Status"), "Status");
/// ```
pub fn singularize(name: &str) -> String {
    inflect_last_word(name, |word| word.to_singular())
}

/// Plural form of `name`.
///
/// # Example
///
/// ```rust
/// use poco_codegen::naming::pluralize;
///
/// assert_eq!(pluralize("Credit"), "Credits");
/// assert_eq!(pluralize("Category"), "Categories");
/// assert_eq!(pluralize("Address"), "Addresses");
/// ```
pub fn pluralize(name: &str) -> String {
    inflect_last_word(name, |word| word.to_plural())
}

fn inflect_last_word<F>(name: &str, inflect: F) -> String
where
    F: Fn(&str) -> String,
{
    let Some(word) = convert_case::split(&name, WORD_BOUNDARIES).pop() else {
        return name.to_string();
    };
    // Trailing separators leave nothing to inflect
    if !name.ends_with(word) {
        return name.to_string();
    }
    let head = &name[..name.len() - word.len()];

    let inflected = inflect(&word.to_lowercase());
    if inflected.is_empty() {
        return name.to_string();
    }
    format!("{}{}", head, restore_case(word, &inflected))
}

/// Re-apply the case of `original` to the lower-case `inflected` word.
fn restore_case(original: &str, inflected: &str) -> String {
    let shouting = original.chars().filter(|c| c.is_alphabetic()).count() > 1
        && !original.chars().any(char::is_lowercase);
    if shouting {
        return inflected.to_uppercase();
    }
    match (original.chars().next(), inflected.chars().next()) {
        (Some(first), Some(new_first)) if first.is_uppercase() => {
            let rest = &inflected[new_first.len_utf8()..];
            format!("{}{}", new_first.to_uppercase(), rest)
        }
        _ => inflected.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singularize_regular() {
        assert_eq!(singularize("Transactors"), "Transactor");
        assert_eq!(singularize("CreditProjects"), "CreditProject");
        assert_eq!(singularize("credit_projects"), "credit_project");
        assert_eq!(singularize("Addresses"), "Address");
        assert_eq!(singularize("Batches"), "Batch");
        assert_eq!(singularize("Companies"), "Company");
    }

    #[test]
    fn test_singularize_words_ending_in_es() {
        assert_eq!(singularize("Statuses"), "Status");
        assert_eq!(singularize("CreditStatuses"), "CreditStatus");
        assert_eq!(singularize("Buses"), "Bus");
        assert_eq!(singularize("Aliases"), "Alias");
        assert_eq!(singularize("Movies"), "Movie");
        assert_eq!(singularize("Quizzes"), "Quiz");
    }

    #[test]
    fn test_singularize_keeps_singular_words() {
        for name in ["Credit", "Address", "Status", "Series"] {
            assert_eq!(singularize(name), name);
        }
    }

    #[test]
    fn test_pluralize_regular() {
        assert_eq!(pluralize("Day"), "Days");
        assert_eq!(pluralize("Company"), "Companies");
        assert_eq!(pluralize("Status"), "Statuses");
        assert_eq!(pluralize("Batch"), "Batches");
        assert_eq!(pluralize("Quiz"), "Quizzes");
        assert_eq!(pluralize("StudentCourse"), "StudentCourses");
    }

    #[test]
    fn test_plural_then_singular_restores_name() {
        for name in [
            "Credit", "Status", "Category", "Address", "Batch", "Quiz", "Movie", "Bus", "Alias",
        ] {
            assert_eq!(singularize(&pluralize(name)), name, "round trip of {}", name);
        }
    }

    #[test]
    fn test_upper_case_names() {
        assert_eq!(singularize("CREDITS"), "CREDIT");
        assert_eq!(pluralize("CREDIT"), "CREDITS");
        assert_eq!(singularize("CREDIT_STATUSES"), "CREDIT_STATUS");
    }

    #[test]
    fn test_degenerate_names() {
        assert_eq!(singularize(""), "");
        assert_eq!(singularize("Credits_"), "Credits_");
    }
}
