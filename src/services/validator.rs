use crate::models::{FormState, SplitMethod};

/// Returns every rule the form breaks, in a fixed order. Empty means valid.
pub fn validate(form: &FormState) -> Vec<String> {
    let mut errors = Vec::new();

    if form.api_key.trim().is_empty() {
        errors.push("API Key is required".to_string());
    }

    if form.prompt.trim().is_empty() {
        errors.push("Prompt cannot be empty".to_string());
    }

    if form.additional_text.trim().is_empty() {
        errors.push("Additional text cannot be empty".to_string());
    }

    if form.split_method == SplitMethod::ByCount
        && !form.parsed_split_length().is_some_and(|n| n > 0)
    {
        errors.push("Characters/words per part must be a positive number".to_string());
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> FormState {
        FormState {
            api_key: "sk-or-test".into(),
            model: "deepseek/deepseek-r1:free".into(),
            prompt: "Translate to English".into(),
            additional_text: "第一章 ...".into(),
            split_length: "1000".into(),
            ..FormState::default()
        }
    }

    #[test]
    fn valid_form_has_no_errors() {
        assert!(validate(&valid_form()).is_empty());
    }

    #[test]
    fn every_missing_field_is_reported_in_order() {
        let form = FormState {
            api_key: "  ".into(),
            prompt: String::new(),
            additional_text: "\n".into(),
            ..valid_form()
        };

        assert_eq!(
            validate(&form),
            vec![
                "API Key is required",
                "Prompt cannot be empty",
                "Additional text cannot be empty",
            ]
        );
    }

    #[test]
    fn count_split_needs_a_positive_length() {
        for bad in ["0", "-3", "abc", ""] {
            let form = FormState {
                split_method: SplitMethod::ByCount,
                split_length: bad.into(),
                ..valid_form()
            };
            assert_eq!(
                validate(&form),
                vec!["Characters/words per part must be a positive number"],
                "split length {bad:?}"
            );
        }

        for good in ["1", "250", " 4000 "] {
            let form = FormState {
                split_method: SplitMethod::ByCount,
                split_length: good.into(),
                ..valid_form()
            };
            assert!(validate(&form).is_empty(), "split length {good:?}");
        }
    }

    #[test]
    fn chapter_split_ignores_length() {
        let form = FormState {
            split_method: SplitMethod::ByChapterMarker,
            split_length: "not a number".into(),
            ..valid_form()
        };
        assert!(validate(&form).is_empty());
    }
}
