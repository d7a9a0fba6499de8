/// Placeholder replaced by the sanitized DOM.
pub const DOM_TOKEN: &str = "{{REPLACE_ME_DOM}}";
/// Placeholder replaced by the element description.
pub const DESCRIPTION_TOKEN: &str = "{{REPLACE_ME_ELEMENT_DESCRIPTION}}";

/// Instruction template with one DOM slot and one description slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the placeholders missing from the template.
    pub fn missing_tokens(&self) -> Vec<&'static str> {
        [DOM_TOKEN, DESCRIPTION_TOKEN]
            .into_iter()
            .filter(|token| !self.text.contains(token))
            .collect()
    }

    /// Fill the first occurrence of each placeholder, DOM first.
    pub fn render(&self, description: &str, dom: &str) -> String {
        self.text
            .replacen(DOM_TOKEN, dom, 1)
            .replacen(DESCRIPTION_TOKEN, description, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fills_both_slots() {
        let template = PromptTemplate::new(
            "DOM:\n{{REPLACE_ME_DOM}}\nFind: {{REPLACE_ME_ELEMENT_DESCRIPTION}}",
        );
        let prompt = template.render("Login button", "<button id=\"login-btn\"></button>");
        assert_eq!(
            prompt,
            "DOM:\n<button id=\"login-btn\"></button>\nFind: Login button"
        );
    }

    #[test]
    fn test_render_replaces_first_occurrence_only() {
        let template = PromptTemplate::new("{{REPLACE_ME_DOM}} {{REPLACE_ME_DOM}}");
        assert_eq!(template.render("x", "<p/>"), "<p/> {{REPLACE_ME_DOM}}");
    }

    #[test]
    fn test_description_is_inserted_verbatim() {
        let template = PromptTemplate::new("{{REPLACE_ME_ELEMENT_DESCRIPTION}}|{{REPLACE_ME_DOM}}");
        assert_eq!(
            template.render("the {{REPLACE_ME_DOM}} thing", "<a/>"),
            "the {{REPLACE_ME_DOM}} thing|<a/>"
        );
    }

    #[test]
    fn test_missing_tokens() {
        assert_eq!(
            PromptTemplate::new("only {{REPLACE_ME_DOM}}").missing_tokens(),
            vec![DESCRIPTION_TOKEN]
        );
        assert!(
            PromptTemplate::new("{{REPLACE_ME_DOM}}{{REPLACE_ME_ELEMENT_DESCRIPTION}}")
                .missing_tokens()
                .is_empty()
        );
    }
}
