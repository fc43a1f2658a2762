//! Prompt templates for answer generation

use std::collections::HashMap;

use crate::classify::QuestionType;

/// Template for generating prompts
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    variables: Vec<String>,
}

impl PromptTemplate {
    /// Create a new prompt template
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let variables = extract_variables(&template);
        Self {
            template,
            variables,
        }
    }

    /// Fill in the template with variables
    #[must_use]
    pub fn render(&self, values: &HashMap<String, String>) -> String {
        let mut result = self.template.clone();
        for var in &self.variables {
            if let Some(value) = values.get(var) {
                result = result.replace(&format!("{{{{{var}}}}}"), value);
            }
        }
        result
    }

    /// Get required variables
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}

/// Extract variable names from template
fn extract_variables(template: &str) -> Vec<String> {
    let mut variables = Vec::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '{' && chars.peek() == Some(&'{') {
            chars.next(); // skip second '{'
            let mut var_name = String::new();
            while let Some(&ch) = chars.peek() {
                if ch == '}' {
                    chars.next();
                    if chars.peek() == Some(&'}') {
                        chars.next();
                        break;
                    }
                } else {
                    var_name.push(ch);
                    chars.next();
                }
            }
            if !var_name.is_empty() && !variables.contains(&var_name) {
                variables.push(var_name);
            }
        }
    }

    variables
}

/// Instruction templates, dispatched on visa scope first and intent second
pub struct ImmigrationPrompts;

impl ImmigrationPrompts {
    /// Welcome prompt for greetings and unscoped small talk (no document context)
    #[must_use]
    pub fn greeting() -> PromptTemplate {
        PromptTemplate::new(
            r"You are an immigration law expert assistant. The user has asked a general greeting or question. Provide a brief, friendly welcome response that introduces your capabilities.

User Question: {{query}}

Please provide a short, welcoming response (2-3 sentences) that:
1. Acknowledges their greeting
2. Briefly mentions you can help with F-1, F-2, H-1B, H-4, J-1, and J-2 visa questions
3. Encourages them to ask a specific immigration question

Keep it concise and friendly.",
        )
    }

    /// Technical questions need specific numbers, citations and deadlines
    #[must_use]
    pub fn technical() -> PromptTemplate {
        PromptTemplate::new(
            r#"You are an immigration law expert assistant. The user has asked a technical question requiring specific details, numbers, or precise information.

Context:
{{context}}

User Question: {{query}}

IMPORTANT INSTRUCTIONS:
1. Provide SPECIFIC numbers, dates, limits, and requirements when available
2. Cite exact regulatory sections (e.g., "8 CFR § 214.2(f)(10)(ii)")
3. Include specific form numbers and deadlines
4. If specific information is not in the context, clearly state what is known vs unknown
5. Provide actionable, concrete guidance
6. Use bullet points for clarity when listing requirements

Answer:"#,
        )
    }

    /// Procedural questions get a step-by-step process
    #[must_use]
    pub fn procedural() -> PromptTemplate {
        PromptTemplate::new(
            r"You are an immigration law expert assistant. The user has asked a procedural question about how to do something.

Context:
{{context}}

User Question: {{query}}

IMPORTANT INSTRUCTIONS:
1. Provide a STEP-BY-STEP process
2. Include specific form numbers and filing locations
3. Mention timelines and deadlines
4. List required documents and evidence
5. Include important tips and warnings
6. Use numbered steps for clarity
7. Mention any fees or costs involved

Answer:",
        )
    }

    /// Urgent questions prioritize immediate actions and deadlines
    #[must_use]
    pub fn emergency() -> PromptTemplate {
        PromptTemplate::new(
            r"You are an immigration law expert assistant. The user has asked an urgent/emergency question.

Context:
{{context}}

User Question: {{query}}

IMPORTANT INSTRUCTIONS:
1. Prioritize IMMEDIATE actions the user should take
2. Highlight any deadlines or time-sensitive requirements
3. Mention potential consequences if action is not taken
4. Provide contact information for USCIS or legal help if relevant
5. Be clear about what is urgent vs what can wait
6. Include any grace periods or extensions available
7. Advise consulting an immigration attorney for complex situations

Answer:",
        )
    }

    /// Comparison questions get a side-by-side analysis
    #[must_use]
    pub fn comparison() -> PromptTemplate {
        PromptTemplate::new(
            r"You are an immigration law expert assistant. The user has asked a comparison question.

Context:
{{context}}

User Question: {{query}}

IMPORTANT INSTRUCTIONS:
1. Create a clear comparison table or side-by-side analysis
2. Highlight key differences and similarities
3. Mention pros and cons of each option
4. Include specific requirements for each option
5. Provide recommendations based on common scenarios
6. Use clear formatting to distinguish between options

Answer:",
        )
    }

    /// Default context-grounded answer prompt
    #[must_use]
    pub fn default_qa() -> PromptTemplate {
        PromptTemplate::new(
            r"You are an immigration law expert assistant. Answer the user's question based on the provided legal context.

Context:
{{context}}

User Question: {{query}}

IMPORTANT INSTRUCTIONS:
1. Be accurate and helpful
2. Cite specific sources when possible
3. Provide practical guidance
4. Include relevant regulatory citations
5. Mention any important limitations or exceptions
6. Suggest next steps when appropriate

Answer:",
        )
    }

    /// Select the template for a request and render it.
    ///
    /// Unscoped (general) requests always get the greeting template; visa
    /// scoped requests dispatch on intent.
    #[must_use]
    pub fn compose(query: &str, context: &str, general: bool, intent: QuestionType) -> String {
        let template = if general {
            Self::greeting()
        } else {
            match intent {
                QuestionType::Technical => Self::technical(),
                QuestionType::Procedural => Self::procedural(),
                QuestionType::Emergency => Self::emergency(),
                QuestionType::Comparison => Self::comparison(),
                QuestionType::General => Self::default_qa(),
            }
        };

        let mut values = HashMap::new();
        values.insert("query".to_string(), query.to_string());
        values.insert("context".to_string(), context.to_string());
        template.render(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_template_variables() {
        let template = PromptTemplate::new("Q: {{query}} C: {{context}} again {{query}}");
        assert_eq!(template.variables(), ["query", "context"]);
    }

    #[test]
    fn renders_all_occurrences() {
        let template = PromptTemplate::new("{{a}} and {{a}}");
        let mut values = HashMap::new();
        values.insert("a".to_string(), "x".to_string());
        assert_eq!(template.render(&values), "x and x");
    }

    #[test]
    fn comparison_intent_selects_comparison_template() {
        let prompt = ImmigrationPrompts::compose(
            "difference between F-1 OPT and CPT",
            "Source 1: ...",
            false,
            QuestionType::Comparison,
        );
        assert!(prompt.contains("comparison question"));
        assert!(prompt.contains("difference between F-1 OPT and CPT"));
        assert!(prompt.contains("Source 1: ..."));
    }

    #[test]
    fn general_scope_wins_over_intent() {
        let prompt =
            ImmigrationPrompts::compose("hello", "", true, QuestionType::Technical);
        assert!(prompt.contains("greeting"));
        assert!(!prompt.contains("technical question"));
    }
}
