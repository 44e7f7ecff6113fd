//! Prompt templates for genaniml.
//!
//! Prompts can be customized by placing an `assistant.toml` file in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub assistant: AssistantPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts used by the wildlife assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantPrompts {
    /// System prompt for picking a state name out of a query. The query follows as the user message.
    pub state_extraction: String,
    /// System prompt for context-grounded answers. Receives `{{context}}`.
    pub answer_system: String,
}

impl Default for AssistantPrompts {
    fn default() -> Self {
        Self {
            state_extraction: r#"You are a Indian State Recognition AI
I will give you a text that may contain various pieces of information. Your task is to find the name of an Indian state in it and return just the state's name. If no state is mentioned, return 'None'. The text is the next message."#
                .to_string(),

            answer_system: r#"You are a Wildlife and Environmental Law assistant specializing in Human-Wildlife Conflict Resolution. You provide legally sound, ethical, and practical advice based on national wildlife laws, environmental regulations.

**USE THIS CONTEXT FOR ANSWERING THE USER'S QUERY**
**DO NOT DEVIATE FROM THE CONTEXT**
**DO NOT ADD ANYTHING NEW APART FROM THE GIVEN CONTEXT**
CONTEXT START
{{context}}
CONTEXT END

The context provided is crucial for generating accurate and relevant responses. So please ensure to use it effectively.
Provide a step-by-step approach for the user to follow.

Include the monetary compensation amount in INR if applicable and available in the context."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let assistant_path = custom_path.join("assistant.toml");
            if assistant_path.exists() {
                let content = std::fs::read_to_string(&assistant_path)?;
                prompts.assistant = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.assistant.state_extraction.contains("{{"));
        assert!(prompts.assistant.answer_system.contains("{{context}}"));
        assert!(prompts.assistant.answer_system.contains("INR"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Asha".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Asha, you have 5 messages.");
    }

    #[test]
    fn test_provided_vars_override_custom() {
        let mut prompts = Prompts::default();
        prompts.variables.insert("region".to_string(), "India".to_string());
        prompts.variables.insert("query".to_string(), "ignored".to_string());

        let mut vars = HashMap::new();
        vars.insert("query".to_string(), "elephants".to_string());

        let rendered = prompts.render_with_custom("{{query}} in {{region}}", &vars);
        assert_eq!(rendered, "elephants in India");
    }

    #[test]
    fn test_load_custom_assistant_prompts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("assistant.toml"),
            "state_extraction = \"Find the state in the next message.\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.assistant.state_extraction, "Find the state in the next message.");
        assert!(prompts.assistant.answer_system.contains("CONTEXT START"));
    }
}
