use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use log::info;

#[derive(Debug)]
pub enum PromptError {
    EmptyTemplate(String),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::EmptyTemplate(key) => write!(f, "Prompt template '{}' is empty", key),
            PromptError::IoError(e) => write!(f, "Prompt file IO error: {}", e),
            PromptError::JsonError(e) => write!(f, "Prompt JSON parsing error: {}", e),
        }
    }
}

impl Error for PromptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PromptError::IoError(e) => Some(e),
            PromptError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::IoError(err)
    }
}

impl From<serde_json::Error> for PromptError {
    fn from(err: serde_json::Error) -> Self {
        PromptError::JsonError(err)
    }
}

const DEFAULT_BRAND: &str = "L'Oréal";

const DEFAULT_SYSTEM_DIRECTIVE: &str =
    "You are {brand}'s Smart Product Advisor: helpful, professional, concise, and friendly. Answer with product recommendations, routine advice, and short explanations suitable for general customers. Keep answers non-technical and customer-focused. If you don't know, say you don't know and suggest contacting support. Politely refuse to answer questions unrelated to {brand} products, routines, recommendations, or beauty-related topics.";

const DEFAULT_GREETING: &str = "👋 Hello! How can I help you today?";

const DEFAULT_CLASSIFIER_INSTRUCTION: &str =
    "You are a strict classifier. Decide whether the user's question can be answered using {brand} product knowledge, routines, or brand information. Return ONLY valid JSON with two fields: { \"in_scope\": true|false, \"reason\": string }. \nRules: If the user asks about other brands only, unrelated topics (politics, sports, recipes, medical diagnosis), or requests comparisons focusing on non-{brand} brands, return in_scope: false. If the question can be answered by recommending {brand} products, routines, or brand details, return in_scope: true. Be concise.";

const DEFAULT_REFUSAL: &str =
    "I'm sorry — I can only answer questions related to {brand} products, routines, and brand information. Please ask about {brand} products or contact {brand} support for help with other brands or unrelated topics.";

const PROFILE_TEMPLATE: &str =
    "User profile: name is {name}. Address the user as {name}. Keep responses concise.";

/// Marker used to detect an existing profile message (matched case-insensitively).
pub const PROFILE_MARKER: &str = "User profile: name is";

/// Texts shared by the proxy and the chat client. Any field may be
/// overridden from a JSON file; `{brand}` is substituted on access.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PromptConfig {
    pub brand: String,
    pub system_directive: String,
    pub greeting: String,
    pub classifier_instruction: String,
    pub refusal: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            brand: DEFAULT_BRAND.to_string(),
            system_directive: DEFAULT_SYSTEM_DIRECTIVE.to_string(),
            greeting: DEFAULT_GREETING.to_string(),
            classifier_instruction: DEFAULT_CLASSIFIER_INSTRUCTION.to_string(),
            refusal: DEFAULT_REFUSAL.to_string(),
        }
    }
}

impl PromptConfig {
    fn validate(&self) -> Result<(), PromptError> {
        let fields = [
            ("system_directive", &self.system_directive),
            ("classifier_instruction", &self.classifier_instruction),
            ("refusal", &self.refusal),
        ];
        for (key, value) in fields {
            if value.trim().is_empty() {
                return Err(PromptError::EmptyTemplate(key.to_string()));
            }
        }
        Ok(())
    }

    fn with_brand(&self, template: &str) -> String {
        template.replace("{brand}", &self.brand)
    }

    pub fn system_directive(&self) -> String {
        self.with_brand(&self.system_directive)
    }

    pub fn greeting(&self) -> String {
        self.with_brand(&self.greeting)
    }

    pub fn classifier_instruction(&self) -> String {
        self.with_brand(&self.classifier_instruction)
    }

    pub fn refusal(&self) -> String {
        self.with_brand(&self.refusal)
    }
}

pub fn profile_message(name: &str) -> String {
    PROFILE_TEMPLATE.replace("{name}", name)
}

pub fn load_prompts<P: AsRef<Path>>(path: P) -> Result<PromptConfig, PromptError> {
    let file_content = fs::read_to_string(&path)?;
    let config: PromptConfig = serde_json::from_str(&file_content)?;
    config.validate()?;
    info!("Loaded prompt overrides from {}", path.as_ref().display());
    Ok(config)
}

/// Defaults when no path is configured, otherwise the file contents.
pub fn resolve_prompts(path: Option<&str>) -> Result<PromptConfig, PromptError> {
    match path {
        Some(path) => load_prompts(path),
        None => Ok(PromptConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_substitute_brand() {
        let config = PromptConfig::default();
        assert!(config.refusal().starts_with("I'm sorry — I can only answer questions related to L'Oréal products"));
        assert!(!config.classifier_instruction().contains("{brand}"));
        assert!(config.classifier_instruction().contains("\"in_scope\""));
    }

    #[test]
    fn file_overrides_only_named_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"brand": "Acme", "greeting": "Hi from {{brand}}"}}"#).unwrap();

        let config = load_prompts(file.path()).unwrap();
        assert_eq!(config.greeting(), "Hi from Acme");
        assert!(config.system_directive().starts_with("You are Acme's Smart Product Advisor"));
    }

    #[test]
    fn empty_refusal_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"refusal": "  "}}"#).unwrap();

        match load_prompts(file.path()) {
            Err(PromptError::EmptyTemplate(key)) => assert_eq!(key, "refusal"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn profile_message_names_user_twice() {
        assert_eq!(
            profile_message("Ada"),
            "User profile: name is Ada. Address the user as Ada. Keep responses concise."
        );
    }
}
