use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_MODEL: &str = "deepseek/deepseek-r1:free";

pub const DEFAULT_SPLIT_LENGTH: usize = 1000;

/// Models offered by the form when no catalogue is configured.
pub const DEFAULT_MODELS: &[&str] = &[
    "deepseek/deepseek-r1:free",
    "deepseek/deepseek-chat-v3-0324:free",
    "qwen/qwen2.5-vl-72b-instruct:free",
    "deepseek/deepseek-chat:free",
    "google/gemini-2.0-flash-lite-preview-02-05:free",
    "google/gemini-2.0-flash-exp:free",
    "google/gemini-2.0-pro-exp-02-05:free",
    "google/gemini-2.0-flash-thinking-exp:free",
    "meta-llama/llama-3.3-70b-instruct:free",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "ENG")]
    English,
    #[default]
    #[serde(rename = "中文", alias = "ZH")]
    Chinese,
    #[serde(rename = "Việt Nam", alias = "VI")]
    Vietnamese,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Chinese, Language::Vietnamese];

    /// Value sent on the wire.
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "ENG",
            Language::Chinese => "中文",
            Language::Vietnamese => "Việt Nam",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Chinese => "中文",
            Language::Vietnamese => "Việt Nam",
        }
    }

    /// English is split by words, everything else by characters.
    pub fn split_length_label(self) -> &'static str {
        match self {
            Language::English => "Words per part:",
            Language::Chinese | Language::Vietnamese => "Characters per part:",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SplitMethod {
    #[default]
    #[serde(rename = "chapter", alias = "byChapterMarker")]
    ByChapterMarker,
    #[serde(rename = "count", alias = "byCount")]
    ByCount,
}

/// Configuration sent to the splitter and, with the chunk attached, to the processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub split_method: SplitMethod,
    #[serde(default)]
    pub split_length: Option<usize>,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub additional_text: String,
}

impl RequestConfig {
    pub fn effective_split_length(&self) -> usize {
        self.split_length.unwrap_or(DEFAULT_SPLIT_LENGTH)
    }
}

/// Raw form values as the user entered them.
///
/// `split_length` keeps the typed text so that non-numeric input can be
/// reported by the validator instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub split_method: SplitMethod,
    #[serde(default, deserialize_with = "raw_text")]
    pub split_length: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub additional_text: String,
}

impl FormState {
    pub fn parsed_split_length(&self) -> Option<i64> {
        self.split_length.trim().parse().ok()
    }

    /// Converts a validated form into the configuration sent to the backend.
    pub fn to_config(&self) -> RequestConfig {
        let split_length = self
            .parsed_split_length()
            .and_then(|n| usize::try_from(n).ok())
            .filter(|n| *n > 0);

        RequestConfig {
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            language: self.language,
            split_method: self.split_method,
            split_length,
            prompt: self.prompt.clone(),
            additional_text: self.additional_text.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    #[serde(flatten)]
    pub config: RequestConfig,
    #[serde(default)]
    pub chapter: String,
    #[serde(default = "first_part")]
    pub part_number: usize,
    #[serde(default = "first_part")]
    pub total_parts: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitResponse {
    #[serde(default)]
    pub chapters: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    pub result: String,
    #[serde(default)]
    pub part_number: usize,
    #[serde(default)]
    pub total_parts: usize,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveResultsRequest {
    #[serde(default)]
    pub results: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveResultsResponse {
    pub content: String,
    pub filename: String,
    pub timestamp: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn first_part() -> usize {
    1
}

/// Accepts a JSON string, number or null and keeps its textual form.
fn raw_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn form_accepts_numeric_and_textual_split_length() {
        let numeric: FormState = serde_json::from_value(json!({ "splitLength": 800 })).unwrap();
        assert_eq!(numeric.split_length, "800");
        assert_eq!(numeric.parsed_split_length(), Some(800));

        let textual: FormState = serde_json::from_value(json!({ "splitLength": "abc" })).unwrap();
        assert_eq!(textual.parsed_split_length(), None);

        let missing: FormState = serde_json::from_value(json!({})).unwrap();
        assert_eq!(missing.split_length, "");
        assert_eq!(missing.model, DEFAULT_MODEL);
    }

    #[test]
    fn language_and_method_use_wire_names_and_aliases() {
        let form: FormState = serde_json::from_value(json!({
            "language": "VI",
            "splitMethod": "byCount",
        }))
        .unwrap();
        assert_eq!(form.language, Language::Vietnamese);
        assert_eq!(form.split_method, SplitMethod::ByCount);

        let config = form.to_config();
        let wire = serde_json::to_value(&config).unwrap();
        assert_eq!(wire["language"], "Việt Nam");
        assert_eq!(wire["splitMethod"], "count");
        assert_eq!(wire["splitLength"], serde_json::Value::Null);
    }

    #[test]
    fn process_request_flattens_config() {
        let request = ProcessRequest {
            config: FormState {
                api_key: "sk-test".into(),
                prompt: "Translate".into(),
                split_length: "50".into(),
                ..FormState::default()
            }
            .to_config(),
            chapter: "第一章".into(),
            part_number: 2,
            total_parts: 3,
        };
        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(wire["apiKey"], "sk-test");
        assert_eq!(wire["splitLength"], 50);
        assert_eq!(wire["partNumber"], 2);
        assert_eq!(wire["totalParts"], 3);
        assert_eq!(wire["chapter"], "第一章");
    }
}
