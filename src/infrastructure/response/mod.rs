use once_cell::sync::Lazy;
use regex::Regex;

static REASONING_TAG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<think>[\s\S]*?</think>|<think\s*/>|<reasoning>[\s\S]*?</reasoning>").unwrap()
});

static CODE_FENCE_OPEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^```[a-zA-Z]*\s*\n").unwrap());

static CODE_FENCE_CLOSE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)\n?```\s*$").unwrap());

static ACTION_SCRIPT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<script\s+type\s*=\s*['"]ai-action['"]\s*>([\s\S]*?)</script>"#).unwrap()
});

static MULTIPLE_NEWLINES_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Strip reasoning tags and markdown code fences from a model reply
pub fn clean_llm_response(response: &str) -> String {
    let cleaned = REASONING_TAG_PATTERN.replace_all(response, "");
    let cleaned = CODE_FENCE_OPEN_PATTERN.replace_all(&cleaned, "");
    let cleaned = CODE_FENCE_CLOSE_PATTERN.replace_all(&cleaned, "");
    let cleaned = cleaned.trim();

    MULTIPLE_NEWLINES_PATTERN
        .replace_all(cleaned, "\n\n")
        .to_string()
}

/// Split a reply into its visible text and the first `ai-action` script body
pub fn split_action_block(response: &str) -> (String, Option<String>) {
    match ACTION_SCRIPT_PATTERN.captures(response) {
        Some(captures) => {
            let payload = captures
                .get(1)
                .map(|m| m.as_str().trim().to_string())
                .filter(|p| !p.is_empty());
            let text = ACTION_SCRIPT_PATTERN.replace_all(response, "");
            (text.trim().to_string(), payload)
        }
        None => (response.trim().to_string(), None),
    }
}
