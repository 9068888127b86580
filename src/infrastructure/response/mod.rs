use once_cell::sync::Lazy;
use regex::Regex;

/// Reasoning blocks and template leftovers some models emit around the answer
static ARTIFACT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"<think>[\s\S]*?</think>|<think\s*/>|<reasoning>[\s\S]*?</reasoning>|<internal>[\s\S]*?</internal>|\{\{result\}\}",
    )
    .expect("valid artifact regex")
});

static MULTIPLE_NEWLINES_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("valid newline regex"));

/// Strip model artifacts from a chat reply before it is stored or sent
pub fn clean_llm_response(response: &str) -> String {
    let without_artifacts = ARTIFACT_PATTERN.replace_all(response, "");
    MULTIPLE_NEWLINES_PATTERN
        .replace_all(without_artifacts.trim(), "\n\n")
        .to_string()
}
