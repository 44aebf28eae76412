//! Model name resolution.

/// Model used when nothing else is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite-preview-06-17";

/// Short name aliases for popular text models.
const ALIASES: &[(&str, &str)] = &[
    ("flash-lite", DEFAULT_MODEL),
    ("flash", "gemini-2.5-flash"),
    ("pro", "gemini-2.5-pro"),
];

/// Resolve a model name (alias or exact) to the full model identifier.
#[must_use]
pub fn resolve_model(name: &str) -> String {
    ALIASES
        .iter()
        .find(|&&(alias, _)| alias == name)
        .map_or_else(|| name.to_string(), |&(_, full)| full.to_string())
}
