//! Instruction text sent to the generation model.

use crate::style::{LANGUAGES, NormalizedStyle};

pub const GENERATE: &str = include_str!("../data/prompts/generate.txt");

const FALLBACK_MOOD_RULE: &str = "Keep it engaging.";

/// Replace `{{key}}` placeholders in a template string.
///
/// Substitution is single-pass: placeholder-looking text inside a substituted
/// value is left alone. Unknown placeholders are kept verbatim.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        result.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];

        let Some(close) = after_open.find("}}") else {
            rest = &rest[open..];
            break;
        };

        let key = &after_open[..close];
        match vars.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => result.push_str(value),
            None => {
                result.push_str("{{");
                result.push_str(key);
                result.push_str("}}");
            }
        }
        rest = &after_open[close + 2..];
    }

    result.push_str(rest);
    result
}

/// Assemble the generation instruction.
///
/// The mood and language display strings are the user's own (joined) wording;
/// the style rules come from the resolved keys.
pub fn build_prompt(
    focus: &str,
    mood_display: &str,
    language_display: &str,
    language_rule: Option<&str>,
    mood_rule: Option<&str>,
) -> String {
    let language_rule = language_rule
        .or_else(|| LANGUAGES.rule(LANGUAGES.default_key()))
        .unwrap_or_default();
    let mood_rule = mood_rule.unwrap_or(FALLBACK_MOOD_RULE);

    render(
        GENERATE,
        &[
            ("focus", focus),
            ("mood", mood_display),
            ("language", language_display),
            ("language_rule", language_rule),
            ("mood_rule", mood_rule),
        ],
    )
}

/// Convenience wrapper pulling the rules from resolved style keys.
pub fn build_prompt_for_style(
    focus: &str,
    mood_display: &str,
    language_display: &str,
    style: &NormalizedStyle,
) -> String {
    build_prompt(
        focus,
        mood_display,
        language_display,
        style.language_rule(),
        style.mood_rule(),
    )
}
