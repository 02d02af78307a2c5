pub const CLASSIFY: &str = include_str!("../data/prompts/classify.txt");
pub const GENERATE: &str = include_str!("../data/prompts/generate.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.trim().to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Instruction sent alongside the uploaded photo.
pub fn classification_prompt() -> String {
    CLASSIFY.trim().to_string()
}

/// Prompt for the text-to-image model, built from the raw (unsanitized) label.
pub fn generation_prompt(label: &str) -> String {
    render(GENERATE, &[("label", label)])
}
