use rustyline::{Config, Editor, Result};

pub const USER_PROMPT: &str = "User: ";

pub fn generate_prompt(custom_prompt: Option<&str>) -> String {
    custom_prompt.unwrap_or(USER_PROMPT).to_string()
}

pub fn rl() -> Result<Editor<()>> {
    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(false)
        .build();
    Editor::with_config(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prompt_addresses_the_user() {
        assert_eq!(generate_prompt(None), "User: ");
        assert_eq!(generate_prompt(Some("> ")), "> ");
    }
}
