//! Built-in prompts and starter code for each platform

use preview_pipeline::Platform;

/// First message shown in a fresh conversation
pub const GREETING: &str = "Hello! I'm your AI assistant. Tell me what kind of React or Vue application you'd like to build today. For example, you could say 'Build a to-do list app'.";

const SYSTEM_PROMPT_REACT: &str = include_str!("../prompts/system_react.md");
const SYSTEM_PROMPT_VUE: &str = include_str!("../prompts/system_vue.md");
const INITIAL_CODE_REACT: &str = include_str!("../prompts/initial_react.jsx");
const INITIAL_CODE_VUE: &str = include_str!("../prompts/initial_vue.vue");

pub fn system_prompt(platform: Platform) -> &'static str {
    match platform {
        Platform::React => SYSTEM_PROMPT_REACT,
        Platform::Vue => SYSTEM_PROMPT_VUE,
    }
}

/// Starter component loaded before the first generation
pub fn initial_code(platform: Platform) -> &'static str {
    match platform {
        Platform::React => INITIAL_CODE_REACT,
        Platform::Vue => INITIAL_CODE_VUE,
    }
}

/// Framework name used in the response schema
pub fn framework_name(platform: Platform) -> &'static str {
    match platform {
        Platform::React => "React",
        Platform::Vue => "Vue",
    }
}
