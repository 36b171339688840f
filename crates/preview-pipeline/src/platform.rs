//! Target platforms and the modules each sandbox can resolve

use serde::{Deserialize, Serialize};

/// Component dialect the builder is generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Flat JSX module with a default-exported component
    #[default]
    React,
    /// Single-file component with `<template>`, `<script>` and `<style>` sections
    Vue,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::React => "react",
            Platform::Vue => "vue",
        }
    }

    /// Language tag used for code fences and the editor
    pub fn code_language(&self) -> &'static str {
        match self {
            Platform::React => "jsx",
            Platform::Vue => "vue",
        }
    }

    /// Modules the sandbox `require` can resolve for this platform
    pub fn sandbox_modules(&self) -> &'static [SandboxModule] {
        match self {
            Platform::React => &[SandboxModule::React, SandboxModule::FirebaseFirestore],
            Platform::Vue => &[SandboxModule::Vue],
        }
    }

    /// Resolve a module specifier against this platform's allow-list
    pub fn resolve_module(&self, specifier: &str) -> Option<SandboxModule> {
        self.sandbox_modules()
            .iter()
            .copied()
            .find(|module| module.specifier() == specifier)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "react" => Ok(Platform::React),
            "vue" => Ok(Platform::Vue),
            other => Err(format!("Unknown platform: {}", other)),
        }
    }
}

/// A module the sandboxed `require` knows how to hand out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SandboxModule {
    React,
    FirebaseFirestore,
    Vue,
}

impl SandboxModule {
    /// Specifier as written in `import ... from '<specifier>'`
    pub fn specifier(&self) -> &'static str {
        match self {
            SandboxModule::React => "react",
            SandboxModule::FirebaseFirestore => "firebase/firestore",
            SandboxModule::Vue => "vue",
        }
    }

    /// Sandbox expression that must be truthy before resolving
    pub(crate) fn guard(&self) -> Option<&'static str> {
        match self {
            SandboxModule::FirebaseFirestore => Some("window.firebase"),
            _ => None,
        }
    }

    /// Sandbox expression the module resolves to
    pub(crate) fn global_expression(&self) -> &'static str {
        match self {
            SandboxModule::React => "window.React",
            SandboxModule::FirebaseFirestore => "window.firebase.firestore",
            SandboxModule::Vue => "window.Vue",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_module_per_platform() {
        assert_eq!(Platform::React.resolve_module("react"), Some(SandboxModule::React));
        assert_eq!(
            Platform::React.resolve_module("firebase/firestore"),
            Some(SandboxModule::FirebaseFirestore)
        );
        assert_eq!(Platform::React.resolve_module("vue"), None);
        assert_eq!(Platform::Vue.resolve_module("vue"), Some(SandboxModule::Vue));
        assert_eq!(Platform::Vue.resolve_module("react"), None);
    }

    #[test]
    fn test_platform_from_str() {
        assert_eq!("Vue".parse::<Platform>().unwrap(), Platform::Vue);
        assert!("svelte".parse::<Platform>().is_err());
    }

    #[test]
    fn test_platform_serde() {
        assert_eq!(serde_json::to_string(&Platform::React).unwrap(), "\"react\"");
    }
}
