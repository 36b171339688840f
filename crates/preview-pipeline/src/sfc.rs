//! Single-file component section extraction
//!
//! Sections are found with tag-delimited patterns rather than a full parser.
//! Each pattern runs from the first opening tag to the *last* closing tag, so
//! nested `<template v-if>` blocks inside the root template stay intact.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostics::PreviewWarning;

static TEMPLATE_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<template>([\s\S]*)</template>").expect("template pattern is valid")
});
static SCRIPT_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<script>([\s\S]*)</script>").expect("script pattern is valid")
});
static STYLE_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<style.*>([\s\S]*)</style>").expect("style pattern is valid")
});
static SCRIPT_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<script>").expect("script open pattern is valid"));
static STYLE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<style[\s>]").expect("style open pattern is valid"));

/// The three sections of a single-file component. Missing sections are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SfcSections {
    pub template: String,
    pub script: String,
    pub style: String,
}

impl SfcSections {
    /// Extract sections from `source`
    pub fn parse(source: &str) -> Self {
        Self {
            template: capture(&TEMPLATE_SECTION, source),
            script: capture(&SCRIPT_SECTION, source),
            style: capture(&STYLE_SECTION, source),
        }
    }

    /// Extract sections and report repeated `<script>`/`<style>` blocks
    pub fn parse_with_warnings(source: &str) -> (Self, Vec<PreviewWarning>) {
        let sections = Self::parse(source);
        let mut warnings = Vec::new();

        for (section, opener) in [("script", &*SCRIPT_OPEN), ("style", &*STYLE_OPEN)] {
            let count = opener.find_iter(source).count();
            if count > 1 {
                log::warn!(
                    "Component has {} <{}> sections; extraction spans from the first to the last",
                    count,
                    section
                );
                warnings.push(PreviewWarning::DuplicateSection {
                    section: section.to_string(),
                });
            }
        }

        (sections, warnings)
    }
}

fn capture(pattern: &Regex, source: &str) -> String {
    pattern
        .captures(source)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTER: &str = r#"<template>
  <button @click="count++">{{ count }}</button>
</template>

<script>
export default {
  data() {
    return { count: 0 };
  }
}
</script>

<style scoped>
button { color: red; }
</style>"#;

    #[test]
    fn test_parse_all_sections() {
        let sections = SfcSections::parse(COUNTER);
        assert!(sections.template.contains("{{ count }}"));
        assert!(sections.script.contains("export default"));
        assert!(sections.style.contains("color: red"));
    }

    #[test]
    fn test_missing_sections_are_empty() {
        let sections = SfcSections::parse("<script>export default {}</script>");
        assert_eq!(sections.template, "");
        assert_eq!(sections.style, "");
        assert_eq!(sections.script, "export default {}");
    }

    #[test]
    fn test_nested_templates_stay_intact() {
        let source = "<template><div><template v-if=\"ok\"><p>yes</p></template></div></template>";
        let sections = SfcSections::parse(source);
        assert_eq!(
            sections.template,
            "<div><template v-if=\"ok\"><p>yes</p></template></div>"
        );
    }

    #[test]
    fn test_duplicate_sections_warn() {
        let source = "<script>const a = 1;</script><script>const b = 2;</script><style>p{}</style>";
        let (_, warnings) = SfcSections::parse_with_warnings(source);
        assert_eq!(
            warnings,
            vec![PreviewWarning::DuplicateSection {
                section: "script".to_string()
            }]
        );
    }

    #[test]
    fn test_single_sections_do_not_warn() {
        let (_, warnings) = SfcSections::parse_with_warnings(COUNTER);
        assert!(warnings.is_empty());
    }
}
