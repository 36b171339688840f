//! Sandbox host document generation
//!
//! Wraps transformed component script into a complete HTML document:
//! runtime libraries, theme and component styles, an error channel to the
//! embedding page, a `require` limited to the platform's [`SandboxModule`]s,
//! and the platform's mount sequence.
//!
//! Generation never fails on account of what the component does at runtime.
//! Problems visible ahead of time (unsupported modules) become warnings;
//! everything else is reported from inside the sandbox over the channel.

pub mod runtime;

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::diagnostics::PreviewWarning;
use crate::platform::{Platform, SandboxModule};
use crate::sfc::SfcSections;

static SCRIPT_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</(script)").expect("script close pattern is valid"));

static REQUIRE_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\brequire\(\s*["']([^"']+)["']\s*\)"#).expect("require pattern is valid")
});

/// Identifies which pane and which render a document belongs to.
///
/// Both tags are echoed on every channel message so the renderer can drop
/// reports from another pane or from a superseded render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostContext {
    pub pane_id: Option<String>,
    pub generation: Option<u64>,
}

impl HostContext {
    /// Untagged context for documents opened outside any pane
    pub fn standalone() -> Self {
        Self::default()
    }

    pub fn for_pane(pane_id: impl Into<String>, generation: u64) -> Self {
        Self {
            pane_id: Some(pane_id.into()),
            generation: Some(generation),
        }
    }

    fn tag_literal(&self) -> String {
        serde_json::json!({
            "paneId": self.pane_id,
            "generation": self.generation,
        })
        .to_string()
    }
}

/// A complete sandbox document
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedDocument {
    pub platform: Platform,
    pub html: String,
    pub pane_id: Option<String>,
    pub generation: Option<u64>,
    pub warnings: Vec<PreviewWarning>,
}

/// Build the document for a transformed JSX component
pub fn generate_react_document(script: &str, ctx: &HostContext) -> GeneratedDocument {
    let mount = r#"
        const ComponentToRender = module.exports.default;
        if (!ComponentToRender) {
          throw new Error('No default export found. Make sure to use "export default YourComponent;"');
        }
        const root = ReactDOM.createRoot(document.getElementById('root'));
        root.render(React.createElement(ComponentToRender));
"#;

    let html = render_document(Platform::React, "", runtime::FIREBASE_BOOTSTRAP, script, mount, ctx);
    finish(Platform::React, html, script, ctx)
}

/// Build the document for a single-file component whose script has been transformed
pub fn generate_vue_document(
    script: &str,
    sections: &SfcSections,
    ctx: &HostContext,
) -> GeneratedDocument {
    let mount = format!(
        r#"
        const componentOptions = module.exports.default;
        if (!componentOptions) {{
          throw new Error('No default export found in <script> block. Make sure to use "export default {{ ... }}".');
        }}
        componentOptions.template = {template};
        const app = Vue.createApp(componentOptions);
        app.mount('#app');
"#,
        template = js_string(&sections.template)
    );

    let html = render_document(Platform::Vue, &sections.style, "", script, &mount, ctx);
    finish(Platform::Vue, html, script, ctx)
}

fn finish(
    platform: Platform,
    html: String,
    script: &str,
    ctx: &HostContext,
) -> GeneratedDocument {
    let mut warnings = Vec::new();
    for module in unsupported_modules(platform, script) {
        log::warn!("Component requires '{}', which the {} sandbox cannot provide", module, platform);
        warnings.push(PreviewWarning::UnsupportedModule { module });
    }
    GeneratedDocument {
        platform,
        html,
        pane_id: ctx.pane_id.clone(),
        generation: ctx.generation,
        warnings,
    }
}

fn render_document(
    platform: Platform,
    component_style: &str,
    bootstrap: &str,
    script: &str,
    mount: &str,
    ctx: &HostContext,
) -> String {
    let mut html = String::with_capacity(script.len() + 4096);

    html.push_str("<!DOCTYPE html>\n<html>\n  <head>\n    <meta charset=\"utf-8\" />\n");
    html.push_str(&format!("    <title>{}</title>\n", runtime::document_title(platform)));
    html.push_str("    <style>\n      ");
    html.push_str(runtime::PREVIEW_THEME_CSS);
    html.push('\n');
    html.push_str(component_style);
    html.push_str("\n    </style>\n  </head>\n  <body>\n");
    html.push_str(&format!(
        "    <div id=\"{}\"></div>\n",
        runtime::mount_element_id(platform)
    ));
    for src in runtime::runtime_scripts(platform) {
        html.push_str(&format!("    <script src=\"{}\"></script>\n", src));
    }

    html.push_str("    <script type=\"text/javascript\">\n");
    html.push_str(bootstrap);
    html.push_str(&channel_script(ctx));
    html.push_str("\n      try {\n");
    html.push_str(&require_script(platform));
    html.push_str(
        "\n        let exports = {};\n        const module = { exports };\n\n        (function (module, exports, require) {\n",
    );
    html.push_str(&escape_inline_script(script));
    html.push_str("\n        })(module, exports, require);\n");
    html.push_str(&escape_inline_script(mount));
    html.push_str(
        r#"
        __postToHost({ type: 'ready' });
      } catch (e) {
        __postToHost({ type: 'error', message: (e && e.stack) ? e.stack : String(e) });
        console.error(e);
      }
    </script>
  </body>
</html>
"#,
    );
    html
}

/// Error listener plus the tagged `postMessage` helper every report goes through
fn channel_script(ctx: &HostContext) -> String {
    format!(
        r#"
      var __previewTag = {tag};
      function __postToHost(payload) {{
        payload.paneId = __previewTag.paneId;
        payload.generation = __previewTag.generation;
        try {{
          window.parent.postMessage(payload, '*');
        }} catch (e) {{
          // detached window
        }}
      }}

      window.addEventListener('error', function (event) {{
        __postToHost({{
          type: 'error',
          message: event.message + (event.error ? '\n' + event.error.stack : '')
        }});
      }});
"#,
        tag = ctx.tag_literal()
    )
}

/// `require` that only resolves the platform's modules and names them when it refuses
fn require_script(platform: Platform) -> String {
    let modules = platform.sandbox_modules();
    let mut out = String::from("        const require = function (name) {\n");
    for module in modules {
        let condition = match module.guard() {
            Some(guard) => format!("name === {} && {}", js_string(module.specifier()), guard),
            None => format!("name === {}", js_string(module.specifier())),
        };
        out.push_str(&format!(
            "          if ({}) return {};\n",
            condition,
            module.global_expression()
        ));
    }
    out.push_str(&format!(
        "          throw new Error('Module not found: ' + name + {});\n        }};\n",
        js_string(&refusal_suffix(modules))
    ));
    out
}

fn refusal_suffix(modules: &[SandboxModule]) -> String {
    let names: Vec<String> = modules
        .iter()
        .map(|module| format!("'{}'", module.specifier()))
        .collect();
    let verb = if names.len() == 1 { "is" } else { "are" };
    format!(
        ". Only {} {} supported in this sandbox.",
        names.join(" and "),
        verb
    )
}

/// Distinct `require('...')` specifiers the platform cannot resolve, sorted
pub fn unsupported_modules(platform: Platform, script: &str) -> Vec<String> {
    let found: BTreeSet<&str> = REQUIRE_CALL
        .captures_iter(script)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|specifier| platform.resolve_module(specifier).is_none())
        .collect();
    found.into_iter().map(str::to_string).collect()
}

/// Keep inline script text from closing its own `<script>` element
pub fn escape_inline_script(script: &str) -> String {
    SCRIPT_CLOSE.replace_all(script, "<\\/$1").into_owned()
}

/// JSON string literal, which is also a valid script string literal
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
