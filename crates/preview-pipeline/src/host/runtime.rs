//! Runtime libraries and page chrome loaded into every sandbox document

use crate::platform::Platform;

/// Base theme applied before any component styles
pub const PREVIEW_THEME_CSS: &str =
    "body { margin: 0; background-color: #1e1e1e; color: #ffffff; font-family: sans-serif; }";

pub mod react {
    pub const REACT: &str = "https://unpkg.com/react@18/umd/react.development.js";
    pub const REACT_DOM: &str = "https://unpkg.com/react-dom@18/umd/react-dom.development.js";
    /// Firebase v8 namespaced SDK, the last one exposing `window.firebase`
    pub const FIREBASE_APP: &str = "https://www.gstatic.com/firebasejs/8.10.1/firebase-app.js";
    pub const FIREBASE_FIRESTORE: &str =
        "https://www.gstatic.com/firebasejs/8.10.1/firebase-firestore.js";
}

pub mod vue {
    pub const VUE: &str = "https://unpkg.com/vue@3/dist/vue.global.js";
}

/// Script URLs loaded, in order, before the component script runs
pub fn runtime_scripts(platform: Platform) -> &'static [&'static str] {
    match platform {
        Platform::React => &[
            react::REACT,
            react::REACT_DOM,
            react::FIREBASE_APP,
            react::FIREBASE_FIRESTORE,
        ],
        Platform::Vue => &[vue::VUE],
    }
}

/// Element id the component mounts into
pub fn mount_element_id(platform: Platform) -> &'static str {
    match platform {
        Platform::React => "root",
        Platform::Vue => "app",
    }
}

pub fn document_title(platform: Platform) -> &'static str {
    match platform {
        Platform::React => "App Preview",
        Platform::Vue => "Vue Preview",
    }
}

/// Placeholder Firebase project so components calling `firebase.firestore()` can start
pub(crate) const FIREBASE_BOOTSTRAP: &str = r#"
      const firebaseConfig = {
        apiKey: "AIza...",
        authDomain: "project.firebaseapp.com",
        projectId: "project-id",
      };

      if (typeof firebase !== 'undefined' && !firebase.apps.length) {
        try {
          firebase.initializeApp(firebaseConfig);
        } catch (e) {
          console.error("Firebase initialization error", e);
        }
      } else if (typeof firebase === 'undefined') {
        console.error("Firebase SDK not loaded.");
      }
"#;
