//! Template selection by name and version.

use eyre::{Result, eyre};
use loam_core::Version;

use crate::Template;

/// Template used when a manifest does not name one.
pub const DEFAULT_TEMPLATE: &str = "basic";

/// Registered templates, selectable by a `name` or `name@X.Y.Z` reference.
///
/// Several versions of one template may be registered. A bare name selects
/// the highest registered version; a versioned reference selects the highest
/// version compatible with it (same major, not older).
#[derive(Default)]
pub struct TemplateRegistry {
    templates: Vec<Box<dyn Template>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template.
    pub fn register(&mut self, template: impl Template + 'static) {
        self.templates.push(Box::new(template));
    }

    /// Register a template (builder style).
    pub fn with(mut self, template: impl Template + 'static) -> Self {
        self.register(template);
        self
    }

    /// Registered `name@version` references, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.templates
            .iter()
            .map(|t| format!("{}@{}", t.name(), t.version()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Select a template by reference, or the default template when `None`.
    pub fn select(&self, reference: Option<&str>) -> Result<&dyn Template> {
        let reference = reference.unwrap_or(DEFAULT_TEMPLATE).trim();
        let (name, wanted) = match reference.split_once('@') {
            Some((name, version)) => {
                let version: Version = version
                    .parse()
                    .map_err(|e| eyre!("invalid template reference '{}': {}", reference, e))?;
                (name, Some(version))
            }
            None => (reference, None),
        };

        let candidates = self.templates.iter().filter(|t| t.name() == name);
        let selected = match wanted {
            Some(wanted) => candidates
                .filter(|t| t.version().is_compatible_with(&wanted))
                .max_by_key(|t| t.version()),
            None => candidates.max_by_key(|t| t.version()),
        };

        selected.map(|t| &**t).ok_or_else(|| {
            let available = self.names();
            if available.is_empty() {
                eyre!("template '{}' not found: no templates registered", reference)
            } else {
                eyre!(
                    "template '{}' not found, available: {}",
                    reference,
                    available.join(", ")
                )
            }
        })
    }
}

impl std::fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("templates", &self.names())
            .finish()
    }
}
