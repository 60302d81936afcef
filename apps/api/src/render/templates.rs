use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::render::dialect::Dialect;

const JAKE_TEMPLATE: &str = include_str!("../../templates/jake_template.tex");
const MIRAGE_TEMPLATE: &str = include_str!("../../templates/mirage_template.tex");

/// One template text per dialect.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    jake: String,
    mirage: String,
}

impl TemplateSet {
    /// Templates compiled into the binary.
    pub fn builtin() -> Self {
        Self {
            jake: JAKE_TEMPLATE.to_string(),
            mirage: MIRAGE_TEMPLATE.to_string(),
        }
    }

    /// Built-in templates, overridden by `<dir>/<dialect>_template.tex` where such a
    /// file exists.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let mut set = Self::builtin();
        let Some(dir) = dir else {
            return Ok(set);
        };

        for dialect in Dialect::ALL {
            let path = dir.join(format!("{}_template.tex", dialect.name()));
            if !path.is_file() {
                continue;
            }
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read template {}", path.display()))?;
            info!("Loaded {} template from {}", dialect, path.display());
            *set.slot_mut(dialect) = text;
        }
        Ok(set)
    }

    pub fn get(&self, dialect: Dialect) -> &str {
        match dialect {
            Dialect::Jake => &self.jake,
            Dialect::Mirage => &self.mirage,
        }
    }

    fn slot_mut(&mut self, dialect: Dialect) -> &mut String {
        match dialect {
            Dialect::Jake => &mut self.jake,
            Dialect::Mirage => &mut self.mirage,
        }
    }
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self::builtin()
    }
}
