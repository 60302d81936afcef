use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::TailorError;

/// Template family. The dialect decides heading markup, a few section titles and the
/// skills layout; the surrounding document comes from the template text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Jake's resume: numbered `\section`, compact skills block.
    #[default]
    Jake,
    /// Mirage: unnumbered `\section*`, itemized skills.
    Mirage,
}

impl Dialect {
    pub const ALL: [Dialect; 2] = [Dialect::Jake, Dialect::Mirage];

    pub fn name(self) -> &'static str {
        match self {
            Dialect::Jake => "jake",
            Dialect::Mirage => "mirage",
        }
    }

    pub fn section_command(self) -> &'static str {
        match self {
            Dialect::Jake => r"\section",
            Dialect::Mirage => r"\section*",
        }
    }

    pub fn heading(self, title: &str) -> String {
        format!("{}{{{}}}", self.section_command(), title)
    }

    pub fn experience_title(self) -> &'static str {
        match self {
            Dialect::Jake => "Experience",
            Dialect::Mirage => "Professional Experience",
        }
    }

    pub fn skills_title(self) -> &'static str {
        match self {
            Dialect::Jake => "Skills",
            Dialect::Mirage => r"Skills \& Interests",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = TailorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jake" => Ok(Dialect::Jake),
            "mirage" => Ok(Dialect::Mirage),
            other => Err(TailorError::InvalidArgument(format!(
                "unknown template '{other}', expected one of: jake, mirage"
            ))),
        }
    }
}
