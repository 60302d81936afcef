//! LaTeX rendering — fills a template's `{{TOKEN}}` placeholders with generated
//! sections. Pure and deterministic: same resume, template and dialect give
//! byte-identical output.
//!
//! Tokens: `FULL_NAME`, `CONTACT_LINE`, `EDUCATION_SECTION`, `EXPERIENCE_SECTION`,
//! `PROJECTS_SECTION`, `VOLUNTEER_SECTION`, `CERTIFICATIONS_SECTION`, `SKILLS_SECTION`.
//! Unknown tokens are left in place.

pub mod dialect;
pub mod escape;
pub mod sections;
pub mod templates;

use crate::models::resume::Resume;

pub use dialect::Dialect;
pub use templates::TemplateSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placeholder {
    FullName,
    ContactLine,
    Education,
    Experience,
    Projects,
    Volunteer,
    Certifications,
    Skills,
}

impl Placeholder {
    fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "FULL_NAME" => Placeholder::FullName,
            "CONTACT_LINE" => Placeholder::ContactLine,
            "EDUCATION_SECTION" => Placeholder::Education,
            "EXPERIENCE_SECTION" => Placeholder::Experience,
            "PROJECTS_SECTION" => Placeholder::Projects,
            "VOLUNTEER_SECTION" => Placeholder::Volunteer,
            "CERTIFICATIONS_SECTION" => Placeholder::Certifications,
            "SKILLS_SECTION" => Placeholder::Skills,
            _ => return None,
        })
    }

    fn generate(self, resume: &Resume, dialect: Dialect) -> String {
        match self {
            Placeholder::FullName => sections::full_name(resume),
            Placeholder::ContactLine => sections::contact_line(resume),
            Placeholder::Education => sections::education(resume, dialect),
            Placeholder::Experience => sections::experience(resume, dialect),
            Placeholder::Projects => sections::projects(resume, dialect),
            Placeholder::Volunteer => sections::volunteer(resume, dialect),
            Placeholder::Certifications => sections::certifications(resume, dialect),
            Placeholder::Skills => sections::skills(resume, dialect),
        }
    }
}

/// Renders `resume` into `template`.
///
/// A single left-to-right scan: generated text is never rescanned, so a bullet that
/// happens to contain `{{SKILLS_SECTION}}` is emitted (escaped) rather than expanded.
pub fn render(resume: &Resume, template: &str, dialect: Dialect) -> String {
    let mut out = String::with_capacity(template.len() + 4096);
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let candidate = &rest[start + 2..];
        let name_len = candidate
            .bytes()
            .take_while(|b| b.is_ascii_uppercase() || *b == b'_')
            .count();

        if name_len > 0 && candidate[name_len..].starts_with("}}") {
            let token = &candidate[..name_len];
            match Placeholder::from_token(token) {
                Some(placeholder) => out.push_str(&placeholder.generate(resume, dialect)),
                None => out.push_str(&rest[start..start + name_len + 4]),
            }
            rest = &candidate[name_len + 2..];
        } else {
            // Plain LaTeX grouping such as `{{\bf x}}`: emit one brace and rescan.
            out.push('{');
            rest = &rest[start + 1..];
        }
    }
    out.push_str(rest);
    out
}
