//! Section generators. Each returns a self-contained block (heading included) or an
//! empty string when the section has nothing to show.
//!
//! All user text passes through [`escape_latex`] exactly once, here.

use crate::models::resume::{Bullet, Keyword, Resume};
use crate::render::dialect::Dialect;
use crate::render::escape::{escape_latex, escape_opt, href_target};

const CONTACT_SEPARATOR: &str = " $|$ ";

/// `\href` links for phone, email, github and linkedin, in that order, skipping
/// absent or empty values.
pub fn contact_line(resume: &Resume) -> String {
    let contacts = &resume.contacts;
    let mut parts = Vec::new();

    if let Some(phone) = present(&contacts.phone) {
        let digits: String = phone
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();
        parts.push(href(&format!("tel:{digits}"), phone));
    }
    if let Some(email) = present(&contacts.email) {
        parts.push(href(&format!("mailto:{email}"), email));
    }
    if let Some(github) = present(&contacts.github) {
        parts.push(href(&format!("https://{github}"), github));
    }
    if let Some(linkedin) = present(&contacts.linkedin) {
        parts.push(href(&format!("https://{linkedin}"), linkedin));
    }

    parts.join(CONTACT_SEPARATOR)
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn href(target: &str, display: &str) -> String {
    format!(r"\href{{{}}}{{{}}}", href_target(target), escape_latex(display))
}

pub fn full_name(resume: &Resume) -> String {
    escape_opt(resume.full_name.as_deref())
}

pub fn education(resume: &Resume, dialect: Dialect) -> String {
    if resume.education.is_empty() {
        return String::new();
    }

    let entries: Vec<String> = resume
        .education
        .iter()
        .map(|edu| {
            let gpa = edu
                .gpa
                .as_ref()
                .filter(|g| !g.is_blank())
                .map(|g| format!(", GPA: {}", escape_latex(&g.to_string())))
                .unwrap_or_default();
            format!(
                "    \\resumeSubheading\n      {{{}}}{{{}}}\n      {{{}{}}}{{{}}}",
                escape_opt(edu.institution.as_deref()),
                escape_opt(edu.location.as_deref()),
                escape_opt(edu.degree.as_deref()),
                gpa,
                escape_opt(edu.year.as_deref()),
            )
        })
        .collect();

    subheading_list(dialect.heading("Education"), entries)
}

pub fn experience(resume: &Resume, dialect: Dialect) -> String {
    if resume.experience.is_empty() {
        return String::new();
    }

    let entries = resume
        .experience
        .iter()
        .map(|exp| {
            subheading_entry(
                [&exp.employer, &exp.location, &exp.title, &exp.duration],
                &exp.bullets,
            )
        })
        .collect();

    subheading_list(dialect.heading(dialect.experience_title()), entries)
}

pub fn projects(resume: &Resume, dialect: Dialect) -> String {
    if resume.projects.is_empty() {
        return String::new();
    }

    let entries = resume
        .projects
        .iter()
        .map(|proj| {
            let languages = proj
                .languages
                .iter()
                .map(|l| escape_latex(l))
                .collect::<Vec<_>>()
                .join(", ");
            let mut heading = format!(r"\textbf{{{}}}", escape_latex(&proj.title));
            if !languages.is_empty() {
                heading.push_str(&format!(r" $|$ \emph{{{languages}}}"));
            }

            let mut lines = vec![
                "    \\resumeProjectHeading".to_string(),
                format!("      {{{heading}}}{{}}"),
            ];
            lines.extend(item_list(&proj.bullets));
            lines.join("\n")
        })
        .collect();

    subheading_list(dialect.heading("Projects"), entries)
}

pub fn volunteer(resume: &Resume, dialect: Dialect) -> String {
    if resume.volunteer.is_empty() {
        return String::new();
    }

    let entries = resume
        .volunteer
        .iter()
        .map(|vol| {
            subheading_entry(
                [&vol.organization, &vol.location, &vol.title, &vol.duration],
                &vol.bullets,
            )
        })
        .collect();

    subheading_list(dialect.heading("Volunteer Work"), entries)
}

pub fn certifications(resume: &Resume, dialect: Dialect) -> String {
    if resume.certifications.is_empty() {
        return String::new();
    }

    let lines: Vec<String> = resume
        .certifications
        .iter()
        .map(|cert| {
            let mut left = format!(r"\textbf{{{}}}", escape_opt(cert.name.as_deref()));
            if let Some(issuer) = present(&cert.issuer) {
                left.push_str(" -- ");
                left.push_str(&escape_latex(issuer));
            }
            format!(
                "    {} \\hfill {}\\\\",
                left,
                escape_opt(cert.date.as_deref())
            )
        })
        .collect();

    format!("{}\n{}", dialect.heading("Certifications"), lines.join("\n"))
}

pub fn skills(resume: &Resume, dialect: Dialect) -> String {
    let languages = keyword_list(&resume.languages);
    let technologies = keyword_list(&resume.technologies);
    if languages.is_empty() && technologies.is_empty() {
        return String::new();
    }

    let heading = dialect.heading(dialect.skills_title());
    match dialect {
        Dialect::Jake => {
            let mut rows = Vec::new();
            if !languages.is_empty() {
                rows.push(format!("    \\textbf{{Languages}}{{: {languages}}}"));
            }
            if !technologies.is_empty() {
                rows.push(format!("    \\textbf{{Technologies}}{{: {technologies}}}"));
            }
            format!(
                "{heading}\n \\begin{{itemize}}[leftmargin=0.15in, label={{}}]\n    \\small{{\\item{{\n{}\n    }}}}\n \\end{{itemize}}",
                rows.join(" \\\\\n")
            )
        }
        Dialect::Mirage => {
            let mut items = Vec::new();
            if !languages.is_empty() {
                items.push(format!("    \\item \\textbf{{Languages:}} {languages}"));
            }
            if !technologies.is_empty() {
                items.push(format!("    \\item \\textbf{{Technologies:}} {technologies}"));
            }
            format!(
                "{heading}\n\\begin{{itemize}}\n{}\n\\end{{itemize}}",
                items.join("\n")
            )
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shared markup
// ────────────────────────────────────────────────────────────────────────────

fn subheading_list(heading: String, entries: Vec<String>) -> String {
    format!(
        "{heading}\n  \\resumeSubHeadingListStart\n{}\n  \\resumeSubHeadingListEnd",
        entries.join("\n")
    )
}

/// `\resumeSubheading{top-left}{top-right}{bottom-left}{bottom-right}` plus bullets.
fn subheading_entry(fields: [&String; 4], bullets: &[Bullet]) -> String {
    let [top_left, top_right, bottom_left, bottom_right] = fields.map(|f| escape_latex(f));
    let mut lines = vec![
        "    \\resumeSubheading".to_string(),
        format!("      {{{top_left}}}{{{top_right}}}"),
        format!("      {{{bottom_left}}}{{{bottom_right}}}"),
    ];
    lines.extend(item_list(bullets));
    lines.join("\n")
}

/// An empty itemize does not compile, so no bullets means no list at all.
fn item_list(bullets: &[Bullet]) -> Vec<String> {
    if bullets.is_empty() {
        return Vec::new();
    }
    let mut lines = Vec::with_capacity(bullets.len() + 2);
    lines.push("      \\resumeItemListStart".to_string());
    for bullet in bullets {
        lines.push(format!("        \\resumeItem{{{}}}", escape_latex(&bullet.text)));
    }
    lines.push("      \\resumeItemListEnd".to_string());
    lines
}

fn keyword_list(keywords: &[Keyword]) -> String {
    keywords
        .iter()
        .map(Keyword::text)
        .filter(|t| !t.is_empty())
        .map(escape_latex)
        .collect::<Vec<_>>()
        .join(", ")
}
