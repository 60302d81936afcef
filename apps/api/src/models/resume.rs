//! Resume aggregate — built once per tailoring request from a [`ResumeRecord`], then
//! mutated in place by scoring, sorting and trimming.
//!
//! Ownership is strictly tree-shaped: `Resume` → section entries → `Bullet` / `Keyword`.
//!
//! [`ResumeRecord`]: crate::models::record::ResumeRecord

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Substituted for any similarity or impressiveness that has not been populated.
pub const NEUTRAL_METRIC: f64 = 0.5;

// ────────────────────────────────────────────────────────────────────────────
// Optional metrics
// ────────────────────────────────────────────────────────────────────────────

/// Relevance metrics carried by bullets and by bullet-owning entries.
/// All values live in [0, 1] once populated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub similarity: Option<f64>,
    pub impressiveness: Option<f64>,
    pub score: Option<f64>,
}

/// A named metric field, used to pick a fixed display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Similarity,
    Impressiveness,
    Score,
}

impl Metric {
    fn label(self) -> &'static str {
        match self {
            Metric::Similarity => "sim",
            Metric::Impressiveness => "imp",
            Metric::Score => "score",
        }
    }

    fn read(self, metrics: &Metrics) -> Option<f64> {
        match self {
            Metric::Similarity => metrics.similarity,
            Metric::Impressiveness => metrics.impressiveness,
            Metric::Score => metrics.score,
        }
    }
}

const ENTRY_METRICS: &[Metric] = &[Metric::Similarity, Metric::Impressiveness, Metric::Score];
const BULLET_METRICS: &[Metric] = &[Metric::Impressiveness, Metric::Similarity, Metric::Score];

impl Metrics {
    /// Formats the populated metrics in `order` as ` (sim=0.60, score=0.73)`.
    /// Returns an empty string when none of the requested fields is set.
    pub fn describe(&self, order: &[Metric]) -> String {
        let pairs: Vec<(&str, Option<f64>)> =
            order.iter().map(|m| (m.label(), m.read(self))).collect();
        format_metric_pairs(&pairs)
    }
}

fn format_metric_pairs(pairs: &[(&str, Option<f64>)]) -> String {
    let parts: Vec<String> = pairs
        .iter()
        .filter_map(|(label, value)| value.map(|v| format!("{label}={v:.2}")))
        .collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Bullets and bullet-owning entries
// ────────────────────────────────────────────────────────────────────────────

/// One achievement line. `text` never changes after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bullet {
    pub text: String,
    #[serde(flatten)]
    pub metrics: Metrics,
}

impl Bullet {
    pub fn new(text: impl Into<String>, impressiveness: Option<f64>) -> Self {
        Self {
            text: text.into(),
            metrics: Metrics {
                impressiveness,
                ..Metrics::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Experience {
    pub employer: String,
    pub title: String,
    pub location: String,
    pub duration: String,
    pub bullets: Vec<Bullet>,
    #[serde(flatten)]
    pub metrics: Metrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub title: String,
    pub languages: Vec<String>,
    pub bullets: Vec<Bullet>,
    #[serde(flatten)]
    pub metrics: Metrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Volunteer {
    pub organization: String,
    pub location: String,
    pub title: String,
    pub duration: String,
    pub bullets: Vec<Bullet>,
    #[serde(flatten)]
    pub metrics: Metrics,
}

/// Shared shape of Experience, Project and Volunteer: an ordered bullet list plus
/// entry-level metrics aggregated from those bullets.
pub trait BulletGroup {
    fn bullets(&self) -> &[Bullet];
    fn bullets_mut(&mut self) -> &mut Vec<Bullet>;
    fn metrics(&self) -> &Metrics;
    fn metrics_mut(&mut self) -> &mut Metrics;

    /// Mean bullet similarity; unset bullet values count as 0.5, no bullets gives 0.5.
    fn mean_similarity(&self) -> f64 {
        mean_or_neutral(self.bullets().iter().map(|b| b.metrics.similarity))
    }

    /// Mean bullet impressiveness, same defaulting rules as [`Self::mean_similarity`].
    fn mean_impressiveness(&self) -> f64 {
        mean_or_neutral(self.bullets().iter().map(|b| b.metrics.impressiveness))
    }
}

fn mean_or_neutral(values: impl ExactSizeIterator<Item = Option<f64>>) -> f64 {
    let count = values.len();
    if count == 0 {
        return NEUTRAL_METRIC;
    }
    let total: f64 = values.map(|v| v.unwrap_or(NEUTRAL_METRIC)).sum();
    total / count as f64
}

macro_rules! impl_bullet_group {
    ($($ty:ty),+) => {
        $(impl BulletGroup for $ty {
            fn bullets(&self) -> &[Bullet] {
                &self.bullets
            }
            fn bullets_mut(&mut self) -> &mut Vec<Bullet> {
                &mut self.bullets
            }
            fn metrics(&self) -> &Metrics {
                &self.metrics
            }
            fn metrics_mut(&mut self) -> &mut Metrics {
                &mut self.metrics
            }
        })+
    };
}

impl_bullet_group!(Experience, Project, Volunteer);

// ────────────────────────────────────────────────────────────────────────────
// Keywords
// ────────────────────────────────────────────────────────────────────────────

/// Text plus match score shared by both keyword variants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Term {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub score: Option<f64>,
}

/// A skill keyword. Technologies and languages score identically but are kept in
/// separate lists and rendered under separate labels.
#[derive(Debug, Clone, PartialEq)]
pub enum Keyword {
    Tech(Term),
    Language(Term),
}

impl Keyword {
    pub fn tech(text: impl Into<String>) -> Self {
        Keyword::Tech(Term {
            text: text.into(),
            score: None,
        })
    }

    pub fn language(text: impl Into<String>) -> Self {
        Keyword::Language(Term {
            text: text.into(),
            score: None,
        })
    }

    fn term(&self) -> &Term {
        match self {
            Keyword::Tech(term) | Keyword::Language(term) => term,
        }
    }

    fn term_mut(&mut self) -> &mut Term {
        match self {
            Keyword::Tech(term) | Keyword::Language(term) => term,
        }
    }

    pub fn text(&self) -> &str {
        &self.term().text
    }

    pub fn score(&self) -> Option<f64> {
        self.term().score
    }

    pub fn set_score(&mut self, score: f64) {
        self.term_mut().score = Some(score);
    }
}

impl Serialize for Keyword {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.term().serialize(serializer)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Display-only leaves
// ────────────────────────────────────────────────────────────────────────────

/// Grade point average, authored either as a number or as free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Gpa {
    Number(f64),
    Text(String),
}

impl Gpa {
    /// Zero, non-finite or whitespace-only GPAs are not shown.
    pub fn is_blank(&self) -> bool {
        match self {
            Gpa::Number(n) => *n == 0.0 || !n.is_finite(),
            Gpa::Text(text) => text.trim().is_empty(),
        }
    }
}

impl fmt::Display for Gpa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // 4.0 stays "4.0", not "4"
            Gpa::Number(n) if n.fract() == 0.0 => write!(f, "{n:.1}"),
            Gpa::Number(n) => write!(f, "{n}"),
            Gpa::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    #[serde(alias = "est_name")]
    pub institution: Option<String>,
    pub location: Option<String>,
    pub degree: Option<String>,
    pub gpa: Option<Gpa>,
    pub year: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certification {
    pub name: Option<String>,
    pub issuer: Option<String>,
    pub date: Option<String>,
}

/// Contact handles. `github` / `linkedin` are bare host paths such as
/// `github.com/someone`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contacts {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
}

impl Contacts {
    /// Non-empty contact values in display order: phone, email, github, linkedin.
    pub fn present(&self) -> Vec<&str> {
        [&self.phone, &self.email, &self.github, &self.linkedin]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .filter(|v| !v.is_empty())
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Aggregate root
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Resume {
    pub full_name: Option<String>,
    pub contacts: Contacts,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub projects: Vec<Project>,
    pub volunteer: Vec<Volunteer>,
    pub certifications: Vec<Certification>,
    pub technologies: Vec<Keyword>,
    pub languages: Vec<Keyword>,
}

impl Resume {
    /// All bullets in category order (experience, projects, volunteer), each entry's
    /// bullets in their current order.
    pub fn bullets(&self) -> impl Iterator<Item = &Bullet> {
        let exp = self.experience.iter().flat_map(|e| e.bullets.iter());
        let proj = self.projects.iter().flat_map(|p| p.bullets.iter());
        let vol = self.volunteer.iter().flat_map(|v| v.bullets.iter());
        exp.chain(proj).chain(vol)
    }

    /// Mutable counterpart of [`Self::bullets`], same order.
    pub fn bullets_mut(&mut self) -> impl Iterator<Item = &mut Bullet> {
        let exp = self.experience.iter_mut().flat_map(|e| e.bullets.iter_mut());
        let proj = self.projects.iter_mut().flat_map(|p| p.bullets.iter_mut());
        let vol = self.volunteer.iter_mut().flat_map(|v| v.bullets.iter_mut());
        exp.chain(proj).chain(vol)
    }

    /// Technologies followed by languages.
    pub fn keywords_mut(&mut self) -> impl Iterator<Item = &mut Keyword> {
        self.technologies
            .iter_mut()
            .chain(self.languages.iter_mut())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Plain-text summary
// ────────────────────────────────────────────────────────────────────────────

impl fmt::Display for Resume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sections: Vec<String> = Vec::new();

        let mut header = Vec::new();
        if let Some(name) = self.full_name.as_deref().filter(|n| !n.is_empty()) {
            header.push(name.to_string());
        }
        let contacts = self.contacts.present();
        if !contacts.is_empty() {
            header.push(contacts.join(" | "));
        }
        if !header.is_empty() {
            sections.push(header.join("\n"));
        }

        if !self.education.is_empty() {
            let mut lines = vec!["Education".to_string()];
            for edu in &self.education {
                let institution = edu.institution.as_deref().unwrap_or("");
                let degree = edu.degree.as_deref().unwrap_or("");
                let mut line = if !degree.is_empty() && !institution.is_empty() {
                    format!("- {degree} @ {institution}")
                } else {
                    format!("- {}{}", institution, degree)
                };
                let mut details = Vec::new();
                if let Some(location) = edu.location.as_deref().filter(|l| !l.is_empty()) {
                    details.push(location.to_string());
                }
                if let Some(gpa) = edu.gpa.as_ref().filter(|g| !g.is_blank()) {
                    details.push(format!("GPA {gpa}"));
                }
                if let Some(year) = edu.year.as_deref().filter(|y| !y.is_empty()) {
                    details.push(year.to_string());
                }
                if !details.is_empty() {
                    line.push_str(&format!(" ({})", details.join(", ")));
                }
                lines.push(line);
            }
            sections.push(lines.join("\n"));
        }

        if !self.experience.is_empty() {
            let mut lines = vec!["Experience".to_string()];
            for exp in &self.experience {
                let mut line = format!("- {} @ {}", exp.title, exp.employer);
                if !exp.duration.is_empty() {
                    line.push_str(&format!(" ({})", exp.duration));
                }
                line.push_str(&exp.metrics.describe(ENTRY_METRICS));
                lines.push(line);
                push_bullet_lines(&mut lines, &exp.bullets);
            }
            sections.push(lines.join("\n"));
        }

        if !self.projects.is_empty() {
            let mut lines = vec!["Projects".to_string()];
            for project in &self.projects {
                let mut line = format!("- {}", project.title);
                if !project.languages.is_empty() {
                    line.push_str(&format!(" [{}]", project.languages.join(", ")));
                }
                line.push_str(&project.metrics.describe(ENTRY_METRICS));
                lines.push(line);
                push_bullet_lines(&mut lines, &project.bullets);
            }
            sections.push(lines.join("\n"));
        }

        if !self.volunteer.is_empty() {
            let mut lines = vec!["Volunteer".to_string()];
            for vol in &self.volunteer {
                let mut line = format!("- {} @ {}", vol.title, vol.organization);
                if !vol.duration.is_empty() {
                    line.push_str(&format!(" ({})", vol.duration));
                }
                line.push_str(&vol.metrics.describe(ENTRY_METRICS));
                lines.push(line);
                push_bullet_lines(&mut lines, &vol.bullets);
            }
            sections.push(lines.join("\n"));
        }

        if !self.certifications.is_empty() {
            let mut lines = vec!["Certifications".to_string()];
            for cert in &self.certifications {
                let mut line = format!("- {}", cert.name.as_deref().unwrap_or(""));
                let details: Vec<&str> = [&cert.issuer, &cert.date]
                    .into_iter()
                    .filter_map(|v| v.as_deref())
                    .filter(|v| !v.is_empty())
                    .collect();
                if !details.is_empty() {
                    line.push_str(&format!(" ({})", details.join(", ")));
                }
                lines.push(line);
            }
            sections.push(lines.join("\n"));
        }

        for (label, keywords) in [
            ("Technologies", &self.technologies),
            ("Languages", &self.languages),
        ] {
            if keywords.is_empty() {
                continue;
            }
            let items: Vec<String> = keywords
                .iter()
                .map(|k| {
                    format!(
                        "{}{}",
                        k.text(),
                        format_metric_pairs(&[("score", k.score())])
                    )
                })
                .collect();
            sections.push(format!("{label}\n{}", items.join(", ")));
        }

        f.write_str(&sections.join("\n\n"))
    }
}

fn push_bullet_lines(lines: &mut Vec<String>, bullets: &[Bullet]) {
    lines.extend(
        bullets
            .iter()
            .map(|b| format!("  - {}{}", b.text, b.metrics.describe(BULLET_METRICS))),
    );
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn experience(bullets: Vec<Bullet>) -> Experience {
        Experience {
            employer: "Tech Corp".to_string(),
            title: "Software Engineer".to_string(),
            location: "San Francisco, CA".to_string(),
            duration: "Jan 2022 - Present".to_string(),
            bullets,
            metrics: Metrics::default(),
        }
    }

    #[test]
    fn test_mean_defaults_missing_values_to_neutral() {
        let exp = experience(vec![Bullet::new("a", Some(0.9)), Bullet::new("b", None)]);
        assert!((exp.mean_impressiveness() - 0.7).abs() < 1e-12);
        assert_eq!(exp.mean_similarity(), NEUTRAL_METRIC);
    }

    #[test]
    fn test_mean_of_zero_bullets_is_neutral() {
        let exp = experience(vec![]);
        assert_eq!(exp.mean_similarity(), 0.5);
        assert_eq!(exp.mean_impressiveness(), 0.5);
    }

    #[test]
    fn test_zero_is_a_real_value_not_missing() {
        let exp = experience(vec![Bullet::new("a", Some(0.0)), Bullet::new("b", Some(1.0))]);
        assert_eq!(exp.mean_impressiveness(), 0.5);
        let exp = experience(vec![Bullet::new("a", Some(0.0))]);
        assert_eq!(exp.mean_impressiveness(), 0.0);
    }

    #[test]
    fn test_bullets_iterate_in_category_order() {
        let mut resume = Resume {
            experience: vec![experience(vec![Bullet::new("e1", None), Bullet::new("e2", None)])],
            projects: vec![Project {
                title: "P".to_string(),
                languages: vec![],
                bullets: vec![Bullet::new("p1", None)],
                metrics: Metrics::default(),
            }],
            volunteer: vec![Volunteer {
                organization: "O".to_string(),
                location: String::new(),
                title: "T".to_string(),
                duration: String::new(),
                bullets: vec![Bullet::new("v1", None)],
                metrics: Metrics::default(),
            }],
            ..Resume::default()
        };
        let texts: Vec<&str> = resume.bullets().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["e1", "e2", "p1", "v1"]);
        assert_eq!(resume.bullets_mut().count(), 4);
    }

    #[test]
    fn test_keyword_accessors_share_shape() {
        let mut keywords = vec![Keyword::tech("Docker"), Keyword::language("Rust")];
        for kw in keywords.iter_mut() {
            kw.set_score(1.0);
        }
        assert_eq!(keywords[0].text(), "Docker");
        assert_eq!(keywords[1].score(), Some(1.0));
        assert!(matches!(keywords[1], Keyword::Language(_)));
    }

    #[test]
    fn test_keyword_serializes_as_plain_term() {
        let value = serde_json::to_value(Keyword::tech("Docker")).unwrap();
        assert_eq!(value, json!({"text": "Docker", "score": null}));
    }

    #[test]
    fn test_bullet_serializes_flat_metrics() {
        let bullet = Bullet::new("Shipped it", Some(0.8));
        let value = serde_json::to_value(&bullet).unwrap();
        assert_eq!(value["text"], "Shipped it");
        assert_eq!(value["impressiveness"], 0.8);
        assert!(value["similarity"].is_null());
        assert!(value["score"].is_null());
    }

    #[test]
    fn test_metrics_describe_uses_requested_order_and_skips_unset() {
        let metrics = Metrics {
            similarity: Some(0.6),
            impressiveness: None,
            score: Some(0.732),
        };
        assert_eq!(metrics.describe(ENTRY_METRICS), " (sim=0.60, score=0.73)");
        assert_eq!(Metrics::default().describe(BULLET_METRICS), "");
    }

    #[test]
    fn test_gpa_accepts_number_or_text() {
        let edu: Education = serde_json::from_value(json!({"est_name": "MIT", "gpa": "3.8"})).unwrap();
        assert_eq!(edu.institution.as_deref(), Some("MIT"));
        assert_eq!(edu.gpa.unwrap().to_string(), "3.8");
        let edu: Education = serde_json::from_value(json!({"gpa": 3.9})).unwrap();
        assert_eq!(edu.gpa, Some(Gpa::Number(3.9)));
    }

    #[test]
    fn test_display_summary_lists_sections_and_metrics() {
        let mut exp = experience(vec![Bullet::new("Built REST APIs", Some(0.9))]);
        exp.metrics.score = Some(0.75);
        let resume = Resume {
            full_name: Some("John Developer".to_string()),
            contacts: Contacts {
                phone: Some("(555) 123-4567".to_string()),
                email: Some("john@example.com".to_string()),
                github: Some(String::new()),
                linkedin: None,
            },
            experience: vec![exp],
            languages: vec![Keyword::language("Python")],
            ..Resume::default()
        };

        let text = resume.to_string();
        assert!(text.starts_with("John Developer\n(555) 123-4567 | john@example.com"));
        assert!(text.contains("- Software Engineer @ Tech Corp (Jan 2022 - Present) (score=0.75)"));
        assert!(text.contains("  - Built REST APIs (imp=0.90)"));
        assert!(text.ends_with("Languages\nPython"));
    }
}
