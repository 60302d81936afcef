//! Count limits applied after scoring: keep the top N bullets per entry and the top N
//! keywords per list. Entries themselves are never dropped.

use serde::Serialize;

use crate::errors::TailorError;
use crate::models::resume::Resume;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrimLimits {
    pub experience_bullets: usize,
    pub project_bullets: usize,
    pub volunteer_bullets: usize,
    pub technologies: usize,
    pub languages: usize,
}

impl Default for TrimLimits {
    fn default() -> Self {
        Self {
            experience_bullets: 7,
            project_bullets: 5,
            volunteer_bullets: 5,
            technologies: 5,
            languages: 5,
        }
    }
}

impl TrimLimits {
    /// Builds limits from caller-supplied counts. Any negative count is rejected.
    pub fn new(
        experience_bullets: i64,
        project_bullets: i64,
        volunteer_bullets: i64,
        technologies: i64,
        languages: i64,
    ) -> Result<Self, TailorError> {
        Ok(Self {
            experience_bullets: non_negative(experience_bullets, "experience bullet count")?,
            project_bullets: non_negative(project_bullets, "project bullet count")?,
            volunteer_bullets: non_negative(volunteer_bullets, "volunteer bullet count")?,
            technologies: non_negative(technologies, "technology count")?,
            languages: non_negative(languages, "language count")?,
        })
    }
}

fn non_negative(value: i64, name: &str) -> Result<usize, TailorError> {
    usize::try_from(value).map_err(|_| {
        TailorError::InvalidArgument(format!("{name} must be non-negative, got {value}"))
    })
}

/// Truncates every bullet list and keyword list to its limit, keeping the current
/// (score-sorted) prefix. Lists already within the limit are untouched.
pub fn trim(resume: &mut Resume, limits: &TrimLimits) {
    for exp in &mut resume.experience {
        exp.bullets.truncate(limits.experience_bullets);
    }
    for proj in &mut resume.projects {
        proj.bullets.truncate(limits.project_bullets);
    }
    for vol in &mut resume.volunteer {
        vol.bullets.truncate(limits.volunteer_bullets);
    }
    resume.technologies.truncate(limits.technologies);
    resume.languages.truncate(limits.languages);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{Bullet, Experience, Keyword, Metrics, Project};

    fn bullets(n: usize) -> Vec<Bullet> {
        (0..n).map(|i| Bullet::new(format!("bullet {i}"), None)).collect()
    }

    fn resume() -> Resume {
        Resume {
            experience: vec![
                Experience {
                    employer: "A".to_string(),
                    title: "T".to_string(),
                    location: "L".to_string(),
                    duration: "D".to_string(),
                    bullets: bullets(10),
                    metrics: Metrics::default(),
                },
                Experience {
                    employer: "B".to_string(),
                    title: "T".to_string(),
                    location: "L".to_string(),
                    duration: "D".to_string(),
                    bullets: bullets(2),
                    metrics: Metrics::default(),
                },
            ],
            projects: vec![Project {
                title: "P".to_string(),
                languages: vec![],
                bullets: bullets(6),
                metrics: Metrics::default(),
            }],
            technologies: (0..8).map(|i| Keyword::tech(format!("tech {i}"))).collect(),
            languages: (0..3).map(|i| Keyword::language(format!("lang {i}"))).collect(),
            ..Resume::default()
        }
    }

    #[test]
    fn test_default_limits() {
        let limits = TrimLimits::default();
        assert_eq!(limits.experience_bullets, 7);
        assert_eq!(limits.project_bullets, 5);
        assert_eq!(limits.volunteer_bullets, 5);
        assert_eq!(limits.technologies, 5);
        assert_eq!(limits.languages, 5);
    }

    #[test]
    fn test_trim_keeps_prefix_and_every_entry() {
        let mut resume = resume();
        trim(&mut resume, &TrimLimits::default());

        assert_eq!(resume.experience.len(), 2);
        assert_eq!(resume.experience[0].bullets.len(), 7);
        assert_eq!(resume.experience[0].bullets[6].text, "bullet 6");
        assert_eq!(resume.experience[1].bullets.len(), 2);
        assert_eq!(resume.projects[0].bullets.len(), 5);
        assert_eq!(resume.technologies.len(), 5);
        assert_eq!(resume.technologies[4].text(), "tech 4");
        assert_eq!(resume.languages.len(), 3);
    }

    #[test]
    fn test_zero_limit_empties_lists() {
        let mut resume = resume();
        trim(&mut resume, &TrimLimits::new(0, 0, 0, 0, 0).unwrap());
        assert_eq!(resume.experience.len(), 2);
        assert!(resume.experience.iter().all(|e| e.bullets.is_empty()));
        assert!(resume.technologies.is_empty());
        assert!(resume.languages.is_empty());
    }

    #[test]
    fn test_negative_limit_is_invalid_argument() {
        let err = TrimLimits::new(7, 5, -1, 5, 5).unwrap_err();
        match err {
            TailorError::InvalidArgument(msg) => assert!(msg.contains("volunteer")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_trim_is_idempotent() {
        let mut resume = resume();
        let limits = TrimLimits::default();
        trim(&mut resume, &limits);
        let once = resume.clone();
        trim(&mut resume, &limits);
        assert_eq!(resume, once);
    }
}
