//! Raw resume input as it arrives over the wire, and validated construction of the
//! [`Resume`] aggregate from it.
//!
//! Every field is optional at the serde level so that a missing required field is
//! reported as [`TailorError::MissingRequiredField`] with a precise path instead of
//! an opaque deserialization error.

use serde::Deserialize;

use crate::errors::TailorError;
use crate::models::resume::{
    Bullet, Certification, Contacts, Education, Experience, Keyword, Metrics, Project, Resume,
    Term, Volunteer,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResumeRecord {
    pub full_name: Option<String>,
    pub contacts: Option<Contacts>,
    pub education: Option<Vec<Education>>,
    pub experience: Option<Vec<ExperienceRecord>>,
    pub projects: Option<Vec<ProjectRecord>>,
    pub volunteer: Option<Vec<VolunteerRecord>>,
    pub certifications: Option<Vec<Certification>>,
    pub technologies: Option<Vec<Term>>,
    pub languages: Option<Vec<Term>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BulletRecord {
    pub text: Option<String>,
    #[serde(flatten)]
    pub metrics: Metrics,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExperienceRecord {
    pub employer: Option<String>,
    pub title: Option<String>,
    pub location: Option<String>,
    pub duration: Option<String>,
    pub bullets: Option<Vec<BulletRecord>>,
    #[serde(flatten)]
    pub metrics: Metrics,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectRecord {
    pub title: Option<String>,
    pub languages: Option<Vec<String>>,
    pub bullets: Option<Vec<BulletRecord>>,
    #[serde(flatten)]
    pub metrics: Metrics,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VolunteerRecord {
    pub organization: Option<String>,
    pub location: Option<String>,
    pub title: Option<String>,
    pub duration: Option<String>,
    pub bullets: Option<Vec<BulletRecord>>,
    #[serde(flatten)]
    pub metrics: Metrics,
}

impl TryFrom<ResumeRecord> for Resume {
    type Error = TailorError;

    fn try_from(record: ResumeRecord) -> Result<Self, Self::Error> {
        let experience = record
            .experience
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, exp)| build_experience(exp, &format!("experience[{i}]")))
            .collect::<Result<Vec<_>, _>>()?;

        let projects = record
            .projects
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, proj)| build_project(proj, &format!("projects[{i}]")))
            .collect::<Result<Vec<_>, _>>()?;

        let volunteer = record
            .volunteer
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, vol)| build_volunteer(vol, &format!("volunteer[{i}]")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Resume {
            full_name: record.full_name,
            contacts: record.contacts.unwrap_or_default(),
            education: record.education.unwrap_or_default(),
            experience,
            projects,
            volunteer,
            certifications: record.certifications.unwrap_or_default(),
            technologies: record
                .technologies
                .unwrap_or_default()
                .into_iter()
                .map(Keyword::Tech)
                .collect(),
            languages: record
                .languages
                .unwrap_or_default()
                .into_iter()
                .map(Keyword::Language)
                .collect(),
        })
    }
}

impl Resume {
    /// Deserializes and validates a resume from a JSON value.
    pub fn from_json(value: serde_json::Value) -> Result<Self, TailorError> {
        let record: ResumeRecord = serde_json::from_value(value)
            .map_err(|e| TailorError::InvalidArgument(format!("malformed resume: {e}")))?;
        Resume::try_from(record)
    }
}

fn build_experience(exp: ExperienceRecord, path: &str) -> Result<Experience, TailorError> {
    Ok(Experience {
        employer: require(exp.employer, path, "employer")?,
        title: require(exp.title, path, "title")?,
        location: require(exp.location, path, "location")?,
        duration: require(exp.duration, path, "duration")?,
        bullets: build_bullets(require(exp.bullets, path, "bullets")?, path)?,
        metrics: exp.metrics,
    })
}

fn build_project(proj: ProjectRecord, path: &str) -> Result<Project, TailorError> {
    Ok(Project {
        title: require(proj.title, path, "title")?,
        languages: require(proj.languages, path, "languages")?,
        bullets: build_bullets(require(proj.bullets, path, "bullets")?, path)?,
        metrics: proj.metrics,
    })
}

fn build_volunteer(vol: VolunteerRecord, path: &str) -> Result<Volunteer, TailorError> {
    Ok(Volunteer {
        organization: vol.organization.unwrap_or_default(),
        location: vol.location.unwrap_or_default(),
        title: vol.title.unwrap_or_default(),
        duration: vol.duration.unwrap_or_default(),
        bullets: build_bullets(vol.bullets.unwrap_or_default(), path)?,
        metrics: vol.metrics,
    })
}

fn build_bullets(records: Vec<BulletRecord>, parent: &str) -> Result<Vec<Bullet>, TailorError> {
    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            let path = format!("{parent}.bullets[{i}]");
            if let Some(imp) = record.metrics.impressiveness {
                if !(0.0..=1.0).contains(&imp) {
                    return Err(TailorError::InvalidArgument(format!(
                        "impressiveness at {path} must be within [0, 1], got {imp}"
                    )));
                }
            }
            Ok(Bullet {
                text: require(record.text, &path, "text")?,
                metrics: record.metrics,
            })
        })
        .collect()
}

fn require<T>(value: Option<T>, path: &str, field: &'static str) -> Result<T, TailorError> {
    value.ok_or_else(|| TailorError::MissingRequiredField {
        path: path.to_string(),
        field,
    })
}
