use chrono::NaiveDate;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;
use thiserror::Error;

static PROJECTS: LazyLock<Result<Vec<Project>, ContentError>> =
    LazyLock::new(|| read_content("projects.json").and_then(|raw| parse_projects(&raw)));
static SKILLS: LazyLock<Result<Vec<Skill>, ContentError>> =
    LazyLock::new(|| read_content("skills.json").and_then(|raw| parse_skills(&raw)));
static SERVICES: LazyLock<Result<Vec<Service>, ContentError>> =
    LazyLock::new(|| read_content("services.json").and_then(|raw| parse_services(&raw)));

#[derive(Embed)]
#[folder = "content"]
pub struct Content;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    Website,
    WebApp,
}

impl ProjectKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Website => "Website",
            Self::WebApp => "Web App",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub slug: String,
    pub title: String,
    pub short_description: String,
    pub banner_image: String,
    pub tags: Vec<String>,
    pub subtitle: String,
    pub kind: ProjectKind,
    pub date: NaiveDate,
    pub categories: String,
    #[serde(default)]
    pub featured: bool,
}

impl Project {
    /// Route of the project-detail view.
    pub fn detail_href(&self) -> String {
        format!("/project-details/{}", self.slug)
    }

    pub fn display_date(&self) -> String {
        self.date.format("%B %Y").to_string()
    }

    /// Position, kind and date, e.g. `02 · Web App · March 2024`.
    pub fn summary_line(&self, position: usize) -> String {
        format!(
            "{} · {} · {}",
            index_label(position),
            self.kind.label(),
            self.display_date()
        )
    }
}

/// Zero-padded position label, e.g. `03`.
pub fn index_label(index: usize) -> String {
    format!("{index:02}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    /// Colour class, 1 through 3.
    pub tone: u8,
}

impl Skill {
    pub fn tone_class(&self) -> &'static str {
        match self.tone {
            1 => "tone-1",
            2 => "tone-2",
            _ => "tone-3",
        }
    }
}

/// An entry of the services list on the home page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub title: String,
    pub copy: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub image: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContentError {
    #[error("Content file not found: {0}")]
    NotFound(&'static str),
    #[error("Couldn't parse content: {0}")]
    ParseError(String),
    #[error("Project collection is empty")]
    Empty,
    #[error("Duplicate project slug: {0}")]
    DuplicateSlug(String),
}

fn read_content(name: &'static str) -> Result<String, ContentError> {
    let file = Content::get(name).ok_or(ContentError::NotFound(name))?;
    String::from_utf8(file.data.into()).map_err(|e| ContentError::ParseError(e.to_string()))
}

pub fn parse_projects(raw: &str) -> Result<Vec<Project>, ContentError> {
    let projects: Vec<Project> =
        serde_json::from_str(raw).map_err(|e| ContentError::ParseError(e.to_string()))?;
    if projects.is_empty() {
        return Err(ContentError::Empty);
    }
    let mut seen = HashSet::new();
    for p in &projects {
        if !seen.insert(p.slug.as_str()) {
            return Err(ContentError::DuplicateSlug(p.slug.clone()));
        }
    }
    Ok(projects)
}

pub fn parse_skills(raw: &str) -> Result<Vec<Skill>, ContentError> {
    serde_json::from_str(raw).map_err(|e| ContentError::ParseError(e.to_string()))
}

pub fn parse_services(raw: &str) -> Result<Vec<Service>, ContentError> {
    serde_json::from_str(raw).map_err(|e| ContentError::ParseError(e.to_string()))
}

/// The ordered Slide Collection.
pub fn get_projects() -> Result<Vec<Project>, ContentError> {
    PROJECTS.clone()
}

pub fn featured_projects() -> Result<Vec<Project>, ContentError> {
    get_projects().map(|all| all.into_iter().filter(|p| p.featured).collect())
}

pub fn get_skills() -> Result<Vec<Skill>, ContentError> {
    SKILLS.clone()
}

pub fn get_services() -> Result<Vec<Service>, ContentError> {
    SERVICES.clone()
}
