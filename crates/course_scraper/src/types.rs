//! Core course types shared by the scraper, the store and the search service.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One raw HTML fragment holding a single course listing, as taken from the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawListing(String);

impl RawListing {
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for RawListing {
    fn from(html: String) -> Self {
        Self(html)
    }
}

impl From<&str> for RawListing {
    fn from(html: &str) -> Self {
        Self(html.to_string())
    }
}

/// The `{university, type, number}` tuple identifying a course within one run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CourseSignature {
    pub university_id: u32,
    pub course_type: String,
    pub number: u32,
}

impl fmt::Display for CourseSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.course_type, self.number)
    }
}

/// The fields pulled out of a listing's title. Every course has these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicData {
    pub course_type: String,
    pub number: u32,
    pub credits: String,
    pub name: String,
}

/// A single course listing.
///
/// Built once per fragment through [`CourseBuilder`] and never modified
/// afterwards; the store replaces whole sets of courses instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    university_id: u32,
    #[serde(rename = "type")]
    course_type: String,
    number: u32,
    credits: String,
    name: String,
    description: Option<String>,
    components: Option<Vec<String>>,
    notes: Option<Vec<String>>,
    duration: u32,
    /// Ordered alternative groups, e.g. `["COMP 232/COEN 231", "COMP 352"]`.
    prerequisites: Vec<String>,
}

impl Course {
    pub fn university_id(&self) -> u32 {
        self.university_id
    }

    /// Department code, e.g. `COMP`.
    pub fn course_type(&self) -> &str {
        &self.course_type
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// Credits exactly as listed (`"3"`, `"1.5"`).
    pub fn credits(&self) -> &str {
        &self.credits
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn components(&self) -> Option<&[String]> {
        self.components.as_deref()
    }

    pub fn notes(&self) -> Option<&[String]> {
        self.notes.as_deref()
    }

    /// Number of terms the course spans.
    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn prerequisites(&self) -> &[String] {
        &self.prerequisites
    }

    pub fn signature(&self) -> CourseSignature {
        CourseSignature {
            university_id: self.university_id,
            course_type: self.course_type.clone(),
            number: self.number,
        }
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}",
            self.course_type, self.number, self.name, self.credits
        )
    }
}

/// Accumulates the optional course fields before freezing them into a [`Course`].
#[derive(Debug, Clone)]
pub struct CourseBuilder {
    university_id: u32,
    basic: BasicData,
    description: Option<String>,
    components: Option<Vec<String>>,
    notes: Option<Vec<String>>,
    duration: u32,
    prerequisites: Vec<String>,
}

impl CourseBuilder {
    pub fn new(university_id: u32, basic: BasicData) -> Self {
        Self {
            university_id,
            basic,
            description: None,
            components: None,
            notes: None,
            duration: 1,
            prerequisites: Vec::new(),
        }
    }

    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn components(mut self, components: Option<Vec<String>>) -> Self {
        self.components = components;
        self
    }

    pub fn notes(mut self, notes: Option<Vec<String>>) -> Self {
        self.notes = notes;
        self
    }

    pub fn duration(mut self, duration: u32) -> Self {
        self.duration = duration;
        self
    }

    pub fn prerequisites(mut self, prerequisites: Vec<String>) -> Self {
        self.prerequisites = prerequisites;
        self
    }

    pub fn build(self) -> Course {
        Course {
            university_id: self.university_id,
            course_type: self.basic.course_type,
            number: self.basic.number,
            credits: self.basic.credits,
            name: self.basic.name,
            description: self.description,
            components: self.components,
            notes: self.notes,
            duration: self.duration,
            prerequisites: self.prerequisites,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic() -> BasicData {
        BasicData {
            course_type: "COMP".to_string(),
            number: 248,
            credits: "3.5".to_string(),
            name: "Object-Oriented Programming I".to_string(),
        }
    }

    #[test]
    fn test_builder_defaults() {
        let course = CourseBuilder::new(1, basic()).build();
        assert_eq!(course.duration(), 1);
        assert!(course.description().is_none());
        assert!(course.components().is_none());
        assert!(course.notes().is_none());
        assert!(course.prerequisites().is_empty());
    }

    #[test]
    fn test_signature_display() {
        let course = CourseBuilder::new(1, basic()).build();
        assert_eq!(course.signature().to_string(), "COMP 248");
        assert_eq!(
            course.to_string(),
            "COMP|248|Object-Oriented Programming I|3.5"
        );
    }

    #[test]
    fn test_serializes_type_field() {
        let course = CourseBuilder::new(1, basic())
            .prerequisites(vec!["COMP 232/COEN 231".to_string()])
            .build();
        let json = serde_json::to_value(&course).unwrap();
        assert_eq!(json["type"], "COMP");
        assert_eq!(json["prerequisites"][0], "COMP 232/COEN 231");

        let back: Course = serde_json::from_value(json).unwrap();
        assert_eq!(back, course);
    }
}
