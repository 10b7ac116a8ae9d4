//! Database row types for stored courses
use crate::types::{BasicData, Course, CourseBuilder};
use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct DbCourse {
    pub position: i64,
    pub university_id: u32,
    pub course_type: String,
    pub number: u32,
    pub credits: String,
    pub name: String,
    pub description: Option<String>,
    pub components: Option<String>, // JSON string
    pub notes: Option<String>,      // JSON string
    pub duration: u32,
}

#[derive(Debug, Clone)]
pub struct DbPrerequisite {
    pub university_id: u32,
    pub course_type: String,
    pub number: u32,
    pub position: i64,
    pub alternatives: String,
}

impl DbCourse {
    pub fn from_course(position: i64, course: &Course) -> Result<Self> {
        Ok(Self {
            position,
            university_id: course.university_id(),
            course_type: course.course_type().to_string(),
            number: course.number(),
            credits: course.credits().to_string(),
            name: course.name().to_string(),
            description: course.description().map(str::to_string),
            components: course.components().map(serde_json::to_string).transpose()?,
            notes: course.notes().map(serde_json::to_string).transpose()?,
            duration: course.duration(),
        })
    }

    /// Rebuilds the course, attaching its prerequisite groups in order.
    pub fn into_course(self, prerequisites: Vec<String>) -> Result<Course> {
        let components = self
            .components
            .as_deref()
            .map(serde_json::from_str::<Vec<String>>)
            .transpose()
            .with_context(|| format!("Bad components for {} {}", self.course_type, self.number))?;
        let notes = self
            .notes
            .as_deref()
            .map(serde_json::from_str::<Vec<String>>)
            .transpose()
            .with_context(|| format!("Bad notes for {} {}", self.course_type, self.number))?;

        let basic = BasicData {
            course_type: self.course_type,
            number: self.number,
            credits: self.credits,
            name: self.name,
        };

        Ok(CourseBuilder::new(self.university_id, basic)
            .description(self.description)
            .components(components)
            .notes(notes)
            .duration(self.duration)
            .prerequisites(prerequisites)
            .build())
    }
}
