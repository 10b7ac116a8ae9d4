//! Course search over stored records
use crate::types::Course;
use serde::{Deserialize, Serialize};

/// Search filters. Unset fields and empty lists don't constrain anything;
/// all the set ones must hold.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParameters {
    pub university_id: Option<u32>,
    /// Department code, compared case-insensitively
    pub course_type: Option<String>,
    pub number: Option<u32>,
    /// Every word must appear in the course name
    pub name: Option<String>,
    /// Exact credits string, e.g. "3.5"
    pub credits: Option<String>,
    /// At least one must appear in the name, description, components or notes
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Every one must appear in some component label
    #[serde(default)]
    pub components: Vec<String>,
}

/// Returns the courses matching `params`, in their original order.
pub fn search_courses<'a>(params: &SearchParameters, courses: &'a [Course]) -> Vec<&'a Course> {
    let course_type = params.course_type.as_deref().map(normalize);
    let name_tokens: Vec<String> = params
        .name
        .as_deref()
        .map(|name| name.split_whitespace().map(normalize).collect())
        .unwrap_or_default();
    let keywords: Vec<String> = lowered(&params.keywords);
    let components: Vec<String> = lowered(&params.components);

    courses
        .iter()
        .filter(|c| params.university_id.map_or(true, |id| c.university_id() == id))
        .filter(|c| {
            course_type
                .as_deref()
                .map_or(true, |t| normalize(c.course_type()) == t)
        })
        .filter(|c| params.number.map_or(true, |n| c.number() == n))
        .filter(|c| {
            let name = c.name().to_lowercase();
            name_tokens.iter().all(|token| name.contains(token.as_str()))
        })
        .filter(|c| params.credits.as_deref().map_or(true, |cr| c.credits() == cr))
        .filter(|c| keywords.is_empty() || matches_any_keyword(c, &keywords))
        .filter(|c| {
            let labels: Vec<String> = c
                .components()
                .unwrap_or_default()
                .iter()
                .map(|l| l.to_lowercase())
                .collect();
            components
                .iter()
                .all(|wanted| labels.iter().any(|l| l.contains(wanted.as_str())))
        })
        .collect()
}

fn matches_any_keyword(course: &Course, keywords: &[String]) -> bool {
    let mut haystack = course.name().to_lowercase();
    for text in course
        .description()
        .into_iter()
        .chain(course.components().unwrap_or_default().iter().map(String::as_str))
        .chain(course.notes().unwrap_or_default().iter().map(String::as_str))
    {
        haystack.push('\n');
        haystack.push_str(&text.to_lowercase());
    }

    keywords.iter().any(|k| haystack.contains(k.as_str()))
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn lowered(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| normalize(v))
        .filter(|v| !v.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BasicData, CourseBuilder};

    fn course(course_type: &str, number: u32, name: &str, credits: &str) -> CourseBuilder {
        CourseBuilder::new(
            1,
            BasicData {
                course_type: course_type.to_string(),
                number,
                credits: credits.to_string(),
                name: name.to_string(),
            },
        )
    }

    fn catalog() -> Vec<Course> {
        vec![
            course("COMP", 248, "Object-Oriented Programming I", "3.5")
                .components(Some(vec!["Lecture".into(), "Tutorial".into(), "Laboratory".into()]))
                .description(Some("Introduction to programming.".into()))
                .build(),
            course("COMP", 352, "Data Structures and Algorithms", "3")
                .components(Some(vec!["Lecture".into(), "Tutorial".into()]))
                .notes(Some(vec!["Not for students with credit in COEN 352.".into()]))
                .build(),
            course("MATH", 204, "Vectors and Matrices", "3").build(),
        ]
    }

    fn numbers(found: Vec<&Course>) -> Vec<u32> {
        found.iter().map(|c| c.number()).collect()
    }

    #[test]
    fn test_empty_parameters_match_everything() {
        let courses = catalog();
        assert_eq!(numbers(search_courses(&SearchParameters::default(), &courses)), vec![248, 352, 204]);
    }

    #[test]
    fn test_type_is_case_insensitive() {
        let courses = catalog();
        let params = SearchParameters {
            course_type: Some(" comp ".into()),
            ..Default::default()
        };
        assert_eq!(numbers(search_courses(&params, &courses)), vec![248, 352]);
    }

    #[test]
    fn test_name_needs_every_token() {
        let courses = catalog();
        let params = SearchParameters {
            name: Some("programming object".into()),
            ..Default::default()
        };
        assert_eq!(numbers(search_courses(&params, &courses)), vec![248]);

        let params = SearchParameters {
            name: Some("programming matrices".into()),
            ..Default::default()
        };
        assert!(search_courses(&params, &courses).is_empty());
    }

    #[test]
    fn test_keywords_search_every_text_field() {
        let courses = catalog();
        let params = SearchParameters {
            keywords: vec!["coen".into(), "introduction".into()],
            ..Default::default()
        };
        assert_eq!(numbers(search_courses(&params, &courses)), vec![248, 352]);
    }

    #[test]
    fn test_components_and_credits_combine() {
        let courses = catalog();
        let params = SearchParameters {
            components: vec!["lab".into(), "lecture".into()],
            ..Default::default()
        };
        assert_eq!(numbers(search_courses(&params, &courses)), vec![248]);

        let params = SearchParameters {
            credits: Some("3".into()),
            components: vec!["tutorial".into()],
            ..Default::default()
        };
        assert_eq!(numbers(search_courses(&params, &courses)), vec![352]);
    }
}
