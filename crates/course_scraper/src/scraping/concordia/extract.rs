//! Field extraction for one Concordia course listing.
//!
//! A listing looks roughly like this:
//!
//! ```html
//! <div class="course">
//!   <h3 class="title">COMP 248 Object-Oriented Programming I (3.5 credits)</h3>
//!   <div class="content accordion_accordion_panel">
//!     <p>Prerequisite/Corequisite:</p><p>The following courses must be ...</p>
//!     <p>Description:</p><p>Introduction to programming...</p>
//!     <p>Component(s): Lecture; Tutorial; Laboratory</p>
//!     <div class="course-notes"><p>...</p></div>
//!   </div>
//! </div>
//! ```
//!
//! Only the title is mandatory. Every other section is optional and is read
//! independently from the panel's child elements.

use super::prerequisites::parse_requisites;
use crate::scraping::{ScrapeError, TitleField};
use crate::types::{BasicData, Course, CourseBuilder};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::ops::Range;
use std::sync::LazyLock;

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3[class*='title']").unwrap());
static PANEL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.content.accordion_accordion_panel").unwrap());

static TYPE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]{4})(?:[^A-Za-z]|$)").unwrap());
static NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{3,5}").unwrap());
static CREDITS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\((\d+(?:\.\d+)?) credits?\)").unwrap());
static DESCRIPTION_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^description:").unwrap());
static COMPONENTS_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^component\(s\):?").unwrap());
static NOTES_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^notes?:").unwrap());

const REQUISITE_LABEL: &str = "prerequisite/corequisite:";
const NOTES_CLASS: &str = "course-notes";

/// Parses a raw listing fragment into a course.
///
/// Fails only when the title is missing or lacks its type, number or credits.
pub fn parse_listing(fragment: &str, university_id: u32) -> Result<Course, ScrapeError> {
    let document = Html::parse_fragment(fragment);

    let basic = parse_basic_data(&document)?;
    let nodes = content_nodes(&document);

    let (components, duration) = parse_components(&nodes);

    Ok(CourseBuilder::new(university_id, basic)
        .description(parse_description(&nodes))
        .components(components)
        .duration(duration)
        .notes(parse_notes(&nodes))
        .prerequisites(parse_prerequisites(&nodes))
        .build())
}

fn parse_basic_data(document: &Html) -> Result<BasicData, ScrapeError> {
    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| node_text(&el))
        .ok_or_else(|| ScrapeError::MalformedTitle {
            field: TitleField::Element,
            title: String::new(),
        })?;

    parse_title(&title)
}

/// Splits a title such as `COMP 248 Object-Oriented Programming I (3.5 credits)`.
///
/// The name is whatever is left once the matched type, number and credits
/// are cut out.
pub fn parse_title(title: &str) -> Result<BasicData, ScrapeError> {
    let title = collapse_whitespace(title);
    let malformed = |field| ScrapeError::MalformedTitle {
        field,
        title: title.clone(),
    };

    let type_match = TYPE_REGEX
        .captures(&title)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| malformed(TitleField::Type))?;

    let number_match = NUMBER_REGEX
        .find(&title)
        .ok_or_else(|| malformed(TitleField::Number))?;
    let number = number_match
        .as_str()
        .parse::<u32>()
        .map_err(|_| malformed(TitleField::Number))?;

    let (credits_span, credits) = CREDITS_REGEX
        .captures(&title)
        .and_then(|caps| Some((caps.get(0)?.range(), caps.get(1)?.as_str().to_string())))
        .ok_or_else(|| malformed(TitleField::Credits))?;

    let name = remove_spans(
        &title,
        vec![type_match.range(), number_match.range(), credits_span],
    );

    Ok(BasicData {
        course_type: type_match.as_str().to_string(),
        number,
        credits,
        name: collapse_whitespace(&name),
    })
}

/// The element children of the content panel, without `<br>` tags.
fn content_nodes(document: &Html) -> Vec<ElementRef<'_>> {
    document
        .select(&PANEL_SELECTOR)
        .next()
        .map(|panel| {
            panel
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|el| !el.value().name().eq_ignore_ascii_case("br"))
                .collect()
        })
        .unwrap_or_default()
}

/// The description comes in two layouts: a bare `Description:` node followed by
/// the body in the next node, or the label and body inline in one node.
fn parse_description(nodes: &[ElementRef]) -> Option<String> {
    for (i, node) in nodes.iter().enumerate() {
        let text = node_text(node);
        let lower = text.to_lowercase();

        if lower == "description:" {
            match nodes.get(i + 1) {
                Some(next) if !is_section_label(next) => return Some(node_text(next)),
                _ => continue,
            }
        }

        if DESCRIPTION_LABEL.is_match(&text) {
            let body = DESCRIPTION_LABEL.replace(&text, "").trim().to_string();
            if !body.is_empty() {
                return Some(body);
            }
        }
    }

    None
}

/// Whether a node opens another section (components or notes) rather than holding a body.
fn is_section_label(node: &ElementRef) -> bool {
    let text = node_text(node);
    COMPONENTS_LABEL.is_match(&text) || NOTES_LABEL.is_match(&text) || has_notes_class(node)
}

/// Returns the component labels and the number of terms the course runs.
fn parse_components(nodes: &[ElementRef]) -> (Option<Vec<String>>, u32) {
    let Some(text) = nodes
        .iter()
        .map(node_text)
        .find(|text| COMPONENTS_LABEL.is_match(text))
    else {
        return (None, 1);
    };

    let components: Vec<String> = COMPONENTS_LABEL
        .replace(&text, "")
        .split(';')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();

    let duration = if components
        .iter()
        .any(|c| c.to_lowercase().contains("two terms"))
    {
        2
    } else {
        1
    };

    (Some(components), duration)
}

fn parse_notes(nodes: &[ElementRef]) -> Option<Vec<String>> {
    let notes_node = nodes.iter().find(|node| has_notes_class(node))?;

    let notes = notes_node
        .children()
        .filter_map(ElementRef::wrap)
        .map(|child| {
            node_text(&child)
                .chars()
                .filter(|c| {
                    c.is_alphanumeric() || matches!(c, '\'' | ' ' | '.' | ',' | '-' | '\u{2011}')
                })
                .collect::<String>()
                .trim()
                .to_string()
        })
        .collect();

    Some(notes)
}

/// Requisites only exist when the panel opens with a paragraph.
fn parse_prerequisites(nodes: &[ElementRef]) -> Vec<String> {
    let Some(first) = nodes.first() else {
        return Vec::new();
    };
    if first.value().name() != "p" {
        return Vec::new();
    }

    let requisite_node = if node_text(first).to_lowercase() == REQUISITE_LABEL {
        match nodes.get(1) {
            Some(next) => next,
            None => return Vec::new(),
        }
    } else {
        first
    };

    parse_requisites(&node_text(requisite_node))
}

fn has_notes_class(node: &ElementRef) -> bool {
    node.value()
        .attr("class")
        .is_some_and(|class| class.contains(NOTES_CLASS))
}

/// All text under `node`, with runs of whitespace collapsed to one space.
fn node_text(node: &ElementRef) -> String {
    collapse_whitespace(&node.text().collect::<String>())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns `text` with the given byte ranges cut out. Ranges may overlap.
fn remove_spans(text: &str, mut spans: Vec<Range<usize>>) -> String {
    spans.sort_by_key(|span| span.start);

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in spans {
        if span.start > cursor {
            out.push_str(&text[cursor..span.start]);
        }
        cursor = cursor.max(span.end);
    }
    if cursor < text.len() {
        out.push_str(&text[cursor..]);
    }
    out
}
