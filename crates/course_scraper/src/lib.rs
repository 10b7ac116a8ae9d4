//! Scrapes university course catalogs into structured [`types::Course`] records.
//!
//! [`scraping::pipeline::Pipeline`] drives a [`scraping::SiteScraper`] over a
//! list of catalog URLs, retrying flaky pages and dropping listings it can't
//! read. The resulting courses go to a [`db::CourseStore`] and can be queried
//! with [`search::search_courses`].

pub mod config;
pub mod db;
pub mod scraping;
pub mod search;
pub mod types;
