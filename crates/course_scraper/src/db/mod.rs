//! Persistence for scraped courses
//!
//! Courses are only ever written as a whole set: a scrape run replaces
//! everything stored before it.

mod types;

pub use types::{DbCourse, DbPrerequisite};

use crate::types::Course;
use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::info;

const SCHEMA_SQL: &str = include_str!("../../sql/init_courses.sql");

/// Where scraped courses end up.
pub trait CourseStore: Send + Sync {
    /// Replaces every stored course with `courses`.
    fn replace_all(&self, courses: &[Course]) -> Result<()>;

    /// Returns every stored course in the order it was written.
    fn read_all(&self) -> Result<Vec<Course>>;
}

pub struct CourseDbManager {
    db: Mutex<Connection>,
}

impl CourseDbManager {
    /// Opens (or creates) the database at `db_path` and initializes the schema
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database {db_path}"))?;
        Self::with_connection(conn)
    }

    /// A database that lives only as long as this manager
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize database schema")?;

        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.db
            .lock()
            .map_err(|_| anyhow!("course database lock poisoned"))
    }

    /// Number of stored courses
    pub fn count(&self) -> Result<usize> {
        let db = self.lock()?;
        let count: i64 = db.query_row("SELECT COUNT(*) FROM courses", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn read_prerequisites(db: &Connection) -> Result<HashMap<(u32, String, u32), Vec<String>>> {
        let mut stmt = db.prepare(
            "SELECT university_id, type, number, position, alternatives
             FROM course_prerequisites
             ORDER BY university_id, type, number, position",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(DbPrerequisite {
                    university_id: row.get(0)?,
                    course_type: row.get(1)?,
                    number: row.get(2)?,
                    position: row.get(3)?,
                    alternatives: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut grouped: HashMap<(u32, String, u32), Vec<String>> = HashMap::new();
        for row in rows {
            grouped
                .entry((row.university_id, row.course_type, row.number))
                .or_default()
                .push(row.alternatives);
        }

        Ok(grouped)
    }
}

impl CourseStore for CourseDbManager {
    fn replace_all(&self, courses: &[Course]) -> Result<()> {
        let mut db = self.lock()?;
        let tx = db.transaction()?;

        tx.execute("DELETE FROM course_prerequisites", [])?;
        tx.execute("DELETE FROM courses", [])?;

        for (position, course) in courses.iter().enumerate() {
            let row = DbCourse::from_course(position as i64, course)?;

            // A repeated signature replaces the earlier course, prerequisites included
            tx.execute(
                "DELETE FROM course_prerequisites WHERE university_id = ?1 AND type = ?2 AND number = ?3",
                params![row.university_id, row.course_type, row.number],
            )?;

            tx.execute(
                "INSERT OR REPLACE INTO courses (
                    position, university_id, type, number, credits, name,
                    description, components, notes, duration
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    row.position,
                    row.university_id,
                    row.course_type,
                    row.number,
                    row.credits,
                    row.name,
                    row.description,
                    row.components,
                    row.notes,
                    row.duration,
                ],
            )?;

            for (index, alternatives) in course.prerequisites().iter().enumerate() {
                tx.execute(
                    "INSERT INTO course_prerequisites (university_id, type, number, position, alternatives)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        row.university_id,
                        row.course_type,
                        row.number,
                        index as i64,
                        alternatives
                    ],
                )?;
            }
        }

        tx.commit()?;
        info!(courses = courses.len(), "Replaced stored courses");
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<Course>> {
        let db = self.lock()?;
        let mut prerequisites = Self::read_prerequisites(&db)?;

        let mut stmt = db.prepare(
            "SELECT position, university_id, type, number, credits, name,
                    description, components, notes, duration
             FROM courses
             ORDER BY position",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(DbCourse {
                    position: row.get(0)?,
                    university_id: row.get(1)?,
                    course_type: row.get(2)?,
                    number: row.get(3)?,
                    credits: row.get(4)?,
                    name: row.get(5)?,
                    description: row.get(6)?,
                    components: row.get(7)?,
                    notes: row.get(8)?,
                    duration: row.get(9)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|row| {
                let key = (row.university_id, row.course_type.clone(), row.number);
                let groups = prerequisites.remove(&key).unwrap_or_default();
                row.into_course(groups)
            })
            .collect()
    }
}

/// Keeps courses in memory. Useful for dry runs and tests.
#[derive(Default)]
pub struct MemoryStore {
    courses: Mutex<Vec<Course>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CourseStore for MemoryStore {
    fn replace_all(&self, courses: &[Course]) -> Result<()> {
        let mut stored = self
            .courses
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        *stored = courses.to_vec();
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<Course>> {
        let stored = self
            .courses
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(stored.clone())
    }
}
