//! Prenatal exercise catalogue

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::calculators::Trimester;
use crate::db::DbResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub reps: String,
    pub description: Option<String>,
    /// "All" or a comma list of trimester names, e.g. "First,Second"
    pub trimester: String,
    pub difficulty: String,
}

impl Exercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            image: row.get("image")?,
            reps: row.get("reps")?,
            description: row.get("description")?,
            trimester: row.get("trimester")?,
            difficulty: row.get("difficulty")?,
        })
    }

    pub fn is_suitable_for(&self, trimester: Trimester) -> bool {
        self.trimester.split(',').map(str::trim).any(|t| {
            t.eq_ignore_ascii_case("all") || t.eq_ignore_ascii_case(trimester.short_name())
        })
    }

    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM exercises ORDER BY id")?;
        let exercises = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(exercises)
    }

    /// The catalogue, narrowed to one trimester when given
    pub fn list_for(conn: &Connection, trimester: Option<Trimester>) -> DbResult<Vec<Self>> {
        let all = Self::list(conn)?;
        Ok(match trimester {
            Some(t) => all.into_iter().filter(|e| e.is_suitable_for(t)).collect(),
            None => all,
        })
    }
}
