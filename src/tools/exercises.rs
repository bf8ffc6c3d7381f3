//! Prenatal exercise tools

use serde::Serialize;

use crate::calculators::Trimester;
use crate::db::Database;
use crate::models::Exercise;

#[derive(Debug, Serialize)]
pub struct ListExercisesResponse {
    pub trimester: Option<&'static str>,
    pub exercises: Vec<Exercise>,
    pub total: usize,
}

/// The catalogue, or the part of it suited to `trimester` ("First", "Second
/// Trimester", ...). An unrecognised trimester is an error.
pub fn list_exercises(db: &Database, trimester: Option<&str>) -> Result<ListExercisesResponse, String> {
    let trimester = match trimester.map(str::trim).filter(|t| !t.is_empty()) {
        Some(label) => Some(
            Trimester::from_str(label).ok_or_else(|| format!("Unknown trimester '{}'", label))?,
        ),
        None => None,
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let exercises = Exercise::list_for(&conn, trimester).map_err(|e| format!("Failed to list exercises: {}", e))?;

    Ok(ListExercisesResponse {
        trimester: trimester.map(|t| t.as_str()),
        total: exercises.len(),
        exercises,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::testing::temp_database;

    #[test]
    fn test_filtering() {
        let (_dir, db) = temp_database();
        let all = list_exercises(&db, None).unwrap();
        assert_eq!(all.total, 5);

        let third = list_exercises(&db, Some("Third Trimester")).unwrap();
        assert_eq!(third.trimester, Some("Third Trimester"));
        assert!(third.total <= all.total);
        assert!(third.exercises.iter().all(|e| e.is_suitable_for(Trimester::Third)));

        assert!(list_exercises(&db, Some("Fourth")).is_err());
    }
}
