//! Schema creation and migrations

use rusqlite::{params, Connection};

use super::connection::DbResult;

const SCHEMA_VERSION: i32 = 1;

/// Prenatal exercises seeded into an empty catalogue:
/// (name, image, reps, description, trimester, difficulty)
const SEED_EXERCISES: &[(&str, &str, &str, &str, &str, &str)] = &[
    ("Pelvic Tilt", "pelvic_tilt.jpg", "10-15 repetitions", "Helps with lower back pain", "All", "Easy"),
    (
        "Kegel Exercises",
        "kegel.jpg",
        "10 repetitions, hold for 5-10 seconds each",
        "Strengthens pelvic floor",
        "All",
        "Easy",
    ),
    ("Wall Slide", "wall_slide.jpg", "10-12 repetitions", "Improves posture", "First,Second", "Medium"),
    (
        "Side-Lying Leg Lift",
        "side_leg_lift.jpg",
        "10 repetitions each side",
        "Strengthens hips and core",
        "Second,Third",
        "Medium",
    ),
    ("Seated Twist", "seated_twist.jpg", "5 repetitions each side", "Relieves back tension", "First,Second", "Easy"),
];

/// Bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    seed_exercises(conn)?;

    Ok(())
}

fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            phone TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            email TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE pregnancy_profile (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
            due_date TEXT,
            last_menstrual_period TEXT,
            previous_pregnancies INTEGER NOT NULL DEFAULT 0,
            live_births INTEGER NOT NULL DEFAULT 0,
            miscarriages INTEGER NOT NULL DEFAULT 0,
            current_week INTEGER NOT NULL DEFAULT 0,
            doctor_name TEXT,
            doctor_contact TEXT,
            hospital_name TEXT,
            hospital_contact TEXT,
            blood_type TEXT,
            allergies TEXT,
            medications TEXT,
            pre_existing_conditions TEXT,
            weight REAL,
            height REAL,
            diet TEXT,
            exercise TEXT,
            smoking_status TEXT,
            alcohol_consumption TEXT,
            caffeine_intake TEXT,
            stress_levels TEXT,
            emotional_wellbeing TEXT,
            partner_name TEXT,
            partner_contact TEXT,
            emergency_contact TEXT,
            birth_preferences TEXT,
            additional_notes TEXT,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE health_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            file_name TEXT NOT NULL,
            file_path TEXT NOT NULL,
            upload_date TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_health_records_user ON health_records(user_id);

        -- in_context = 0 once the chat has been cleared; rows stay as history
        CREATE TABLE symptoms (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            symptom TEXT NOT NULL,
            advice TEXT NOT NULL,
            in_context INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_symptoms_user ON symptoms(user_id, in_context);

        CREATE TABLE appointments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            hospital_name TEXT NOT NULL,
            specialization TEXT NOT NULL,
            date TEXT NOT NULL,
            time TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'Scheduled'
                CHECK(status IN ('Scheduled', 'Cancelled', 'Completed')),
            reminder_sent INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_appointments_user ON appointments(user_id);
        CREATE INDEX idx_appointments_due ON appointments(status, reminder_sent, date);

        CREATE TABLE user_preferences (
            user_id INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
            dark_mode INTEGER NOT NULL DEFAULT 0,
            theme_color TEXT NOT NULL DEFAULT 'blue',
            show_nsfw INTEGER NOT NULL DEFAULT 0,
            language TEXT NOT NULL DEFAULT 'en'
        );

        CREATE TABLE pregnancy_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            date_type TEXT NOT NULL,
            input_date TEXT NOT NULL,
            calculated_due_date TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE exercises (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            image TEXT NOT NULL,
            reps TEXT NOT NULL,
            description TEXT,
            trimester TEXT NOT NULL DEFAULT 'All',
            difficulty TEXT NOT NULL DEFAULT 'Medium'
        );
        "#,
    )?;

    Ok(())
}

/// Fill the exercise catalogue if it is empty. Returns the number inserted.
pub fn seed_exercises(conn: &Connection) -> DbResult<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM exercises", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(0);
    }

    let mut stmt = conn.prepare(
        "INSERT INTO exercises (name, image, reps, description, trimester, difficulty)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for (name, image, reps, description, trimester, difficulty) in SEED_EXERCISES {
        stmt.execute(params![name, image, reps, description, trimester, difficulty])?;
    }

    Ok(SEED_EXERCISES.len())
}

/// Highest applied schema version, 0 for a fresh database
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Whether the database is at the version this build expects
pub fn is_current(conn: &Connection) -> DbResult<bool> {
    Ok(get_schema_version(conn)? == SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert!(is_current(&conn).unwrap());
        let exercises: i64 = conn.query_row("SELECT COUNT(*) FROM exercises", [], |r| r.get(0)).unwrap();
        assert_eq!(exercises, 5);
    }

    #[test]
    fn test_seed_skips_populated_catalogue() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(seed_exercises(&conn).unwrap(), 0);
    }
}
