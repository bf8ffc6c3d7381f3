//! Create the Bloom database and seed the exercise catalogue
//! Usage: cargo run --bin init_db

use bloom::config::Config;
use bloom::db::{migrations, Database};
use bloom::models::Exercise;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    println!("Database: {}", config.database_path.display());

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::create_dir_all(&config.upload_dir)?;

    let database = Database::open_migrated(&config.database_path)?;

    database.with_conn(|conn| {
        let version = migrations::get_schema_version(conn)?;
        let exercises = Exercise::list(conn)?;
        println!("Schema version: {}", version);
        println!("Exercises in catalogue: {}", exercises.len());
        for exercise in &exercises {
            println!("  {} ({}, {})", exercise.name, exercise.trimester, exercise.difficulty);
        }
        Ok(())
    })?;

    println!("Upload directory: {}", config.upload_dir.display());
    println!("Done.");
    Ok(())
}
