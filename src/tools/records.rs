//! Health record tools
//!
//! Files are copied into the upload directory as `user_{id}_{name}`, with the
//! name reduced to a safe ASCII form first.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::db::Database;
use crate::models::{HealthRecord, User};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub id: i64,
    pub file_name: String,
    pub file_path: String,
    pub upload_date: String,
}

#[derive(Debug, Serialize)]
pub struct RecordSummary {
    pub file_name: String,
    pub upload_date: String,
}

#[derive(Debug, Serialize)]
pub struct ListRecordsResponse {
    pub records: Vec<RecordSummary>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct RecordLocation {
    pub file_name: String,
    pub file_path: String,
    pub size_bytes: u64,
}

/// ASCII letters, digits, `.`, `_` and `-` only; spaces become `_`.
/// Leading dots and underscores are dropped so the result can't be hidden or
/// climb out of the upload directory.
pub fn secure_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    cleaned.trim_start_matches(['.', '_']).to_string()
}

/// Copy `source` into `upload_dir` and record it for the user
pub fn upload_health_record(
    db: &Database,
    upload_dir: &Path,
    user_id: i64,
    source: &Path,
) -> Result<UploadResponse, String> {
    if !source.is_file() {
        return Err(format!("No such file: {}", source.display()));
    }

    let original = source
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| "No selected file".to_string())?;
    let safe = secure_filename(original);
    if safe.is_empty() {
        return Err(format!("'{}' is not a usable file name", original));
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    User::require(&conn, user_id).map_err(|e| e.to_string())?;

    let file_name = format!("user_{}_{}", user_id, safe);
    let destination: PathBuf = upload_dir.join(&file_name);

    fs::create_dir_all(upload_dir).map_err(|e| format!("Failed to create upload directory: {}", e))?;
    fs::copy(source, &destination).map_err(|e| format!("Failed to store file: {}", e))?;

    let record = HealthRecord::create(&conn, user_id, &file_name, &destination.display().to_string())
        .map_err(|e| format!("Failed to record upload: {}", e))?;
    info!("Stored health record {} for user {}", record.file_name, user_id);

    Ok(UploadResponse {
        id: record.id,
        file_name: record.file_name,
        file_path: record.file_path,
        upload_date: record.upload_date,
    })
}

pub fn list_health_records(db: &Database, user_id: i64) -> Result<ListRecordsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let records = HealthRecord::list_for_user(&conn, user_id)
        .map_err(|e| format!("Failed to list records: {}", e))?;

    let records: Vec<_> = records
        .into_iter()
        .map(|r| RecordSummary {
            file_name: r.file_name,
            upload_date: r.upload_date,
        })
        .collect();

    Ok(ListRecordsResponse {
        total: records.len(),
        records,
    })
}

/// Where a stored record lives. `None` unless it is the user's and still on disk.
pub fn get_health_record(db: &Database, user_id: i64, file_name: &str) -> Result<Option<RecordLocation>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let record = HealthRecord::find(&conn, user_id, file_name)
        .map_err(|e| format!("Failed to look up record: {}", e))?;

    Ok(record.and_then(|r| {
        let size_bytes = fs::metadata(&r.file_path).ok().filter(|m| m.is_file())?.len();
        Some(RecordLocation {
            file_name: r.file_name,
            file_path: r.file_path,
            size_bytes,
        })
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::testing::temp_database;
    use crate::tools::accounts;

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("scan report.pdf"), "scan_report.pdf");
        assert_eq!(secure_filename("../../etc/passwd"), "passwd");
        assert_eq!(secure_filename("C:\\docs\\ultra sound (1).png"), "ultra_sound_1.png");
        assert_eq!(secure_filename(".hidden"), "hidden");
        assert_eq!(secure_filename("ünïcode.txt"), "ncode.txt");
        assert_eq!(secure_filename("..."), "");
    }

    #[test]
    fn test_upload_list_get() {
        let (dir, db) = temp_database();
        let user = accounts::register(&db, "Asha", "555-0100", "pw", None).unwrap().done().unwrap();
        let other = accounts::register(&db, "Bina", "555-0101", "pw", None).unwrap().done().unwrap();

        let source = dir.path().join("blood test.pdf");
        fs::write(&source, b"%PDF-1.4").unwrap();
        let uploads = dir.path().join("uploads");

        let uploaded = upload_health_record(&db, &uploads, user.user_id, &source).unwrap();
        assert_eq!(uploaded.file_name, format!("user_{}_blood_test.pdf", user.user_id));
        assert!(uploads.join(&uploaded.file_name).is_file());

        let listed = list_health_records(&db, user.user_id).unwrap();
        assert_eq!(listed.total, 1);
        assert!(list_health_records(&db, other.user_id).unwrap().records.is_empty());

        let found = get_health_record(&db, user.user_id, &uploaded.file_name).unwrap().unwrap();
        assert_eq!(found.size_bytes, 8);
        assert!(get_health_record(&db, other.user_id, &uploaded.file_name).unwrap().is_none());

        fs::remove_file(uploads.join(&uploaded.file_name)).unwrap();
        assert!(get_health_record(&db, user.user_id, &uploaded.file_name).unwrap().is_none());
    }

    #[test]
    fn test_upload_missing_file() {
        let (dir, db) = temp_database();
        let user = accounts::register(&db, "Asha", "555-0100", "pw", None).unwrap().done().unwrap();
        let result = upload_health_record(&db, dir.path(), user.user_id, &dir.path().join("nope.pdf"));
        assert!(result.is_err());
    }
}
