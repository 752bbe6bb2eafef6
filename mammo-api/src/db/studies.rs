//! Study record persistence
//!
//! Every write runs in its own transaction and is committed before the
//! function returns. Concurrent analysis writes to the same study are not
//! serialized: the last write wins.

use mammo_common::time::{now, parse_db_timestamp, to_db_timestamp};
use mammo_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, warn};

use crate::models::{Classification, NewStudy, Prediction, Region, StudyAnalysis, StudyRecord};

const STUDY_COLUMNS: &str = r#"
    study_id, filename, file_path, content_type, file_size,
    prediction, confidence, processing_time, regions, model_version, image_quality,
    processed_at, created_at, updated_at
"#;

/// Insert a new, unanalyzed study
///
/// Fails with [`Error::Duplicate`] if `study_id` is already taken.
pub async fn create_study(pool: &SqlitePool, study: &NewStudy) -> Result<StudyRecord> {
    let created_at = now();
    let timestamp = to_db_timestamp(&created_at);

    let mut tx = pool.begin().await?;
    sqlx::query(
        r#"
        INSERT INTO studies (study_id, filename, file_path, content_type, file_size, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&study.study_id)
    .bind(&study.filename)
    .bind(&study.file_path)
    .bind(&study.content_type)
    .bind(study.file_size)
    .bind(&timestamp)
    .bind(&timestamp)
    .execute(&mut *tx)
    .await
    .map_err(|e| Error::from_write(e, &study.study_id))?;
    tx.commit().await?;

    debug!(study_id = %study.study_id, "Study created");

    Ok(StudyRecord {
        study_id: study.study_id.clone(),
        filename: study.filename.clone(),
        file_path: study.file_path.clone(),
        content_type: study.content_type.clone(),
        file_size: study.file_size,
        analysis: None,
        created_at,
        updated_at: created_at,
    })
}

/// Load a study by id; `None` if unknown
pub async fn get_study(pool: &SqlitePool, study_id: &str) -> Result<Option<StudyRecord>> {
    let row = sqlx::query(&format!("SELECT {} FROM studies WHERE study_id = ?", STUDY_COLUMNS))
        .bind(study_id)
        .fetch_optional(pool)
        .await?;

    row.map(|r| row_to_study(&r)).transpose()
}

/// Write all analysis fields of a study at once
///
/// Sets `processed_at` and `updated_at` to the current time. Fails with
/// [`Error::NotFound`] if the study does not exist.
pub async fn update_analysis(
    pool: &SqlitePool,
    study_id: &str,
    classification: &Classification,
) -> Result<StudyRecord> {
    let regions = serde_json::to_string(&classification.regions)
        .map_err(|e| Error::Internal(format!("Failed to serialize regions: {}", e)))?;
    let timestamp = to_db_timestamp(&now());

    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        r#"
        UPDATE studies SET
            prediction = ?,
            confidence = ?,
            processing_time = ?,
            regions = ?,
            model_version = ?,
            image_quality = ?,
            processed_at = ?,
            updated_at = ?
        WHERE study_id = ?
        "#,
    )
    .bind(classification.prediction.as_str())
    .bind(classification.confidence)
    .bind(classification.processing_time)
    .bind(&regions)
    .bind(&classification.model_version)
    .bind(&classification.image_quality)
    .bind(&timestamp)
    .bind(&timestamp)
    .bind(study_id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        // Dropping the transaction rolls it back
        return Err(Error::NotFound(format!("Study {}", study_id)));
    }

    let row = sqlx::query(&format!("SELECT {} FROM studies WHERE study_id = ?", STUDY_COLUMNS))
        .bind(study_id)
        .fetch_one(&mut *tx)
        .await?;
    let record = row_to_study(&row)?;
    tx.commit().await?;

    debug!(study_id = %study_id, prediction = %classification.prediction, "Analysis stored");

    Ok(record)
}

/// Most recently created studies first
pub async fn list_studies(pool: &SqlitePool, limit: u32) -> Result<Vec<StudyRecord>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM studies ORDER BY created_at DESC, id DESC LIMIT ?",
        STUDY_COLUMNS
    ))
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_study).collect()
}

/// Number of stored studies
pub async fn count_studies(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM studies")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Trivial query proving the database is reachable
pub async fn ping(pool: &SqlitePool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

fn row_to_study(row: &SqliteRow) -> Result<StudyRecord> {
    let study_id: String = row.try_get("study_id")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    let analysis = read_analysis(row, &study_id)?;

    Ok(StudyRecord {
        filename: row.try_get("filename")?,
        file_path: row.try_get("file_path")?,
        content_type: row.try_get("content_type")?,
        file_size: row.try_get("file_size")?,
        analysis,
        created_at: parse_db_timestamp(&created_at)?,
        updated_at: parse_db_timestamp(&updated_at)?,
        study_id,
    })
}

/// Analysis columns are all-or-nothing; a partial set reads as unanalyzed
fn read_analysis(row: &SqliteRow, study_id: &str) -> Result<Option<StudyAnalysis>> {
    let prediction: Option<String> = row.try_get("prediction")?;
    let confidence: Option<f64> = row.try_get("confidence")?;
    let processing_time: Option<f64> = row.try_get("processing_time")?;
    let regions: Option<String> = row.try_get("regions")?;
    let model_version: Option<String> = row.try_get("model_version")?;
    let image_quality: Option<String> = row.try_get("image_quality")?;
    let processed_at: Option<String> = row.try_get("processed_at")?;

    match (
        prediction,
        confidence,
        processing_time,
        regions,
        model_version,
        image_quality,
        processed_at,
    ) {
        (
            Some(prediction),
            Some(confidence),
            Some(processing_time),
            Some(regions),
            Some(model_version),
            Some(image_quality),
            Some(processed_at),
        ) => {
            let prediction: Prediction = prediction.parse().map_err(Error::Internal)?;
            let regions: Vec<Region> = serde_json::from_str(&regions).map_err(|e| {
                Error::Internal(format!("Invalid regions for study {}: {}", study_id, e))
            })?;

            Ok(Some(StudyAnalysis {
                classification: Classification {
                    prediction,
                    confidence,
                    processing_time,
                    regions,
                    model_version,
                    image_quality,
                },
                processed_at: parse_db_timestamp(&processed_at)?,
            }))
        }
        (None, None, None, None, None, None, None) => Ok(None),
        _ => {
            warn!(study_id = %study_id, "Study has partial analysis fields; treating as unanalyzed");
            Ok(None)
        }
    }
}
