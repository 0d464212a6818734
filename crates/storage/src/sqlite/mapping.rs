use exam_core::timer::TimerSnapshot;
use sqlx::Row;

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn paused_from_i64(v: i64) -> Result<bool, StorageError> {
    match v {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(StorageError::Serialization(format!("invalid paused flag: {v}"))),
    }
}

pub(crate) fn paused_to_i64(paused: bool) -> i64 {
    i64::from(paused)
}

pub(crate) fn map_snapshot_row(row: &sqlx::sqlite::SqliteRow) -> Result<TimerSnapshot, StorageError> {
    let remaining_seconds = u32_from_i64(
        "remaining_seconds",
        row.try_get::<i64, _>("remaining_seconds").map_err(ser)?,
    )?;
    let paused = paused_from_i64(row.try_get::<i64, _>("paused").map_err(ser)?)?;
    let saved_at_epoch_millis = row.try_get::<i64, _>("saved_at_ms").map_err(ser)?;

    Ok(TimerSnapshot::new(
        remaining_seconds,
        paused,
        saved_at_epoch_millis,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paused_flag_round_trips() {
        assert!(!paused_from_i64(paused_to_i64(false)).unwrap());
        assert!(paused_from_i64(paused_to_i64(true)).unwrap());
        assert!(paused_from_i64(2).is_err());
    }

    #[test]
    fn negative_remaining_is_rejected() {
        assert!(u32_from_i64("remaining_seconds", -1).is_err());
        assert_eq!(u32_from_i64("remaining_seconds", 30).unwrap(), 30);
    }
}
