use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::schedule::{AddScheduleRequest, Schedule};
use crate::models::transaksi_siswa::TransaksiSiswa;
use crate::timezone;

#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    /// Creates the course's schedule row, or appends `dates` to the existing
    /// one. `None` when the course does not exist.
    async fn append_schedule(
        &self,
        course_id: Uuid,
        time: &[String],
        dates: &[String],
        now: DateTime<Utc>,
    ) -> AppResult<Option<Schedule>>;

    /// Marks the purchase paid and activates its siswa atomically. `Conflict`
    /// when it is already paid, `None` when it does not exist.
    async fn pay_transaksi_siswa(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<TransaksiSiswa>>;
}

/// Time slots must be non-blank and dates must be `YYYY-MM-DD`.
pub fn validate_slots(time: &[String], dates: &[String]) -> AppResult<(Vec<String>, Vec<String>)> {
    if time.is_empty() || dates.is_empty() {
        return Err(AppError::InvalidInput("Time dan dates wajib diisi.".into()));
    }

    let time: Vec<String> = time.iter().map(|slot| slot.trim().to_string()).collect();
    if time.iter().any(String::is_empty) {
        return Err(AppError::InvalidInput("Time tidak boleh kosong.".into()));
    }

    let dates = dates
        .iter()
        .map(|raw| {
            timezone::parse_date(raw, "dates").map(|date| date.format(timezone::DATE_FORMAT).to_string())
        })
        .collect::<AppResult<Vec<String>>>()?;

    Ok((time, dates))
}

/// Adds dates to a course schedule. A course has at most one schedule row;
/// its time slots are set when the row is first created.
pub async fn add_schedule<S: EnrollmentStore + ?Sized>(
    store: &S,
    payload: AddScheduleRequest,
    now: DateTime<Utc>,
) -> AppResult<Schedule> {
    let (time, dates) = validate_slots(&payload.time, &payload.dates)?;

    store
        .append_schedule(payload.course_id, &time, &dates, now)
        .await?
        .ok_or_else(|| AppError::NotFound("Course tidak ditemukan.".into()))
}

pub async fn bayar_transaksi<S: EnrollmentStore + ?Sized>(
    store: &S,
    id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<TransaksiSiswa> {
    let paid = store
        .pay_transaksi_siswa(id, now)
        .await?
        .ok_or_else(|| AppError::NotFound("Transaksi siswa tidak ditemukan.".into()))?;
    tracing::info!(transaksi_id = %paid.id, siswa_id = %paid.siswa_id, "Transaksi siswa paid");
    Ok(paid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::siswa::{STATUS_AKTIF, STATUS_NONAKTIF};
    use crate::models::transaksi_siswa::{STATUS_PAID, STATUS_UNPAID};
    use crate::services::memory::MemoryStore;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 3, 0, 0).unwrap()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn schedule_request(course_id: Uuid, time: &[&str], dates: &[&str]) -> AddScheduleRequest {
        AddScheduleRequest {
            course_id,
            time: strings(time),
            dates: strings(dates),
        }
    }

    #[test]
    fn normalizes_slots_and_dates() {
        let (time, dates) =
            validate_slots(&strings(&[" 08:00-10:00 "]), &strings(&["2025-03-01"])).unwrap();
        assert_eq!(time, vec!["08:00-10:00"]);
        assert_eq!(dates, vec!["2025-03-01"]);
    }

    #[test]
    fn rejects_missing_or_malformed_entries() {
        assert!(validate_slots(&[], &strings(&["2025-03-01"])).is_err());
        assert!(validate_slots(&strings(&["08:00"]), &[]).is_err());
        assert!(validate_slots(&strings(&["  "]), &strings(&["2025-03-01"])).is_err());
        assert!(validate_slots(&strings(&["08:00"]), &strings(&["01-03-2025"])).is_err());
    }

    #[tokio::test]
    async fn second_add_appends_dates_to_the_same_row() {
        let store = MemoryStore::default();
        let course = store.add_course("Algebra", 100.0);

        let first = add_schedule(
            &store,
            schedule_request(course.id, &["08:00-10:00"], &["2025-03-01"]),
            now(),
        )
        .await
        .unwrap();
        assert_eq!(first.name, "Algebra");
        assert_eq!(first.dates, vec!["2025-03-01"]);

        let later = now() + chrono::Duration::hours(1);
        let second = add_schedule(
            &store,
            schedule_request(course.id, &["13:00-15:00"], &["2025-03-08", "2025-03-15"]),
            later,
        )
        .await
        .unwrap();

        assert_eq!(second.dates, vec!["2025-03-01", "2025-03-08", "2025-03-15"]);
        assert_eq!(second.time_slots, vec!["08:00-10:00"]);
        assert_eq!(second.updated_at, later);

        let rows = store.schedule_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].course_id, course.id);
        assert_eq!(rows[0].dates.len(), 3);
    }

    #[tokio::test]
    async fn schedules_of_different_courses_stay_apart() {
        let store = MemoryStore::default();
        let algebra = store.add_course("Algebra", 100.0);
        let calculus = store.add_course("Calculus", 250.0);

        add_schedule(&store, schedule_request(algebra.id, &["08:00"], &["2025-03-01"]), now())
            .await
            .unwrap();
        add_schedule(&store, schedule_request(calculus.id, &["10:00"], &["2025-03-02"]), now())
            .await
            .unwrap();

        assert_eq!(store.schedule_rows().len(), 2);
    }

    #[tokio::test]
    async fn schedule_for_unknown_course_is_not_found() {
        let store = MemoryStore::default();
        let err = add_schedule(
            &store,
            schedule_request(Uuid::new_v4(), &["08:00"], &["2025-03-01"]),
            now(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(store.schedule_rows().is_empty());
    }

    #[tokio::test]
    async fn paying_activates_the_siswa() {
        let store = MemoryStore::default();
        let siswa = store.add_siswa("Budi Santoso", "budi@example.com");
        let other = store.add_siswa("Sari Dewi", "sari@example.com");
        let transaksi = store.add_transaksi_siswa(siswa.id, 150_000.0);
        assert_eq!(transaksi.status, STATUS_UNPAID);

        let paid = bayar_transaksi(&store, transaksi.id, now()).await.unwrap();
        assert_eq!(paid.status, STATUS_PAID);
        assert_eq!(paid.siswa_id, siswa.id);

        let rows = store.siswa_rows();
        let budi = rows.iter().find(|s| s.id == siswa.id).unwrap();
        assert_eq!(budi.status, STATUS_AKTIF);
        assert_eq!(budi.updated_at, now());
        let sari = rows.iter().find(|s| s.id == other.id).unwrap();
        assert_eq!(sari.status, STATUS_NONAKTIF);
    }

    #[tokio::test]
    async fn paying_twice_conflicts() {
        let store = MemoryStore::default();
        let siswa = store.add_siswa("Budi Santoso", "budi@example.com");
        let transaksi = store.add_transaksi_siswa(siswa.id, 150_000.0);

        bayar_transaksi(&store, transaksi.id, now()).await.unwrap();
        let err = bayar_transaksi(&store, transaksi.id, now()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn paying_unknown_transaksi_is_not_found() {
        let store = MemoryStore::default();
        let siswa = store.add_siswa("Budi Santoso", "budi@example.com");

        let err = bayar_transaksi(&store, Uuid::new_v4(), now()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(store.siswa_rows()[0].id, siswa.id);
        assert_eq!(store.siswa_rows()[0].status, STATUS_NONAKTIF);
    }
}
