use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::{with_timeout, Database};
use crate::error::{AppError, AppResult};
use crate::models::course::Course;
use crate::models::guru::Guru;
use crate::models::schedule::Schedule;
use crate::models::siswa::{Siswa, STATUS_AKTIF};
use crate::models::tagihan::{Tagihan, TagihanFilter, TagihanStatus};
use crate::models::transaksi_guru::TransaksiGuru;
use crate::models::transaksi_siswa::{TransaksiSiswa, STATUS_PAID};
use crate::services::billing::BillingStore;
use crate::services::enrollment::EnrollmentStore;
use crate::services::payout::{PayoutStore, TimeRange};

const PAYOUT_PERIOD_CONSTRAINT: &str = "transaksi_guru_guru_periode_key";

/// Postgres-backed store; every call is bounded by `timeout`.
#[derive(Clone)]
pub struct PgStore {
    db: Database,
    timeout: Duration,
}

impl PgStore {
    pub fn new(db: Database, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    async fn pay_in_transaction(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<TransaksiSiswa>> {
        let mut tx = self.db.begin().await?;

        let Some(transaksi) = sqlx::query_as::<_, TransaksiSiswa>(
            "SELECT * FROM transaksi_siswa WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };

        // Transaksi yang sudah dibayar tidak diproses ulang
        if transaksi.status == STATUS_PAID {
            return Err(AppError::Conflict("Transaksi sudah dibayar.".into()));
        }

        let paid = sqlx::query_as::<_, TransaksiSiswa>(
            "UPDATE transaksi_siswa SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(STATUS_PAID)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE siswa SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(paid.siswa_id)
            .bind(STATUS_AKTIF)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(paid))
    }
}

#[async_trait]
impl BillingStore for PgStore {
    async fn find_siswa(&self, id: Uuid) -> AppResult<Option<Siswa>> {
        with_timeout(
            self.timeout,
            sqlx::query_as::<_, Siswa>("SELECT * FROM siswa WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db),
        )
        .await
    }

    async fn find_siswa_by_email(&self, email: &str) -> AppResult<Vec<Siswa>> {
        with_timeout(
            self.timeout,
            sqlx::query_as::<_, Siswa>("SELECT * FROM siswa WHERE LOWER(email) = LOWER($1)")
                .bind(email)
                .fetch_all(&self.db),
        )
        .await
    }

    async fn find_course(&self, id: Uuid) -> AppResult<Option<Course>> {
        with_timeout(
            self.timeout,
            sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db),
        )
        .await
    }

    async fn find_tagihan(&self, id: Uuid) -> AppResult<Option<Tagihan>> {
        with_timeout(
            self.timeout,
            sqlx::query_as::<_, Tagihan>("SELECT * FROM tagihan WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db),
        )
        .await
    }

    async fn list_tagihan(&self, filter: &TagihanFilter) -> AppResult<Vec<Tagihan>> {
        let mut sql = "SELECT * FROM tagihan WHERE TRUE".to_string();
        let mut param_count = 1;

        if !filter.statuses.is_empty() {
            sql.push_str(&format!(" AND status = ANY(${})", param_count));
            param_count += 1;
        }

        if filter.created_between.is_some() {
            sql.push_str(&format!(
                " AND created_at >= ${} AND created_at < ${}",
                param_count,
                param_count + 1
            ));
        }

        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query_as::<_, Tagihan>(&sql);
        if !filter.statuses.is_empty() {
            query = query.bind(filter.status_strings());
        }
        if let Some((from, until)) = filter.created_between {
            query = query.bind(from).bind(until);
        }

        with_timeout(self.timeout, query.fetch_all(&self.db)).await
    }

    async fn list_tagihan_for_siswa(&self, siswa_ids: &[Uuid]) -> AppResult<Vec<Tagihan>> {
        with_timeout(
            self.timeout,
            sqlx::query_as::<_, Tagihan>(
                "SELECT * FROM tagihan WHERE siswa_id = ANY($1) ORDER BY created_at DESC",
            )
            .bind(siswa_ids)
            .fetch_all(&self.db),
        )
        .await
    }

    async fn insert_tagihan(&self, tagihan: &Tagihan) -> AppResult<Tagihan> {
        with_timeout(
            self.timeout,
            sqlx::query_as::<_, Tagihan>(
                r#"INSERT INTO tagihan
                   (id, siswa_id, siswa_name, siswa_email, course_id, course_name, amount,
                    due_date, paid, status, paid_at, created_at, updated_at)
                   VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                   RETURNING *"#,
            )
            .bind(tagihan.id)
            .bind(tagihan.siswa_id)
            .bind(&tagihan.siswa_name)
            .bind(&tagihan.siswa_email)
            .bind(tagihan.course_id)
            .bind(&tagihan.course_name)
            .bind(tagihan.amount)
            .bind(tagihan.due_date)
            .bind(tagihan.paid)
            .bind(&tagihan.status)
            .bind(tagihan.paid_at)
            .bind(tagihan.created_at)
            .bind(tagihan.updated_at)
            .fetch_one(&self.db),
        )
        .await
    }

    async fn update_tagihan_details(&self, tagihan: &Tagihan) -> AppResult<Option<Tagihan>> {
        with_timeout(
            self.timeout,
            sqlx::query_as::<_, Tagihan>(
                r#"UPDATE tagihan SET
                   siswa_id = $2,
                   siswa_name = $3,
                   siswa_email = $4,
                   course_id = $5,
                   course_name = $6,
                   due_date = $7,
                   updated_at = $8
                   WHERE id = $1 RETURNING *"#,
            )
            .bind(tagihan.id)
            .bind(tagihan.siswa_id)
            .bind(&tagihan.siswa_name)
            .bind(&tagihan.siswa_email)
            .bind(tagihan.course_id)
            .bind(&tagihan.course_name)
            .bind(tagihan.due_date)
            .bind(tagihan.updated_at)
            .fetch_optional(&self.db),
        )
        .await
    }

    async fn settle_tagihan(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<Option<Tagihan>> {
        with_timeout(
            self.timeout,
            sqlx::query_as::<_, Tagihan>(
                r#"UPDATE tagihan SET
                   paid = TRUE,
                   status = $2,
                   paid_at = COALESCE(paid_at, $3),
                   updated_at = $3
                   WHERE id = $1 RETURNING *"#,
            )
            .bind(id)
            .bind(TagihanStatus::Lunas.as_str())
            .bind(now)
            .fetch_optional(&self.db),
        )
        .await
    }

    async fn delete_tagihan(&self, id: Uuid) -> AppResult<bool> {
        let result = with_timeout(
            self.timeout,
            sqlx::query("DELETE FROM tagihan WHERE id = $1")
                .bind(id)
                .execute(&self.db),
        )
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PayoutStore for PgStore {
    async fn find_guru(&self, id: Uuid) -> AppResult<Option<Guru>> {
        with_timeout(
            self.timeout,
            sqlx::query_as::<_, Guru>("SELECT * FROM gurus WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db),
        )
        .await
    }

    async fn payout_exists_between(&self, guru_id: Uuid, range: TimeRange) -> AppResult<bool> {
        let (from, until) = range;
        with_timeout(
            self.timeout,
            sqlx::query_scalar::<_, bool>(
                r#"SELECT EXISTS(
                       SELECT 1 FROM transaksi_guru
                       WHERE guru_id = $1 AND created_at >= $2 AND created_at < $3
                   )"#,
            )
            .bind(guru_id)
            .bind(from)
            .bind(until)
            .fetch_one(&self.db),
        )
        .await
    }

    async fn insert_payout(&self, transaksi: &TransaksiGuru) -> AppResult<TransaksiGuru> {
        let insert = sqlx::query_as::<_, TransaksiGuru>(
            r#"INSERT INTO transaksi_guru
               (id, guru_id, guru_name, amount, periode, notes, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING *"#,
        )
        .bind(transaksi.id)
        .bind(transaksi.guru_id)
        .bind(&transaksi.guru_name)
        .bind(transaksi.amount)
        .bind(transaksi.periode)
        .bind(&transaksi.notes)
        .bind(transaksi.created_at)
        .bind(transaksi.updated_at)
        .fetch_one(&self.db);

        tokio::time::timeout(self.timeout, insert)
            .await?
            .map_err(|err| {
                AppError::from_unique_violation(
                    err,
                    PAYOUT_PERIOD_CONSTRAINT,
                    "Guru ini sudah memiliki transaksi di bulan ini.",
                )
            })
    }

    async fn find_payout(&self, id: Uuid) -> AppResult<Option<TransaksiGuru>> {
        with_timeout(
            self.timeout,
            sqlx::query_as::<_, TransaksiGuru>("SELECT * FROM transaksi_guru WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db),
        )
        .await
    }

    async fn list_payouts(&self, range: Option<TimeRange>) -> AppResult<Vec<TransaksiGuru>> {
        let query = match range {
            Some((from, until)) => sqlx::query_as::<_, TransaksiGuru>(
                r#"SELECT * FROM transaksi_guru
                   WHERE created_at >= $1 AND created_at < $2
                   ORDER BY created_at DESC"#,
            )
            .bind(from)
            .bind(until),
            None => sqlx::query_as::<_, TransaksiGuru>(
                "SELECT * FROM transaksi_guru ORDER BY created_at DESC",
            ),
        };

        with_timeout(self.timeout, query.fetch_all(&self.db)).await
    }

    async fn update_payout(
        &self,
        id: Uuid,
        amount: f64,
        notes: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<TransaksiGuru>> {
        with_timeout(
            self.timeout,
            sqlx::query_as::<_, TransaksiGuru>(
                r#"UPDATE transaksi_guru SET amount = $2, notes = $3, updated_at = $4
                   WHERE id = $1 RETURNING *"#,
            )
            .bind(id)
            .bind(amount)
            .bind(notes)
            .bind(now)
            .fetch_optional(&self.db),
        )
        .await
    }

    async fn delete_payout(&self, id: Uuid) -> AppResult<bool> {
        let result = with_timeout(
            self.timeout,
            sqlx::query("DELETE FROM transaksi_guru WHERE id = $1")
                .bind(id)
                .execute(&self.db),
        )
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl EnrollmentStore for PgStore {
    async fn append_schedule(
        &self,
        course_id: Uuid,
        time: &[String],
        dates: &[String],
        now: DateTime<Utc>,
    ) -> AppResult<Option<Schedule>> {
        let course = with_timeout(
            self.timeout,
            sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
                .bind(course_id)
                .fetch_optional(&self.db),
        )
        .await?;
        let Some(course) = course else {
            return Ok(None);
        };

        with_timeout(
            self.timeout,
            sqlx::query_as::<_, Schedule>(
                r#"INSERT INTO course_schedules (course_id, name, time_slots, dates, updated_at)
                   VALUES ($1, $2, $3, $4, $5)
                   ON CONFLICT (course_id) DO UPDATE SET
                       name = EXCLUDED.name,
                       dates = course_schedules.dates || EXCLUDED.dates,
                       updated_at = EXCLUDED.updated_at
                   RETURNING *"#,
            )
            .bind(course.id)
            .bind(&course.name)
            .bind(time)
            .bind(dates)
            .bind(now)
            .fetch_one(&self.db),
        )
        .await
        .map(Some)
    }

    async fn pay_transaksi_siswa(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<TransaksiSiswa>> {
        tokio::time::timeout(self.timeout, self.pay_in_transaction(id, now)).await?
    }
}
