use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::course::Course;
use crate::models::siswa::Siswa;
use crate::models::tagihan::{
    CreateTagihanRequest, LaporanTagihanQuery, RingkasanTagihan, Tagihan, TagihanFilter,
    TagihanStatus, UpdateTagihanRequest,
};
use crate::models::user::User;
use crate::timezone;

/// Days until an invoice falls due when the caller gives no due date.
pub const DEFAULT_DUE_DAYS: i64 = 7;

#[async_trait]
pub trait BillingStore: Send + Sync {
    async fn find_siswa(&self, id: Uuid) -> AppResult<Option<Siswa>>;
    async fn find_siswa_by_email(&self, email: &str) -> AppResult<Vec<Siswa>>;
    async fn find_course(&self, id: Uuid) -> AppResult<Option<Course>>;

    async fn find_tagihan(&self, id: Uuid) -> AppResult<Option<Tagihan>>;
    async fn list_tagihan(&self, filter: &TagihanFilter) -> AppResult<Vec<Tagihan>>;
    async fn list_tagihan_for_siswa(&self, siswa_ids: &[Uuid]) -> AppResult<Vec<Tagihan>>;
    async fn insert_tagihan(&self, tagihan: &Tagihan) -> AppResult<Tagihan>;
    /// Writes due date, student, course and `updated_at`. Payment columns
    /// are left alone.
    async fn update_tagihan_details(&self, tagihan: &Tagihan) -> AppResult<Option<Tagihan>>;
    /// Marks the invoice paid in one statement. An existing `paid_at` is kept.
    async fn settle_tagihan(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<Option<Tagihan>>;
    async fn delete_tagihan(&self, id: Uuid) -> AppResult<bool>;
}

fn tagihan_not_found() -> AppError {
    AppError::NotFound("Tagihan tidak ditemukan.".into())
}

async fn resolve_siswa<S: BillingStore + ?Sized>(store: &S, id: Uuid) -> AppResult<Siswa> {
    store
        .find_siswa(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Siswa tidak ditemukan.".into()))
}

async fn resolve_course<S: BillingStore + ?Sized>(store: &S, id: Uuid) -> AppResult<Course> {
    store
        .find_course(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course tidak ditemukan.".into()))
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

pub async fn create_tagihan<S: BillingStore + ?Sized>(
    store: &S,
    payload: CreateTagihanRequest,
    now: DateTime<Utc>,
) -> AppResult<Tagihan> {
    let siswa = resolve_siswa(store, payload.siswa_id).await?;
    let course = resolve_course(store, payload.course_id).await?;

    let due_date = match non_empty(payload.due_date.as_deref()) {
        Some(raw) => timezone::parse_due_date(raw)?,
        None => now + Duration::days(DEFAULT_DUE_DAYS),
    };

    let tagihan = Tagihan {
        id: Uuid::new_v4(),
        siswa_id: siswa.id,
        siswa_name: siswa.fullname,
        siswa_email: siswa.email,
        course_id: course.id,
        course_name: course.name,
        amount: course.cost,
        due_date,
        paid: false,
        status: TagihanStatus::BelumBayar.as_str().to_string(),
        paid_at: None,
        created_at: now,
        updated_at: now,
    };

    let created = store.insert_tagihan(&tagihan).await?;
    tracing::info!(tagihan_id = %created.id, siswa_id = %created.siswa_id, amount = created.amount, "Tagihan created");
    Ok(created)
}

pub async fn get_tagihan<S: BillingStore + ?Sized>(store: &S, id: Uuid) -> AppResult<Tagihan> {
    store.find_tagihan(id).await?.ok_or_else(tagihan_not_found)
}

pub async fn list_tagihan<S: BillingStore + ?Sized>(store: &S) -> AppResult<Vec<Tagihan>> {
    store.list_tagihan(&TagihanFilter::default()).await
}

pub async fn update_tagihan<S: BillingStore + ?Sized>(
    store: &S,
    id: Uuid,
    payload: UpdateTagihanRequest,
    now: DateTime<Utc>,
) -> AppResult<Tagihan> {
    let mut tagihan = store.find_tagihan(id).await?.ok_or_else(tagihan_not_found)?;

    if let Some(amount) = payload.amount {
        if (amount - tagihan.amount).abs() > f64::EPSILON {
            return Err(AppError::InvalidInput(
                "Amount tagihan mengikuti biaya course dan tidak dapat diubah.".into(),
            ));
        }
    }

    let settle_hint = || {
        AppError::InvalidInput(
            "Status pembayaran hanya dapat diubah melalui PUT /tagihan/:id/bayar.".into(),
        )
    };
    if let Some(paid) = payload.paid {
        if paid != tagihan.paid {
            return Err(settle_hint());
        }
    }
    if let Some(raw) = payload.status.as_deref() {
        let status: TagihanStatus = raw.parse().map_err(AppError::InvalidInput)?;
        if status.as_str() != tagihan.status {
            return Err(settle_hint());
        }
    }

    if let Some(raw) = non_empty(payload.due_date.as_deref()) {
        tagihan.due_date = timezone::parse_due_date(raw)?;
    }

    if let Some(siswa_id) = payload.siswa_id {
        let siswa = resolve_siswa(store, siswa_id).await?;
        tagihan.siswa_id = siswa.id;
        tagihan.siswa_name = siswa.fullname;
        tagihan.siswa_email = siswa.email;
    }

    if let Some(course_id) = payload.course_id {
        let course = resolve_course(store, course_id).await?;
        tagihan.course_id = course.id;
        tagihan.course_name = course.name;
    }

    tagihan.updated_at = now;

    store
        .update_tagihan_details(&tagihan)
        .await?
        .ok_or_else(tagihan_not_found)
}

/// Settles an invoice. Settling a paid invoice again succeeds and leaves it
/// as it was.
pub async fn bayar_tagihan<S: BillingStore + ?Sized>(
    store: &S,
    id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<Tagihan> {
    let tagihan = store
        .settle_tagihan(id, now)
        .await?
        .ok_or_else(tagihan_not_found)?;
    tracing::info!(tagihan_id = %tagihan.id, "Tagihan settled");
    Ok(tagihan)
}

pub async fn delete_tagihan<S: BillingStore + ?Sized>(store: &S, id: Uuid) -> AppResult<()> {
    if store.delete_tagihan(id).await? {
        Ok(())
    } else {
        Err(tagihan_not_found())
    }
}

/// Builds the report filter: `status` is a comma-separated list and the date
/// bounds are inclusive WIB days. The range applies only when both bounds are
/// given; a lone bound is ignored.
pub fn laporan_filter(query: &LaporanTagihanQuery) -> AppResult<TagihanFilter> {
    let mut statuses = Vec::new();
    if let Some(raw) = query.status.as_deref() {
        for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let status: TagihanStatus = part.parse().map_err(AppError::InvalidInput)?;
            if !statuses.contains(&status) {
                statuses.push(status);
            }
        }
    }

    let created_between = match (
        non_empty(query.start_date.as_deref()),
        non_empty(query.end_date.as_deref()),
    ) {
        (Some(start), Some(end)) => Some(timezone::day_range(
            timezone::parse_date(start, "start_date")?,
            timezone::parse_date(end, "end_date")?,
        )?),
        _ => None,
    };

    Ok(TagihanFilter {
        statuses,
        created_between,
    })
}

pub async fn laporan_tagihan<S: BillingStore + ?Sized>(
    store: &S,
    query: &LaporanTagihanQuery,
) -> AppResult<(Vec<Tagihan>, RingkasanTagihan)> {
    let filter = laporan_filter(query)?;
    let tagihan = store.list_tagihan(&filter).await?;
    let ringkasan = RingkasanTagihan::from_tagihan(&tagihan);
    Ok((tagihan, ringkasan))
}

/// Invoices of the student records linked to `user` by email.
pub async fn tagihan_for_user<S: BillingStore + ?Sized>(
    store: &S,
    user: &User,
) -> AppResult<Vec<Tagihan>> {
    let siswa = store.find_siswa_by_email(&user.email).await?;
    if siswa.is_empty() {
        return Err(AppError::NotFound(
            "Data siswa untuk user ini tidak ditemukan.".into(),
        ));
    }
    let ids: Vec<Uuid> = siswa.iter().map(|s| s.id).collect();
    store.list_tagihan_for_siswa(&ids).await
}
