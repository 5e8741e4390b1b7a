use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::guru::Guru;
use crate::models::transaksi_guru::{
    CreateTransaksiGuruRequest, LaporanGuruQuery, TransaksiGuru, UpdateTransaksiGuruRequest,
};
use crate::timezone;

pub type TimeRange = (DateTime<Utc>, DateTime<Utc>);

#[async_trait]
pub trait PayoutStore: Send + Sync {
    async fn find_guru(&self, id: Uuid) -> AppResult<Option<Guru>>;

    /// Whether `guru_id` has a payout created inside `[from, until)`.
    async fn payout_exists_between(&self, guru_id: Uuid, range: TimeRange) -> AppResult<bool>;
    /// Inserts a payout. A second payout for the same guru and period is a
    /// `Conflict`.
    async fn insert_payout(&self, transaksi: &TransaksiGuru) -> AppResult<TransaksiGuru>;
    async fn find_payout(&self, id: Uuid) -> AppResult<Option<TransaksiGuru>>;
    /// Payouts created inside `range` (all of them for `None`), newest first.
    async fn list_payouts(&self, range: Option<TimeRange>) -> AppResult<Vec<TransaksiGuru>>;
    async fn update_payout(
        &self,
        id: Uuid,
        amount: f64,
        notes: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<TransaksiGuru>>;
    async fn delete_payout(&self, id: Uuid) -> AppResult<bool>;
}

fn payout_not_found() -> AppError {
    AppError::NotFound("Transaksi guru tidak ditemukan.".into())
}

fn validate_amount(amount: f64) -> AppResult<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::InvalidInput("Amount harus lebih dari 0.".into()));
    }
    Ok(())
}

/// Records a payout for the guru, at most one per WIB calendar month.
pub async fn create_payout<S: PayoutStore + ?Sized>(
    store: &S,
    payload: CreateTransaksiGuruRequest,
    now: DateTime<Utc>,
) -> AppResult<TransaksiGuru> {
    validate_amount(payload.amount)?;

    let guru = store
        .find_guru(payload.guru_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Guru tidak ditemukan.".into()))?;

    let periode = timezone::month_of(now)?;
    if store
        .payout_exists_between(guru.id, timezone::month_range(periode)?)
        .await?
    {
        tracing::info!(guru_id = %guru.id, %periode, "Duplicate monthly payout rejected");
        return Err(AppError::Conflict(
            "Guru ini sudah memiliki transaksi di bulan ini.".into(),
        ));
    }

    let transaksi = TransaksiGuru {
        id: Uuid::new_v4(),
        guru_id: guru.id,
        guru_name: guru.fullname,
        amount: payload.amount,
        periode,
        notes: payload.notes.trim().to_string(),
        created_at: now,
        updated_at: now,
    };

    store.insert_payout(&transaksi).await
}

pub async fn get_payout<S: PayoutStore + ?Sized>(store: &S, id: Uuid) -> AppResult<TransaksiGuru> {
    store.find_payout(id).await?.ok_or_else(payout_not_found)
}

pub async fn list_payouts<S: PayoutStore + ?Sized>(store: &S) -> AppResult<Vec<TransaksiGuru>> {
    store.list_payouts(None).await
}

/// Amount and notes only; guru and period are fixed at creation.
pub async fn update_payout<S: PayoutStore + ?Sized>(
    store: &S,
    id: Uuid,
    payload: UpdateTransaksiGuruRequest,
    now: DateTime<Utc>,
) -> AppResult<TransaksiGuru> {
    let current = store.find_payout(id).await?.ok_or_else(payout_not_found)?;

    let amount = payload.amount.unwrap_or(current.amount);
    validate_amount(amount)?;
    let notes = payload
        .notes
        .as_deref()
        .map(str::trim)
        .unwrap_or(&current.notes)
        .to_string();

    store
        .update_payout(id, amount, &notes, now)
        .await?
        .ok_or_else(payout_not_found)
}

pub async fn delete_payout<S: PayoutStore + ?Sized>(store: &S, id: Uuid) -> AppResult<()> {
    if store.delete_payout(id).await? {
        Ok(())
    } else {
        Err(payout_not_found())
    }
}

/// `month` (YYYY-MM) wins over `start_date`/`end_date`; otherwise both day
/// bounds are required.
pub fn laporan_range(query: &LaporanGuruQuery) -> AppResult<TimeRange> {
    let non_empty = |raw: &Option<String>| {
        raw.as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    if let Some(month) = non_empty(&query.month) {
        return timezone::month_range(timezone::parse_month(&month)?);
    }

    match (non_empty(&query.start_date), non_empty(&query.end_date)) {
        (Some(start), Some(end)) => timezone::day_range(
            timezone::parse_date(&start, "start_date")?,
            timezone::parse_date(&end, "end_date")?,
        ),
        _ => Err(AppError::InvalidInput(
            "start_date dan end_date wajib diisi (format YYYY-MM-DD).".into(),
        )),
    }
}

pub async fn laporan_payout<S: PayoutStore + ?Sized>(
    store: &S,
    query: &LaporanGuruQuery,
) -> AppResult<(Vec<TransaksiGuru>, f64)> {
    let range = laporan_range(query)?;
    let rows = store.list_payouts(Some(range)).await?;
    let total = rows.iter().map(|t| t.amount).sum();
    Ok((rows, total))
}
