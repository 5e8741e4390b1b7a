use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::course::{course_code, Course};
use crate::models::guru::Guru;
use crate::models::schedule::Schedule;
use crate::models::siswa::{Siswa, STATUS_AKTIF, STATUS_NONAKTIF};
use crate::models::tagihan::{Tagihan, TagihanFilter, TagihanStatus};
use crate::models::transaksi_guru::TransaksiGuru;
use crate::models::transaksi_siswa::{TransaksiSiswa, STATUS_PAID, STATUS_UNPAID};
use crate::models::user::{User, ROLE_USER, STATUS_ACTIVE};
use crate::services::billing::BillingStore;
use crate::services::enrollment::EnrollmentStore;
use crate::services::payout::{PayoutStore, TimeRange};

/// In-memory store for exercising the workflows without Postgres.
#[derive(Default)]
pub struct MemoryStore {
    siswa: Mutex<Vec<Siswa>>,
    courses: Mutex<Vec<Course>>,
    gurus: Mutex<Vec<Guru>>,
    tagihan: Mutex<Vec<Tagihan>>,
    payouts: Mutex<Vec<TransaksiGuru>>,
    schedules: Mutex<Vec<Schedule>>,
    transaksi_siswa: Mutex<Vec<TransaksiSiswa>>,
}

impl MemoryStore {
    pub fn add_course(&self, name: &str, cost: f64) -> Course {
        let mut courses = self.courses.lock().unwrap();
        let course = Course {
            id: Uuid::new_v4(),
            code: course_code(courses.len() as i64 + 1),
            name: name.to_string(),
            duration: 12,
            cost,
            description: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        courses.push(course.clone());
        course
    }

    pub fn add_siswa(&self, fullname: &str, email: &str) -> Siswa {
        let siswa = Siswa {
            id: Uuid::new_v4(),
            fullname: fullname.to_string(),
            address: "Jl. Merdeka 1".into(),
            phonenumber: "08123456789".into(),
            email: email.to_string(),
            status: STATUS_NONAKTIF.into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.siswa.lock().unwrap().push(siswa.clone());
        siswa
    }

    pub fn add_guru(&self, fullname: &str) -> Guru {
        let guru = Guru {
            id: Uuid::new_v4(),
            fullname: fullname.to_string(),
            address: "Jl. Sudirman 2".into(),
            phonenumber: "08987654321".into(),
            email: format!("{}@example.com", fullname.to_lowercase().replace(' ', ".")),
            school_subject: "Matematika".into(),
            status: "aktif".into(),
            joined_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.gurus.lock().unwrap().push(guru.clone());
        guru
    }

    pub fn add_transaksi_siswa(&self, siswa_id: Uuid, harga: f64) -> TransaksiSiswa {
        let transaksi = TransaksiSiswa {
            id: Uuid::new_v4(),
            siswa_id,
            user_id: Uuid::new_v4(),
            item: "Paket 12 pertemuan".into(),
            harga,
            tanggal: Utc::now(),
            status: STATUS_UNPAID.into(),
        };
        self.transaksi_siswa.lock().unwrap().push(transaksi.clone());
        transaksi
    }

    pub fn user(username: &str, email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: String::new(),
            role: ROLE_USER.into(),
            status: STATUS_ACTIVE.into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn tagihan_rows(&self) -> Vec<Tagihan> {
        self.tagihan.lock().unwrap().clone()
    }

    pub fn payout_rows(&self) -> Vec<TransaksiGuru> {
        self.payouts.lock().unwrap().clone()
    }

    pub fn siswa_rows(&self) -> Vec<Siswa> {
        self.siswa.lock().unwrap().clone()
    }

    pub fn schedule_rows(&self) -> Vec<Schedule> {
        self.schedules.lock().unwrap().clone()
    }
}

fn matches(filter: &TagihanFilter, tagihan: &Tagihan) -> bool {
    let status_ok = filter.statuses.is_empty()
        || filter.statuses.iter().any(|s| s.as_str() == tagihan.status);
    let range_ok = match filter.created_between {
        Some((from, until)) => tagihan.created_at >= from && tagihan.created_at < until,
        None => true,
    };
    status_ok && range_ok
}

fn newest_first_tagihan(mut rows: Vec<Tagihan>) -> Vec<Tagihan> {
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    rows
}

#[async_trait]
impl BillingStore for MemoryStore {
    async fn find_siswa(&self, id: Uuid) -> AppResult<Option<Siswa>> {
        Ok(self.siswa.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }

    async fn find_siswa_by_email(&self, email: &str) -> AppResult<Vec<Siswa>> {
        Ok(self
            .siswa
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.email.eq_ignore_ascii_case(email))
            .cloned()
            .collect())
    }

    async fn find_course(&self, id: Uuid) -> AppResult<Option<Course>> {
        Ok(self.courses.lock().unwrap().iter().find(|c| c.id == id).cloned())
    }

    async fn find_tagihan(&self, id: Uuid) -> AppResult<Option<Tagihan>> {
        Ok(self.tagihan.lock().unwrap().iter().find(|t| t.id == id).cloned())
    }

    async fn list_tagihan(&self, filter: &TagihanFilter) -> AppResult<Vec<Tagihan>> {
        let rows = self
            .tagihan
            .lock()
            .unwrap()
            .iter()
            .filter(|t| matches(filter, t))
            .cloned()
            .collect();
        Ok(newest_first_tagihan(rows))
    }

    async fn list_tagihan_for_siswa(&self, siswa_ids: &[Uuid]) -> AppResult<Vec<Tagihan>> {
        let rows = self
            .tagihan
            .lock()
            .unwrap()
            .iter()
            .filter(|t| siswa_ids.contains(&t.siswa_id))
            .cloned()
            .collect();
        Ok(newest_first_tagihan(rows))
    }

    async fn insert_tagihan(&self, tagihan: &Tagihan) -> AppResult<Tagihan> {
        self.tagihan.lock().unwrap().push(tagihan.clone());
        Ok(tagihan.clone())
    }

    async fn update_tagihan_details(&self, tagihan: &Tagihan) -> AppResult<Option<Tagihan>> {
        let mut rows = self.tagihan.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|t| t.id == tagihan.id) else {
            return Ok(None);
        };
        row.siswa_id = tagihan.siswa_id;
        row.siswa_name = tagihan.siswa_name.clone();
        row.siswa_email = tagihan.siswa_email.clone();
        row.course_id = tagihan.course_id;
        row.course_name = tagihan.course_name.clone();
        row.due_date = tagihan.due_date;
        row.updated_at = tagihan.updated_at;
        Ok(Some(row.clone()))
    }

    async fn settle_tagihan(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<Option<Tagihan>> {
        let mut rows = self.tagihan.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        row.paid = true;
        row.status = TagihanStatus::Lunas.as_str().to_string();
        row.paid_at = row.paid_at.or(Some(now));
        row.updated_at = now;
        Ok(Some(row.clone()))
    }

    async fn delete_tagihan(&self, id: Uuid) -> AppResult<bool> {
        let mut rows = self.tagihan.lock().unwrap();
        let before = rows.len();
        rows.retain(|t| t.id != id);
        Ok(rows.len() != before)
    }
}

#[async_trait]
impl PayoutStore for MemoryStore {
    async fn find_guru(&self, id: Uuid) -> AppResult<Option<Guru>> {
        Ok(self.gurus.lock().unwrap().iter().find(|g| g.id == id).cloned())
    }

    async fn payout_exists_between(&self, guru_id: Uuid, range: TimeRange) -> AppResult<bool> {
        let (from, until) = range;
        Ok(self
            .payouts
            .lock()
            .unwrap()
            .iter()
            .any(|p| p.guru_id == guru_id && p.created_at >= from && p.created_at < until))
    }

    async fn insert_payout(&self, transaksi: &TransaksiGuru) -> AppResult<TransaksiGuru> {
        let mut rows = self.payouts.lock().unwrap();
        if rows
            .iter()
            .any(|p| p.guru_id == transaksi.guru_id && p.periode == transaksi.periode)
        {
            return Err(AppError::Conflict(
                "Guru ini sudah memiliki transaksi di bulan ini.".into(),
            ));
        }
        rows.push(transaksi.clone());
        Ok(transaksi.clone())
    }

    async fn find_payout(&self, id: Uuid) -> AppResult<Option<TransaksiGuru>> {
        Ok(self.payouts.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn list_payouts(&self, range: Option<TimeRange>) -> AppResult<Vec<TransaksiGuru>> {
        let mut rows: Vec<TransaksiGuru> = self
            .payouts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| match range {
                Some((from, until)) => p.created_at >= from && p.created_at < until,
                None => true,
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn update_payout(
        &self,
        id: Uuid,
        amount: f64,
        notes: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<TransaksiGuru>> {
        let mut rows = self.payouts.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        row.amount = amount;
        row.notes = notes.to_string();
        row.updated_at = now;
        Ok(Some(row.clone()))
    }

    async fn delete_payout(&self, id: Uuid) -> AppResult<bool> {
        let mut rows = self.payouts.lock().unwrap();
        let before = rows.len();
        rows.retain(|p| p.id != id);
        Ok(rows.len() != before)
    }
}

#[async_trait]
impl EnrollmentStore for MemoryStore {
    async fn append_schedule(
        &self,
        course_id: Uuid,
        time: &[String],
        dates: &[String],
        now: DateTime<Utc>,
    ) -> AppResult<Option<Schedule>> {
        let Some(course) = self.courses.lock().unwrap().iter().find(|c| c.id == course_id).cloned()
        else {
            return Ok(None);
        };

        let mut rows = self.schedules.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|s| s.course_id == course_id) {
            row.name = course.name;
            row.dates.extend_from_slice(dates);
            row.updated_at = now;
            return Ok(Some(row.clone()));
        }

        let schedule = Schedule {
            course_id,
            name: course.name,
            time_slots: time.to_vec(),
            dates: dates.to_vec(),
            updated_at: now,
        };
        rows.push(schedule.clone());
        Ok(Some(schedule))
    }

    async fn pay_transaksi_siswa(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<Option<TransaksiSiswa>> {
        let mut rows = self.transaksi_siswa.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        if row.status == STATUS_PAID {
            return Err(AppError::Conflict("Transaksi sudah dibayar.".into()));
        }
        row.status = STATUS_PAID.into();

        if let Some(siswa) = self.siswa.lock().unwrap().iter_mut().find(|s| s.id == row.siswa_id) {
            siswa.status = STATUS_AKTIF.into();
            siswa.updated_at = now;
        }
        Ok(Some(row.clone()))
    }
}
