//! Appointment records: the user's active bookings and the two mutations a
//! client may perform on them, cancellation and rescheduling.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

use crate::model::RecordId;
use crate::{AppError, ErrorKind};

const BUNDLED_SEED: &str = include_str!("../data/appointments.json");

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordsError {
    #[error("Please state a reason for cancelling")]
    EmptyReason,

    #[error("Please choose a date")]
    MissingDate,

    #[error("Please choose a time")]
    MissingTime,

    #[error("{0} is not one of the offered dates")]
    DateNotOffered(NaiveDate),

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid time '{0}', expected one of 10:00..17:00")]
    InvalidTime(String),

    #[error("appointment {0} not found")]
    NotFound(RecordId),

    #[error("appointment {0} was already cancelled")]
    AlreadyCancelled(RecordId),

    #[error("duplicate appointment id {0} in seed data")]
    DuplicateId(RecordId),

    #[error("appointments were already loaded")]
    AlreadySeeded,

    #[error("invalid seed data: {0}")]
    InvalidSeed(String),
}

impl From<RecordsError> for AppError {
    fn from(e: RecordsError) -> Self {
        let kind = match &e {
            RecordsError::EmptyReason
            | RecordsError::MissingDate
            | RecordsError::MissingTime
            | RecordsError::DateNotOffered(_)
            | RecordsError::InvalidDate(_)
            | RecordsError::InvalidTime(_) => ErrorKind::Validation,
            RecordsError::NotFound(_) | RecordsError::AlreadyCancelled(_) => ErrorKind::NotFound,
            RecordsError::DuplicateId(_) | RecordsError::AlreadySeeded => ErrorKind::InvalidState,
            RecordsError::InvalidSeed(_) => ErrorKind::Deserialization,
        };
        let error = AppError::new(kind, e.to_string());
        match e {
            RecordsError::NotFound(id) | RecordsError::AlreadyCancelled(id) => {
                error.with_context("record_id", id.0)
            }
            _ => error,
        }
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate, RecordsError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| RecordsError::InvalidDate(s.to_string()))
}

/// One of the fixed hourly booking slots, `10:00` through `17:00`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeSlot {
    hour: u8,
}

impl TimeSlot {
    pub const FIRST_HOUR: u8 = 10;
    pub const LAST_HOUR: u8 = 17;

    pub fn from_hour(hour: u8) -> Option<Self> {
        (Self::FIRST_HOUR..=Self::LAST_HOUR)
            .contains(&hour)
            .then_some(Self { hour })
    }

    pub fn all() -> impl Iterator<Item = TimeSlot> {
        (Self::FIRST_HOUR..=Self::LAST_HOUR).map(|hour| Self { hour })
    }

    pub fn hour(self) -> u8 {
        self.hour
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00", self.hour)
    }
}

impl FromStr for TimeSlot {
    type Err = RecordsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RecordsError::InvalidTime(s.to_string());
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        if minute != "00" || hour.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        Self::from_hour(hour).ok_or_else(invalid)
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = RecordsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub id: RecordId,
    pub date: NaiveDate,
    pub time: TimeSlot,
    pub service: String,
    /// Whole roubles.
    pub price: u32,
    /// Assigned staff member.
    pub master: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsSeed {
    pub offered_dates: Vec<NaiveDate>,
    pub records: Vec<AppointmentRecord>,
}

impl RecordsSeed {
    /// Mock data shipped with the app until a booking backend supplies it.
    pub fn bundled() -> Result<Self, RecordsError> {
        serde_json::from_str(BUNDLED_SEED).map_err(|e| RecordsError::InvalidSeed(e.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cancellation {
    pub record: AppointmentRecord,
    pub reason: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RecordsStore {
    records: Vec<AppointmentRecord>,
    offered_dates: Vec<NaiveDate>,
    retired: BTreeSet<RecordId>,
    seeded: bool,
}

impl RecordsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Installs the initial record set. Accepted once per store.
    pub fn seed(&mut self, seed: RecordsSeed) -> Result<(), RecordsError> {
        if self.seeded {
            return Err(RecordsError::AlreadySeeded);
        }

        let mut seen = BTreeSet::new();
        for record in &seed.records {
            if !seen.insert(&record.id) {
                return Err(RecordsError::DuplicateId(record.id.clone()));
            }
        }

        let mut seen_dates = BTreeSet::new();
        let offered_dates: Vec<NaiveDate> = seed
            .offered_dates
            .into_iter()
            .filter(|d| seen_dates.insert(*d))
            .collect();

        info!(
            records = seed.records.len(),
            offered_dates = offered_dates.len(),
            "appointments seeded"
        );

        self.records = seed.records;
        self.offered_dates = offered_dates;
        self.seeded = true;
        Ok(())
    }

    pub fn records(&self) -> &[AppointmentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &RecordId) -> Option<&AppointmentRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn offered_dates(&self) -> &[NaiveDate] {
        &self.offered_dates
    }

    pub fn is_offered(&self, date: NaiveDate) -> bool {
        self.offered_dates.contains(&date)
    }

    pub fn is_retired(&self, id: &RecordId) -> bool {
        self.retired.contains(id)
    }

    fn lookup_error(&self, id: &RecordId) -> RecordsError {
        if self.is_retired(id) {
            RecordsError::AlreadyCancelled(id.clone())
        } else {
            RecordsError::NotFound(id.clone())
        }
    }

    /// Removes the record for good. Its id is retired and cannot come back.
    pub fn cancel(&mut self, id: &RecordId, reason: &str) -> Result<Cancellation, RecordsError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(RecordsError::EmptyReason);
        }

        let Some(position) = self.records.iter().position(|r| &r.id == id) else {
            let error = self.lookup_error(id);
            warn!(record_id = %id, %error, "cancel rejected");
            return Err(error);
        };

        let record = self.records.remove(position);
        self.retired.insert(record.id.clone());

        // No booking backend yet: the log line is the only record of the reason.
        info!(
            record_id = %record.id,
            service = %record.service,
            date = %record.date,
            time = %record.time,
            reason,
            "appointment cancelled"
        );

        Ok(Cancellation {
            record,
            reason: reason.to_string(),
        })
    }

    /// Moves a record to a new offered date and slot, in place.
    pub fn reschedule(
        &mut self,
        id: &RecordId,
        date: Option<NaiveDate>,
        time: Option<TimeSlot>,
    ) -> Result<&AppointmentRecord, RecordsError> {
        let date = date.ok_or(RecordsError::MissingDate)?;
        let time = time.ok_or(RecordsError::MissingTime)?;

        if !self.is_offered(date) {
            return Err(RecordsError::DateNotOffered(date));
        }

        let Some(position) = self.records.iter().position(|r| &r.id == id) else {
            let error = self.lookup_error(id);
            warn!(record_id = %id, %error, "reschedule rejected");
            return Err(error);
        };

        let record = &mut self.records[position];
        info!(
            record_id = %record.id,
            from_date = %record.date,
            from_time = %record.time,
            to_date = %date,
            to_time = %time,
            "appointment rescheduled"
        );
        record.date = date;
        record.time = time;
        Ok(record)
    }
}

/// Confirmation dialog for a pending mutation on one record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordDialog {
    Cancel {
        record_id: RecordId,
        reason: String,
        error: Option<AppError>,
    },
    Reschedule {
        record_id: RecordId,
        date: Option<NaiveDate>,
        time: Option<TimeSlot>,
        error: Option<AppError>,
    },
}

impl RecordDialog {
    pub fn cancel(store: &RecordsStore, record_id: RecordId) -> Result<Self, RecordsError> {
        if store.get(&record_id).is_none() {
            return Err(store.lookup_error(&record_id));
        }
        Ok(Self::Cancel {
            record_id,
            reason: String::new(),
            error: None,
        })
    }

    pub fn reschedule(store: &RecordsStore, record_id: RecordId) -> Result<Self, RecordsError> {
        if store.get(&record_id).is_none() {
            return Err(store.lookup_error(&record_id));
        }
        Ok(Self::Reschedule {
            record_id,
            date: None,
            time: None,
            error: None,
        })
    }

    pub fn record_id(&self) -> &RecordId {
        match self {
            Self::Cancel { record_id, .. } | Self::Reschedule { record_id, .. } => record_id,
        }
    }

    /// The slot picker is offered only once a date is chosen.
    pub fn shows_time_picker(&self) -> bool {
        matches!(self, Self::Reschedule { date: Some(_), .. })
    }

    /// Cancel validates on confirm; reschedule needs both choices first.
    pub fn can_confirm(&self) -> bool {
        match self {
            Self::Cancel { .. } => true,
            Self::Reschedule { date, time, .. } => date.is_some() && time.is_some(),
        }
    }

    pub fn set_error(&mut self, new_error: AppError) {
        match self {
            Self::Cancel { error, .. } | Self::Reschedule { error, .. } => *error = Some(new_error),
        }
    }
}
