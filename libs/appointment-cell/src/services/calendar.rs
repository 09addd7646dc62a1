// libs/appointment-cell/src/services/calendar.rs
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use tracing::debug;

use clinic_cell::ClinicStatusStore;
use shared_config::AppConfig;

use crate::error::AppointmentError;
use crate::models::TimeInterval;

/// Answers whether the clinic takes bookings for an interval.
#[async_trait]
pub trait ClinicCalendarGate: Send + Sync {
    async fn is_open_during(&self, interval: &TimeInterval) -> Result<bool, AppointmentError>;
}

/// Gate backed by the clinic status record. Only `open` is bookable, and the
/// record is read fresh on every call.
pub struct ClinicStatusGate {
    store: Arc<dyn ClinicStatusStore>,
}

impl ClinicStatusGate {
    pub fn new(store: Arc<dyn ClinicStatusStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ClinicCalendarGate for ClinicStatusGate {
    async fn is_open_during(&self, interval: &TimeInterval) -> Result<bool, AppointmentError> {
        let record = self.store.current().await?;
        debug!("Clinic is {} while checking {}", record.status, interval);
        Ok(record.status.accepts_bookings())
    }
}

/// Clinic-local calendar arithmetic: timezone, opening hours and slot grid.
#[derive(Debug, Clone, Copy)]
pub struct ClinicHours {
    pub offset: FixedOffset,
    pub opening_hour: u32,
    pub closing_hour: u32,
    pub slot_step: Duration,
}

impl ClinicHours {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            offset: config.clinic_utc_offset,
            opening_hour: config.clinic_opening_hour,
            closing_hour: config.clinic_closing_hour,
            slot_step: Duration::minutes(config.slot_step_minutes.max(1)),
        }
    }

    /// Start of `date` in clinic time, as a UTC instant. `None` at the edges
    /// of the calendar where the shift leaves the representable range.
    pub fn local_midnight(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        let naive = date
            .and_time(NaiveTime::MIN)
            .checked_sub_signed(Duration::seconds(self.offset.local_minus_utc() as i64))?;
        Some(Utc.from_utc_datetime(&naive))
    }

    pub fn opening_window(&self, date: NaiveDate) -> Result<TimeInterval, AppointmentError> {
        let midnight = self.local_midnight(date).ok_or(AppointmentError::TimeOutOfRange)?;
        let at_hour = |hour: u32| {
            midnight
                .checked_add_signed(Duration::hours(hour as i64))
                .ok_or(AppointmentError::TimeOutOfRange)
        };
        Ok(TimeInterval {
            start: at_hour(self.opening_hour)?,
            end: at_hour(self.closing_hour)?,
        })
    }

    /// `from_date`: an instant, or the local midnight of a date.
    pub fn parse_lower_bound(&self, raw: &str) -> Result<DateTime<Utc>, AppointmentError> {
        if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
            return Ok(instant.with_timezone(&Utc));
        }
        let date = parse_date(raw)?;
        self.local_midnight(date).ok_or_else(|| out_of_range(raw))
    }

    /// `to_date`: an instant (inclusive), or the whole local day of a date.
    pub fn parse_upper_bound(&self, raw: &str) -> Result<Bound<DateTime<Utc>>, AppointmentError> {
        if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Bound::Included(instant.with_timezone(&Utc)));
        }
        let date = parse_date(raw)?;
        self.local_midnight(date)
            .and_then(|midnight| midnight.checked_add_signed(Duration::days(1)))
            .map(Bound::Excluded)
            .ok_or_else(|| out_of_range(raw))
    }
}

impl Default for ClinicHours {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppointmentError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        AppointmentError::InvalidFilter(format!("'{}' is neither an RFC 3339 time nor a YYYY-MM-DD date", raw))
    })
}

fn out_of_range(raw: &str) -> AppointmentError {
    AppointmentError::InvalidFilter(format!("'{}' is outside the supported calendar range", raw))
}
