// libs/appointment-cell/src/services/conflict.rs
use uuid::Uuid;

use crate::models::{Appointment, TimeInterval};

/// Half-open overlap: touching endpoints do not overlap.
pub fn intervals_overlap(a: &TimeInterval, b: &TimeInterval) -> bool {
    a.start < b.end && b.start < a.end
}

/// Active appointments in `existing` that overlap `candidate`, skipping `exclude_id`.
pub fn find_conflicts<'a>(
    candidate: &TimeInterval,
    existing: &'a [Appointment],
    exclude_id: Option<Uuid>,
) -> Vec<&'a Appointment> {
    existing
        .iter()
        .filter(|appointment| appointment.is_active())
        .filter(|appointment| Some(appointment.id) != exclude_id)
        .filter(|appointment| intervals_overlap(candidate, &appointment.interval()))
        .collect()
}

pub fn has_conflict(candidate: &TimeInterval, existing: &[Appointment], exclude_id: Option<Uuid>) -> bool {
    !find_conflicts(candidate, existing, exclude_id).is_empty()
}
