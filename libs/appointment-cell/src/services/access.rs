// libs/appointment-cell/src/services/access.rs
//
// Authorization rules per engine operation. Pure functions over the caller
// context so they can be exercised without a store or a transport.

use uuid::Uuid;

use crate::error::AppointmentError;
use crate::models::{Appointment, CallerContext};

/// Booking for a pet requires owning it unless the caller is an admin.
pub fn authorize_booking(caller: &CallerContext, pet_id: Uuid) -> Result<(), AppointmentError> {
    if caller.is_admin() || caller.owns_pet(pet_id) {
        Ok(())
    } else {
        Err(AppointmentError::Forbidden(
            "You can only book appointments for your own pets".to_string(),
        ))
    }
}

/// Reading, rescheduling and cancelling go through the pet the appointment is tied to.
pub fn authorize_access(caller: &CallerContext, appointment: &Appointment) -> Result<(), AppointmentError> {
    if caller.is_admin() || caller.owns_pet(appointment.pet_id) {
        Ok(())
    } else {
        Err(AppointmentError::Forbidden(
            "Not authorized to access this appointment".to_string(),
        ))
    }
}

/// Pets a listing is restricted to; `None` for admins.
pub fn list_scope(caller: &CallerContext) -> Option<std::collections::HashSet<Uuid>> {
    if caller.is_admin() {
        None
    } else {
        Some(caller.owned_pet_ids.clone())
    }
}
