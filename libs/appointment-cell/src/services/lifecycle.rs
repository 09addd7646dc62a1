// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use shared_models::auth::Role;

use crate::error::AppointmentError;
use crate::models::AppointmentStatus;

/// Who may drive a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    AdminOnly,
    OwnerOrAdmin,
}

impl Actor {
    pub fn permits(&self, role: Role) -> bool {
        match self {
            Actor::AdminOnly => role == Role::Admin,
            Actor::OwnerOrAdmin => true,
        }
    }
}

/// Every legal transition. Completed and cancelled have no outgoing rows.
pub const TRANSITIONS: [(AppointmentStatus, AppointmentStatus, Actor); 4] = [
    (AppointmentStatus::Pending, AppointmentStatus::Confirmed, Actor::AdminOnly),
    (AppointmentStatus::Confirmed, AppointmentStatus::Completed, Actor::AdminOnly),
    (AppointmentStatus::Pending, AppointmentStatus::Cancelled, Actor::OwnerOrAdmin),
    (AppointmentStatus::Confirmed, AppointmentStatus::Cancelled, Actor::OwnerOrAdmin),
];

#[derive(Debug, Default)]
pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Checks role first, then the table. A target the role can never reach is a
    /// policy failure (Forbidden) even when the current state is terminal.
    pub fn validate_status_transition(
        &self,
        role: Role,
        current: AppointmentStatus,
        target: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition {} -> {} for {}", current, target, role);

        let mut rows_to_target = TRANSITIONS.iter().filter(|(_, to, _)| *to == target).peekable();
        if rows_to_target.peek().is_some() && !rows_to_target.any(|(_, _, actor)| actor.permits(role)) {
            warn!("{} may not set appointments to {}", role, target);
            return Err(AppointmentError::Forbidden(format!(
                "Only admin can set an appointment to {}",
                target
            )));
        }

        if !self.get_valid_transitions(current).contains(&target) {
            warn!("Invalid status transition attempted: {} -> {}", current, target);
            return Err(AppointmentError::InvalidStatusTransition {
                from: current,
                to: target,
            });
        }

        Ok(())
    }

    pub fn get_valid_transitions(&self, current: AppointmentStatus) -> Vec<AppointmentStatus> {
        TRANSITIONS
            .iter()
            .filter(|(from, _, _)| *from == current)
            .map(|(_, to, _)| *to)
            .collect()
    }

    pub fn can_be_rescheduled(&self, status: AppointmentStatus) -> bool {
        status.is_active()
    }
}
