#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use appointment_cell::{
    AppointmentBookingService, AppointmentRepository, AvailabilityService, CallerContext, ClinicCalendarGate,
    ClinicHours, ClinicStatusGate, CreateAppointmentRequest, FixedClock, InMemoryAppointmentRepository,
    InMemoryPetDirectory, ServiceType,
};
use clinic_cell::InMemoryClinicStatusStore;

pub fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, day, hour, minute, 0).unwrap()
}

/// "Now" for every engine test: a month before the bookings.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap()
}

pub struct Clinic {
    pub booking: AppointmentBookingService,
    pub availability: AvailabilityService,
    pub repository: Arc<InMemoryAppointmentRepository>,
    pub pets: Arc<InMemoryPetDirectory>,
    pub clinic_status: Arc<InMemoryClinicStatusStore>,
    pub admin: CallerContext,
    pub owner: CallerContext,
    pub other_owner: CallerContext,
    pub pet: Uuid,
    pub other_pet: Uuid,
}

impl Clinic {
    pub async fn new() -> Self {
        Self::with_repository(Arc::new(InMemoryAppointmentRepository::new())).await
    }

    /// Engine over `store`; `repository` stays the plain in-memory store for inspection.
    pub async fn with_store(store: Arc<dyn AppointmentRepository>, repository: Arc<InMemoryAppointmentRepository>) -> Self {
        let pets = Arc::new(InMemoryPetDirectory::new());
        let clinic_status = Arc::new(InMemoryClinicStatusStore::default());
        let gate: Arc<dyn ClinicCalendarGate> = Arc::new(ClinicStatusGate::new(clinic_status.clone()));
        let clock = Arc::new(FixedClock(now()));
        let hours = ClinicHours::default();

        let (owner_id, other_owner_id) = (Uuid::new_v4(), Uuid::new_v4());
        let (pet, other_pet) = (Uuid::new_v4(), Uuid::new_v4());
        pets.register(pet, owner_id).await;
        pets.register(other_pet, other_owner_id).await;

        Self {
            booking: AppointmentBookingService::new(store.clone(), pets.clone(), gate.clone(), clock.clone(), hours),
            availability: AvailabilityService::new(store, gate, clock, hours),
            repository,
            pets,
            clinic_status,
            admin: CallerContext::admin(Uuid::new_v4()),
            owner: CallerContext::owner(owner_id, [pet]),
            other_owner: CallerContext::owner(other_owner_id, [other_pet]),
            pet,
            other_pet,
        }
    }

    pub async fn with_repository(repository: Arc<InMemoryAppointmentRepository>) -> Self {
        Self::with_store(repository.clone(), repository).await
    }
}

pub fn request(pet_id: Uuid, start: DateTime<Utc>, service_type: ServiceType) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        pet_id,
        start_time: start,
        service_type,
        notes: None,
    }
}
