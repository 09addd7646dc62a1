pub mod access;
pub mod availability;
pub mod booking;
pub mod calendar;
pub mod clock;
pub mod conflict;
pub mod consistency;
pub mod duration;
pub mod lifecycle;
pub mod pets;
pub mod repository;
pub mod supabase;

pub use availability::AvailabilityService;
pub use booking::AppointmentBookingService;
pub use calendar::{ClinicCalendarGate, ClinicHours, ClinicStatusGate};
pub use clock::{Clock, FixedClock, SystemClock};
pub use conflict::{find_conflicts, has_conflict, intervals_overlap};
pub use consistency::SchedulingConsistencyService;
pub use duration::{compute_end_time, duration};
pub use lifecycle::AppointmentLifecycleService;
pub use pets::{InMemoryPetDirectory, PetDirectory};
pub use repository::{AppointmentRepository, InMemoryAppointmentRepository};
pub use supabase::{SupabaseAppointmentRepository, SupabasePetDirectory};
