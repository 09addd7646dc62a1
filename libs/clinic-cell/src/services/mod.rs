pub mod status;
pub mod supabase;

pub use status::{ClinicStatusService, ClinicStatusStore, InMemoryClinicStatusStore};
pub use supabase::SupabaseClinicStatusStore;
