pub mod appointments;
pub mod migrations;
pub mod pool;
pub mod users;

// Keep re-exports unique so downstream crates see a single symbol per helper.
pub use appointments::{
    create_appointment, fetch_appointment, list_appointments, submit_feedback, update_status,
    AppointmentStorageError, RoleFilter,
};
pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool_from_url, create_pool_from_url_checked, DbPoolError, PgPool};
pub use users::{
    fetch_match_pool, fetch_profile, search_teachers, update_profile, TeacherSearchPage,
    UserStorageError,
};
