pub mod bookings;
pub mod error;
pub mod records;
pub mod routes;

pub use error::ApiError;
pub use records::{records_router, RecordsState};
pub use routes::{cors_layer, create_router};
