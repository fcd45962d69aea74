pub mod emissions_handlers;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod summary_handlers;

pub use error::{ApiError, ErrorResponse};
pub use routes::*;
