pub mod error;
pub mod memory;
pub mod policy;
pub mod postgres;
pub mod traits;

pub use error::*;
pub use memory::*;
pub use policy::*;
pub use postgres::*;
pub use traits::*;
