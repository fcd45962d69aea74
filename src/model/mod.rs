pub mod common;
pub mod company;
pub mod emissions;
pub mod filter;
pub mod offset;
pub mod regulation;
pub mod summary;

pub use common::*;
pub use company::*;
pub use emissions::*;
pub use filter::*;
pub use offset::*;
pub use regulation::*;
pub use summary::*;
