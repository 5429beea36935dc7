pub mod colors;
pub mod export;
pub mod geometry;
pub mod interaction;
pub mod lanes;
pub mod layout;
pub mod session;

pub use session::ChartSession;
