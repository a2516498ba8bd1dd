pub mod model;

pub use model::{ConnectionSession, ConnectionState};
