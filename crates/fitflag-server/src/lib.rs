// HTTP surface for the FitFlag estimators.

pub mod routes;

pub use routes::{routes, AppState};
