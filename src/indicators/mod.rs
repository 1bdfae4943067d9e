pub mod dkby;

pub use dkby::{compute_dkby, latest_reading, DkbyPoint, DkbyReading};
