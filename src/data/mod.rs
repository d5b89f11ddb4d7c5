pub mod loader;
pub mod types;

pub use loader::{load_body_measurements, load_garments};
pub use types::{BodyProfile, GarmentProfile, WEIGHT_FIELD};
