//! Domain models for the clinic.

mod consultation;
mod disease;
mod patient;
mod suggestion;
mod symptom;

pub use consultation::*;
pub use disease::*;
pub use patient::*;
pub use suggestion::*;
pub use symptom::*;
