pub mod durable;
pub mod payload;

pub use durable::{DurableSaver, SaveOutcome};
pub use payload::{Persist, SheetPayload, TextPayload};
