// Keyseq Output Layer
// Replacement planning and the uinput virtual keyboard

mod plan;
mod state;

#[cfg(feature = "pure-rust")]
mod uinput;

pub use plan::{PlanError, ReplacementPlan, Step};
pub use state::PressedKeyState;

#[cfg(feature = "pure-rust")]
pub use uinput::{UInputError, VirtualDevice};
