pub mod analysis;
pub mod impact;
pub mod negotiation;
