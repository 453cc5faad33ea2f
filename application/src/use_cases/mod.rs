//! Use cases: the phase scheduler and the facade built on top of it.

pub mod consult_facade;
pub mod run_consultation;

pub use consult_facade::Conclave;
pub use run_consultation::RunConsultationUseCase;
