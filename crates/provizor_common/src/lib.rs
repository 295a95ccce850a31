//! Shared types for the provizor consultation subsystem.
//!
//! Everything the engine driver and its callers exchange lives here: the
//! consultation request/result model, the symptom catalog, and the error
//! taxonomy. The orchestration itself lives in `provizord`.

pub mod error;
pub mod types;

pub use error::EngineError;
pub use types::{
    symptom_catalog, ConsultationRequest, ConsultationResult, ConsultationSummary,
    DrugRecommendation, Gender, MissingRecommendation, PatientProfile, PregnancyPermission,
    SymptomObservation, SymptomType, SymptomTypeInfo,
};
