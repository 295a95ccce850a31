//! Consultation data model.
//!
//! Mirrors the wire shapes exchanged with the pharmacist expert engine's
//! callers: patient + symptoms in, recommendation records out. The numeric
//! symptom codes are part of the engine console protocol and must stay
//! stable.

use serde::{Deserialize, Serialize};

/// Patient gender as the engine console understands it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[serde(alias = "мужской")]
    Male,
    #[serde(alias = "женский")]
    Female,
}

impl Gender {
    /// Single-character code the engine's gender prompt expects.
    pub fn console_code(self) -> &'static str {
        match self {
            Gender::Male => "м",
            Gender::Female => "ж",
        }
    }
}

/// The five symptom categories the knowledge base reasons about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SymptomType {
    Pain,
    Fever,
    Inflammation,
    Allergy,
    Digestion,
}

impl SymptomType {
    /// Stable numeric code used on the engine console (1-5).
    pub fn code(self) -> u8 {
        match self {
            SymptomType::Pain => 1,
            SymptomType::Fever => 2,
            SymptomType::Inflammation => 3,
            SymptomType::Allergy => 4,
            SymptomType::Digestion => 5,
        }
    }

    /// Canonical catalog label (the id served to the intake UI).
    pub fn label(self) -> &'static str {
        match self {
            SymptomType::Pain => "боль",
            SymptomType::Fever => "температура",
            SymptomType::Inflammation => "воспаление",
            SymptomType::Allergy => "аллергия",
            SymptomType::Digestion => "пищеварение",
        }
    }

    /// Map a free-text label to a symptom type. Unrecognized labels fall
    /// back to `Pain` (code 1) — a long-standing protocol default, kept
    /// because the knowledge base treats code 1 as the generic complaint.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "боль" | "pain" => SymptomType::Pain,
            "температура" | "fever" => SymptomType::Fever,
            "воспаление" | "inflammation" => SymptomType::Inflammation,
            "аллергия" | "allergy" => SymptomType::Allergy,
            "пищеварение" | "digestion" => SymptomType::Digestion,
            _ => SymptomType::Pain,
        }
    }
}

impl From<String> for SymptomType {
    fn from(label: String) -> Self {
        SymptomType::from_label(&label)
    }
}

impl From<SymptomType> for String {
    fn from(kind: SymptomType) -> Self {
        kind.label().to_string()
    }
}

/// Catalog entry describing one selectable symptom category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomTypeInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub number: u8,
}

/// The full symptom catalog, in console-code order.
pub fn symptom_catalog() -> Vec<SymptomTypeInfo> {
    [
        (SymptomType::Pain, "Боль", "Болевой синдром"),
        (SymptomType::Fever, "Температура", "Повышенная температура"),
        (SymptomType::Inflammation, "Воспаление", "Воспалительный процесс"),
        (SymptomType::Allergy, "Аллергия", "Аллергическая реакция"),
        (SymptomType::Digestion, "Пищеварение", "Проблемы с пищеварением"),
    ]
    .into_iter()
    .map(|(kind, name, description)| SymptomTypeInfo {
        id: kind.label().to_string(),
        name: name.to_string(),
        description: description.to_string(),
        number: kind.code(),
    })
    .collect()
}

/// One observed symptom. Intensity is nominally 1-10; this layer does not
/// enforce the range, that is the caller's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomObservation {
    #[serde(rename = "type")]
    pub kind: SymptomType,
    #[serde(default = "default_intensity")]
    pub intensity: u8,
}

fn default_intensity() -> u8 {
    5
}

/// Patient header for one consultation. Immutable once a session starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientProfile {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    /// Only meaningful when gender is female.
    #[serde(default, alias = "pregnancy")]
    pub pregnant: bool,
}

impl PatientProfile {
    /// Single-character code for the engine's pregnancy prompt.
    pub fn pregnancy_code(&self) -> &'static str {
        if self.pregnant {
            "д"
        } else {
            "н"
        }
    }
}

/// One consultation: patient plus symptoms in the order they were reported.
/// Symptom order is significant — it becomes the literal input order on the
/// engine console.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationRequest {
    pub patient: PatientProfile,
    pub symptoms: Vec<SymptomObservation>,
}

/// Whether the engine permits a drug during pregnancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PregnancyPermission {
    Permitted,
    Forbidden,
    ForbiddenInTrimester,
    #[default]
    RequiresConsultation,
}

/// Priority the engine assigns when the transcript never states one.
pub const DEFAULT_PRIORITY: f64 = 8.0;

/// One recommended drug, as recovered from the engine transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrugRecommendation {
    pub name: String,
    pub form: String,
    pub dosage: String,
    pub price: f64,
    pub priority: f64,
    pub rationale: String,
    /// Whether the engine flagged the patient's pregnancy as relevant.
    pub pregnancy_relevant: bool,
    pub pregnancy_permission: PregnancyPermission,
}

impl DrugRecommendation {
    /// Fresh record for a transcript entry; fields fill in as labeled
    /// lines arrive.
    pub fn new(name: String) -> Self {
        Self {
            name,
            form: String::new(),
            dosage: String::new(),
            price: 0.0,
            priority: DEFAULT_PRIORITY,
            rationale: String::new(),
            pregnancy_relevant: false,
            pregnancy_permission: PregnancyPermission::default(),
        }
    }
}

/// A symptom the knowledge base had no drug for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingRecommendation {
    pub indication: String,
    pub status: String,
    pub reason: String,
}

impl Default for MissingRecommendation {
    fn default() -> Self {
        Self {
            indication: String::new(),
            status: "требуется консультация врача".to_string(),
            reason: "нет подходящих препаратов в базе данных".to_string(),
        }
    }
}

/// Summary counts over one consultation result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConsultationSummary {
    pub total_found: usize,
    pub total_missing: usize,
    pub total_symptoms: usize,
}

/// Structured outcome of one consultation session.
///
/// Invariant once a session parses: `total_symptoms` equals the number of
/// symptoms submitted — every symptom lands in exactly one of the two lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationResult {
    pub recommendations: Vec<DrugRecommendation>,
    pub missing_recommendations: Vec<MissingRecommendation>,
    pub summary: ConsultationSummary,
}

impl ConsultationResult {
    pub fn from_records(
        recommendations: Vec<DrugRecommendation>,
        missing_recommendations: Vec<MissingRecommendation>,
    ) -> Self {
        let summary = ConsultationSummary {
            total_found: recommendations.len(),
            total_missing: missing_recommendations.len(),
            total_symptoms: recommendations.len() + missing_recommendations.len(),
        };
        Self {
            recommendations,
            missing_recommendations,
            summary,
        }
    }
}
