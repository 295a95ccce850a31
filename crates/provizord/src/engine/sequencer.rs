//! Command sequencer - turns a consultation request into console keystrokes.
//!
//! The engine reads exactly one line per logical prompt and never signals
//! readiness between prompts, so the whole exchange is emitted up front as
//! an ordered line list; the session driver paces the writes.

use crate::engine::markers;
use provizor_common::ConsultationRequest;

/// Literal lines typed at the engine console for one consultation, in order:
/// reset, patient header (name, age, gender code, pregnancy code), one
/// (type code, intensity) pair per symptom in request order, the terminator
/// and two blank confirmation lines.
pub fn command_lines(request: &ConsultationRequest) -> Vec<String> {
    let mut lines = Vec::with_capacity(8 + request.symptoms.len() * 2);
    lines.push(markers::RESET_COMMAND.to_string());
    lines.push(request.patient.name.clone());
    lines.push(request.patient.age.to_string());
    lines.push(request.patient.gender.console_code().to_string());
    lines.push(request.patient.pregnancy_code().to_string());
    for symptom in &request.symptoms {
        lines.push(symptom.kind.code().to_string());
        lines.push(symptom.intensity.to_string());
    }
    lines.push(markers::SYMPTOM_TERMINATOR.to_string());
    // The final menu needs at least one extra Enter; a second one costs
    // nothing and covers the engine builds that ask twice.
    lines.push(String::new());
    lines.push(String::new());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use provizor_common::{Gender, PatientProfile, SymptomObservation, SymptomType};

    fn request(symptoms: Vec<SymptomObservation>) -> ConsultationRequest {
        ConsultationRequest {
            patient: PatientProfile {
                name: "Иванов".to_string(),
                age: 45,
                gender: Gender::Male,
                pregnant: false,
            },
            symptoms,
        }
    }

    #[test]
    fn sequence_preserves_symptom_order_after_patient_header() {
        let lines = command_lines(&request(vec![
            SymptomObservation { kind: SymptomType::Pain, intensity: 7 },
            SymptomObservation { kind: SymptomType::Fever, intensity: 6 },
        ]));
        assert_eq!(
            lines,
            vec![
                "(новый-пациент)",
                "Иванов",
                "45",
                "м",
                "н",
                "1",
                "7",
                "2",
                "6",
                "0",
                "",
                "",
            ]
        );
    }

    #[test]
    fn pregnant_female_encodes_single_character_codes() {
        let mut req = request(vec![]);
        req.patient.gender = Gender::Female;
        req.patient.pregnant = true;
        let lines = command_lines(&req);
        assert_eq!(lines[3], "ж");
        assert_eq!(lines[4], "д");
    }

    #[test]
    fn empty_symptom_list_still_terminates() {
        let lines = command_lines(&request(vec![]));
        assert_eq!(&lines[5..], &["0", "", ""]);
    }
}
