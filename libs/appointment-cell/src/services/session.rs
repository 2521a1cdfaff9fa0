// libs/appointment-cell/src/services/session.rs
use tracing::debug;

use crate::models::SessionContext;

const SYMPTOM_KEYWORDS: &[&str] = &[
    "breathing", "cough", "chest", "pain", "headache", "fever",
    "dizzy", "nausea", "stomach", "back", "joint", "fatigue",
    "shortness of breath", "difficulty breathing", "wheezing",
    "heart", "palpitations", "anxiety", "depression", "skin",
    "rash", "allergy", "sore throat", "congestion", "ache",
    "hurt", "discomfort", "problem", "issue", "trouble",
];

/// Input shorter than this is treated as small talk rather than symptoms.
const MIN_SYMPTOM_INPUT_CHARS: usize = 6;

/// Summary used when the requester has not described any symptoms yet.
pub fn default_symptoms(specialty: &str) -> String {
    let summary = match specialty.trim().to_lowercase().as_str() {
        "pulmonology" => "Respiratory concerns (e.g., shortness of breath, cough, wheezing)",
        "cardiology" => "Heart-related symptoms (e.g., chest pain, palpitations, fatigue)",
        "dermatology" => "Skin condition (e.g., rashes, acne, infections, pigmentation)",
        "neurology" => "Neurological symptoms (e.g., headaches, seizures, dizziness, memory issues)",
        "orthopedics" => "Musculoskeletal issues (e.g., joint pain, fractures, back pain)",
        "gastroenterology" => "Digestive system concerns (e.g., abdominal pain, bloating, acid reflux)",
        "ent" => "Ear, nose, or throat issues (e.g., sinus problems, hearing loss, sore throat)",
        "ophthalmology" => "Eye-related concerns (e.g., blurred vision, redness, eye pain)",
        "psychiatry" => "Mental health consultation (e.g., anxiety, depression, sleep issues)",
        "gynecology" => "Women's health consultation (e.g., menstrual problems, PCOS, fertility)",
        "urology" => "Urinary or kidney concerns (e.g., frequent urination, UTI, kidney stones)",
        "endocrinology" => "Hormonal or metabolic issues (e.g., thyroid disorders, diabetes)",
        "rheumatology" => "Autoimmune and inflammatory conditions (e.g., arthritis, lupus)",
        "pediatrics" => "Child health issues (e.g., fever, infections, development concerns)",
        "oncology" => "Cancer-related concerns (e.g., abnormal growths, diagnosis follow-up)",
        "hematology" => "Blood-related issues (e.g., anemia, clotting disorders)",
        "nephrology" => "Kidney-related concerns (e.g., chronic kidney disease, proteinuria)",
        "hepatology" => "Liver-related conditions (e.g., hepatitis, liver function issues)",
        "infectious disease" => "Infection-related concerns (e.g., fever, viral illness, long COVID)",
        "general medicine" => "General consultation or non-specific symptoms (e.g., fatigue, weakness)",
        "allergy and immunology" => "Allergic reactions and immune system concerns (e.g., hay fever, hives)",
        "pain management" => "Chronic or acute pain (e.g., migraines, neuropathy)",
        "plastic surgery" => "Cosmetic or reconstructive surgery consultation",
        "dentistry" => "Tooth or oral health issues (e.g., pain, decay, gum issues)",
        "sexology" => "Sexual health concerns (e.g., performance issues, STIs)",
        "nutrition & dietetics" => "Dietary guidance and nutritional issues (e.g., weight management, deficiency)",
        _ => return format!("{} consultation", specialty.trim()),
    };
    summary.to_string()
}

pub fn mentions_symptoms(input_text: &str) -> bool {
    let input = input_text.trim();
    if input.chars().count() < MIN_SYMPTOM_INPUT_CHARS {
        return false;
    }

    let lower = input.to_lowercase();
    SYMPTOM_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

impl SessionContext {
    /// Records the specialty being searched and makes sure a symptom summary
    /// exists. Symptoms described in `input_text` replace the summary.
    pub fn note_search(&mut self, specialty: &str, input_text: Option<&str>) {
        self.current_specialty = Some(specialty.trim().to_string());

        if self.symptoms_summary.is_none() {
            let summary = default_symptoms(specialty);
            debug!("Seeding symptoms summary: {}", summary);
            self.symptoms_summary = Some(summary);
        }

        if let Some(text) = input_text.filter(|text| mentions_symptoms(text)) {
            debug!("Captured symptoms from input: {}", text);
            self.symptoms_summary = Some(format!("Patient reported: {}", text.trim()));
        }
    }
}
