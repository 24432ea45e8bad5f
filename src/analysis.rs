use serde::{Deserialize, Serialize};

/// Regulatory status as returned by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassificationStatus {
    Controlled,
    PrescriptionOnly,
    Otc,
    Unknown,
}

impl ClassificationStatus {
    pub const ALL: [ClassificationStatus; 4] = [
        ClassificationStatus::Controlled,
        ClassificationStatus::PrescriptionOnly,
        ClassificationStatus::Otc,
        ClassificationStatus::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationStatus::Controlled => "CONTROLLED",
            ClassificationStatus::PrescriptionOnly => "PRESCRIPTION_ONLY",
            ClassificationStatus::Otc => "OTC",
            ClassificationStatus::Unknown => "UNKNOWN",
        }
    }
}

/// One classification result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrugAnalysis {
    #[serde(rename = "drugName", alias = "subjectName")]
    pub subject_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    pub status: ClassificationStatus,
    pub classification: String,
    pub reason: String,
    pub legal_implications: String,
    #[serde(default)]
    pub common_uses: Vec<String>,
    pub safety_warnings: Vec<String>,
}

impl DrugAnalysis {
    /// Checks what serde cannot: required strings must carry text.
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("drugName", &self.subject_name),
            ("classification", &self.classification),
            ("reason", &self.reason),
            ("legalImplications", &self.legal_implications),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(format!("required field '{}' is blank", field));
            }
        }

        Ok(())
    }

    /// Scientific name, if the provider gave a non-blank one.
    pub fn scientific_name(&self) -> Option<&str> {
        self.scientific_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Plain-text summary used for the clipboard.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();

        out.push_str(&self.subject_name);
        if let Some(scientific) = self.scientific_name() {
            out.push_str(&format!(" ({})", scientific));
        }
        out.push('\n');
        out.push_str(&format!("Status: {}\n", self.status.as_str()));
        out.push_str(&format!("Classification: {}\n", self.classification));
        out.push_str(&format!("Reason: {}\n", self.reason));
        out.push_str(&format!("Legal implications: {}\n", self.legal_implications));

        if !self.common_uses.is_empty() {
            out.push_str("Common uses:\n");
            for item in &self.common_uses {
                out.push_str(&format!("- {}\n", item));
            }
        }

        if !self.safety_warnings.is_empty() {
            out.push_str("Safety warnings:\n");
            for item in &self.safety_warnings {
                out.push_str(&format!("- {}\n", item));
            }
        }

        out
    }
}

#[cfg(test)]
pub(crate) fn sample(name: &str, status: ClassificationStatus) -> DrugAnalysis {
    DrugAnalysis {
        subject_name: name.to_string(),
        scientific_name: None,
        status,
        classification: "Test Class".to_string(),
        reason: "Test reason".to_string(),
        legal_implications: "Test legal note".to_string(),
        common_uses: vec!["Pain".to_string()],
        safety_warnings: vec!["Do not mix with alcohol".to_string()],
    }
}
