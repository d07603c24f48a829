use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "male", alias = "MALE")]
    Male,
    #[serde(rename = "female", alias = "FEMALE")]
    Female,
    #[serde(rename = "non-binary", alias = "NON_BINARY", alias = "non_binary")]
    NonBinary,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::NonBinary];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::NonBinary => "non-binary",
        }
    }

    /// Parse a gender label, accepting both the wire form ("non-binary")
    /// and the enumeration form ("NON_BINARY") in any case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "non-binary" | "non_binary" | "nonbinary" => Some(Gender::NonBinary),
            _ => None,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
