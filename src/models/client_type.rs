use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Client category; urgency thresholds are configured per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ClientType {
    #[default]
    Residential,
    Professional,
}

impl ClientType {
    pub fn code(&self) -> &'static str {
        match self {
            ClientType::Residential => "R",
            ClientType::Professional => "P",
        }
    }

    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        self.code()
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "R" => Some(ClientType::Residential),
            "P" => Some(ClientType::Professional),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClientType::Residential => "Residential",
            ClientType::Professional => "Professional",
        }
    }
}
