use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Kind of recurring service performed on a job site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InterventionType {
    /// Mowing (tonte)
    Mow,
    /// Hedge trimming (taille)
    Trim,
    /// Weeding (désherbage)
    Weed,
}

impl InterventionType {
    pub const ALL: [InterventionType; 3] = [
        InterventionType::Mow,
        InterventionType::Trim,
        InterventionType::Weed,
    ];

    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            InterventionType::Mow => "mow",
            InterventionType::Trim => "trim",
            InterventionType::Weed => "weed",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "mow" => Some(InterventionType::Mow),
            "trim" => Some(InterventionType::Trim),
            "weed" => Some(InterventionType::Weed),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InterventionType::Mow => "Mowing",
            InterventionType::Trim => "Trimming",
            InterventionType::Weed => "Weeding",
        }
    }
}
