use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Deployment stage a flow runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Dev,
    Staging,
    Production,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Dev => "dev",
            Stage::Staging => "staging",
            Stage::Production => "production",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Stage::Dev),
            "stag" | "staging" => Ok(Stage::Staging),
            "prod" | "production" => Ok(Stage::Production),
            _ => Err(AppError::UnknownStage(s.to_string())),
        }
    }
}
