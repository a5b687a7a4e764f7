use std::str::FromStr;

/// Classifiers this service knows how to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Disease,
    Foods,
    Gym,
}

impl ModelKind {
    /// Key used in URLs and artifact file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Disease => "disease",
            ModelKind::Foods => "foods",
            ModelKind::Gym => "gym",
        }
    }

    /// JSON field carrying the catalog metric, if this kind has one.
    pub fn metric_field(&self) -> Option<&'static str> {
        match self {
            ModelKind::Disease => None,
            ModelKind::Foods => Some("estimated_calories"),
            ModelKind::Gym => Some("estimated_calories_burned"),
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown model type: {0}")]
pub struct UnknownModelKind(pub String);

impl FromStr for ModelKind {
    type Err = UnknownModelKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "disease" => Ok(ModelKind::Disease),
            "foods" | "food" => Ok(ModelKind::Foods),
            "gym" | "gym-equipment" | "gym_equipment" => Ok(ModelKind::Gym),
            _ => Err(UnknownModelKind(s.to_string())),
        }
    }
}
