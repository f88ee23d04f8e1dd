use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{Metadata, UnknownVariant};
use crate::validation::{Rules, Validate, ValidationErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramType {
    Regular,
    Intensive,
}

impl ProgramType {
    pub const ALL: [&'static str; 2] = ["regular", "intensive"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProgramType::Regular => "regular",
            ProgramType::Intensive => "intensive",
        }
    }
}

impl FromStr for ProgramType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(ProgramType::Regular),
            "intensive" => Ok(ProgramType::Intensive),
            other => Err(UnknownVariant {
                kind: "program type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    #[serde(flatten)]
    pub meta: Metadata,
    pub title: String,
    #[serde(rename = "type")]
    pub program_type: ProgramType,
    pub duration: String,
    pub price: f64,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProgram {
    pub title: String,
    pub program_type: ProgramType,
    pub duration: String,
    pub price: f64,
    pub features: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateProgramInput {
    pub title: String,
    #[serde(rename = "type")]
    pub program_type: String,
    pub duration: String,
    pub price: f64,
    pub features: Vec<String>,
}

fn parse_type(value: &str) -> Result<ProgramType, ValidationErrors> {
    value
        .parse()
        .map_err(|e: UnknownVariant| ValidationErrors::single("type", e.to_string()))
}

impl Validate for CreateProgramInput {
    type Output = NewProgram;

    fn validate(self) -> Result<NewProgram, ValidationErrors> {
        let mut rules = Rules::new();
        rules
            .required("title", &self.title)
            .one_of("type", &self.program_type, &ProgramType::ALL)
            .required("duration", &self.duration)
            .min_float("price", self.price, 0.0)
            .non_empty("features", &self.features);
        rules.finish()?;

        Ok(NewProgram {
            program_type: parse_type(&self.program_type)?,
            title: self.title,
            duration: self.duration,
            price: self.price,
            features: self.features,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProgramInput {
    pub title: String,
    #[serde(rename = "type")]
    pub program_type: String,
    pub duration: String,
    pub price: f64,
    pub features: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProgramPatch {
    pub title: Option<String>,
    pub program_type: Option<ProgramType>,
    pub duration: Option<String>,
    pub price: Option<f64>,
    pub features: Option<Vec<String>>,
}

impl Validate for UpdateProgramInput {
    type Output = ProgramPatch;

    fn validate(self) -> Result<ProgramPatch, ValidationErrors> {
        let mut rules = Rules::new();
        if !self.program_type.is_empty() {
            rules.one_of("type", &self.program_type, &ProgramType::ALL);
        }
        if let Some(price) = super::float(self.price) {
            rules.min_float("price", price, 0.0);
        }
        rules.finish()?;

        let program_type = match super::text(self.program_type) {
            Some(value) => Some(parse_type(&value)?),
            None => None,
        };

        Ok(ProgramPatch {
            title: super::text(self.title),
            program_type,
            duration: super::text(self.duration),
            price: super::float(self.price),
            features: super::list(self.features),
        })
    }
}

impl Program {
    pub fn apply(&mut self, patch: ProgramPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(program_type) = patch.program_type {
            self.program_type = program_type;
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(features) = patch.features {
            self.features = features;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_features_and_known_type() {
        let input = CreateProgramInput {
            title: "Bootcamp".into(),
            program_type: "weekend".into(),
            duration: "12 weeks".into(),
            price: 100.0,
            features: vec![],
        };
        let errors = input.validate().unwrap_err();
        let fields: Vec<_> = errors.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, ["type", "features"]);
    }

    #[test]
    fn type_serializes_under_type_key() {
        let input: CreateProgramInput = serde_json::from_value(serde_json::json!({
            "title": "Bootcamp",
            "type": "intensive",
            "duration": "12 weeks",
            "price": 100,
            "features": ["mentoring", "projects"]
        }))
        .unwrap();
        let program = input.validate().unwrap();
        assert_eq!(program.program_type, ProgramType::Intensive);
        assert_eq!(program.features, ["mentoring", "projects"]);
    }

    #[test]
    fn patch_replaces_features_only_when_given() {
        let patch = UpdateProgramInput {
            duration: "6 weeks".into(),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(patch.features, None);
        assert_eq!(patch.duration.as_deref(), Some("6 weeks"));
    }
}
