use serde::{Deserialize, Serialize};

use super::Metadata;
use crate::validation::{Rules, Validate, ValidationErrors};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(flatten)]
    pub meta: Metadata,
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub duration: i32,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub duration: i32,
    pub price: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateCourseInput {
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub duration: i32,
    pub price: f64,
}

impl Validate for CreateCourseInput {
    type Output = NewCourse;

    fn validate(self) -> Result<NewCourse, ValidationErrors> {
        let mut rules = Rules::new();
        rules
            .required("title", &self.title)
            .required("description", &self.description)
            .required("instructor", &self.instructor)
            .min_int("duration", self.duration, 1)
            .min_float("price", self.price, 0.0);
        rules.finish()?;

        Ok(NewCourse {
            title: self.title,
            description: self.description,
            instructor: self.instructor,
            duration: self.duration,
            price: self.price,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateCourseInput {
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub duration: i32,
    pub price: f64,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CoursePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructor: Option<String>,
    pub duration: Option<i32>,
    pub price: Option<f64>,
}

impl Validate for UpdateCourseInput {
    type Output = CoursePatch;

    fn validate(self) -> Result<CoursePatch, ValidationErrors> {
        let patch = CoursePatch {
            title: super::text(self.title),
            description: super::text(self.description),
            instructor: super::text(self.instructor),
            duration: super::int(self.duration),
            price: super::float(self.price),
        };

        let mut rules = Rules::new();
        if let Some(duration) = patch.duration {
            rules.min_int("duration", duration, 1);
        }
        if let Some(price) = patch.price {
            rules.min_float("price", price, 0.0);
        }
        rules.finish()?;
        Ok(patch)
    }
}

impl Course {
    pub fn apply(&mut self, patch: CoursePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(instructor) = patch.instructor {
            self.instructor = instructor;
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn course() -> Course {
        Course {
            meta: Metadata::new(1, Utc::now()),
            title: "Go Basics".into(),
            description: "d".into(),
            instructor: "X".into(),
            duration: 10,
            price: 25.0,
        }
    }

    #[test]
    fn create_accepts_free_course() {
        let input = CreateCourseInput {
            title: "Go Basics".into(),
            description: "d".into(),
            instructor: "X".into(),
            duration: 10,
            price: 0.0,
        };
        assert_eq!(input.validate().unwrap().price, 0.0);
    }

    #[test]
    fn create_reports_every_missing_field() {
        let errors = CreateCourseInput::default().validate().unwrap_err();
        let fields: Vec<_> = errors.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, ["title", "description", "instructor", "duration"]);
    }

    #[test]
    fn sparse_patch_leaves_zero_fields_alone() {
        let mut c = course();
        let patch = UpdateCourseInput {
            title: "Rust Basics".into(),
            ..Default::default()
        }
        .validate()
        .unwrap();
        c.apply(patch);
        assert_eq!(c.title, "Rust Basics");
        assert_eq!(c.duration, 10);
        assert_eq!(c.price, 25.0);
        assert_eq!(c.instructor, "X");
    }

    #[test]
    fn patch_rejects_negative_values() {
        let errors = UpdateCourseInput {
            duration: -3,
            price: -1.0,
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.violations().len(), 2);
    }
}
