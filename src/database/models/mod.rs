pub mod course;
pub mod material;
pub mod program;
pub mod user;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use course::{Course, CoursePatch, CreateCourseInput, NewCourse, UpdateCourseInput};
pub use material::{
    ContentTopic, ContentTopicDraft, ContentTopicPatch, CreateContentTopicInput,
    CreateMaterialInput, Level, Material, MaterialPatch, NewContentTopic, NewMaterial,
    NewMaterialTree, NewVideoCourse, TopicInput, UpdateContentTopicInput, UpdateMaterialInput,
    VideoCourse, VideoCourseDraft, VideoCourseInput,
};
pub use program::{CreateProgramInput, NewProgram, Program, ProgramPatch, ProgramType, UpdateProgramInput};
pub use user::{NewUser, Role, SigninInput, SignupInput, User, UserSummary, ValidSignup};

/// Server-assigned fields shared by every stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Metadata {
    pub fn new(id: i64, now: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

// Sparse-patch helpers: zero values mean "leave unchanged".

pub(crate) fn text(value: String) -> Option<String> {
    Some(value).filter(|v| !v.is_empty())
}

pub(crate) fn int(value: i32) -> Option<i32> {
    Some(value).filter(|v| *v != 0)
}

pub(crate) fn float(value: f64) -> Option<f64> {
    Some(value).filter(|v| *v != 0.0)
}

pub(crate) fn list<T>(value: Vec<T>) -> Option<Vec<T>> {
    Some(value).filter(|v| !v.is_empty())
}
