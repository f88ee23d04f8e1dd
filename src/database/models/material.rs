use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{Metadata, UnknownVariant};
use crate::validation::{Rules, Validate, ValidationErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub const ALL: [&'static str; 3] = ["beginner", "intermediate", "advanced"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }
}

impl FromStr for Level {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Level::Beginner),
            "intermediate" => Ok(Level::Intermediate),
            "advanced" => Ok(Level::Advanced),
            other => Err(UnknownVariant {
                kind: "level",
                value: other.to_string(),
            }),
        }
    }
}

/// A material with its children loaded. Topics are sorted by `order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    #[serde(flatten)]
    pub meta: Metadata,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub duration: i32,
    pub lessons: i32,
    #[serde(rename = "learningPoints")]
    pub learning_points: Vec<String>,
    pub content: Vec<ContentTopic>,
    #[serde(rename = "videoCourses")]
    pub video_courses: Vec<VideoCourse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentTopic {
    #[serde(flatten)]
    pub meta: Metadata,
    pub title: String,
    pub content: String,
    pub topics: Vec<String>,
    pub order: i32,
    pub material_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoCourse {
    #[serde(flatten)]
    pub meta: Metadata,
    pub title: String,
    pub description: String,
    pub youtube_id: String,
    pub duration: String,
    pub instructor: String,
    pub level: Level,
    pub material_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMaterial {
    pub title: String,
    pub description: String,
    pub icon: String,
    pub duration: i32,
    pub lessons: i32,
    pub learning_points: Vec<String>,
}

/// A checked topic that has not been bound to a material yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentTopicDraft {
    pub title: String,
    pub content: String,
    pub topics: Vec<String>,
    pub order: i32,
}

impl ContentTopicDraft {
    pub fn attach(&self, material_id: i64) -> NewContentTopic {
        NewContentTopic {
            material_id,
            title: self.title.clone(),
            content: self.content.clone(),
            topics: self.topics.clone(),
            order: self.order,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoCourseDraft {
    pub title: String,
    pub description: String,
    pub youtube_id: String,
    pub duration: String,
    pub instructor: String,
    pub level: Level,
}

impl VideoCourseDraft {
    pub fn attach(&self, material_id: i64) -> NewVideoCourse {
        NewVideoCourse {
            material_id,
            title: self.title.clone(),
            description: self.description.clone(),
            youtube_id: self.youtube_id.clone(),
            duration: self.duration.clone(),
            instructor: self.instructor.clone(),
            level: self.level,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewContentTopic {
    pub material_id: i64,
    pub title: String,
    pub content: String,
    pub topics: Vec<String>,
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewVideoCourse {
    pub material_id: i64,
    pub title: String,
    pub description: String,
    pub youtube_id: String,
    pub duration: String,
    pub instructor: String,
    pub level: Level,
}

/// Everything a material create writes, parent first.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMaterialTree {
    pub material: NewMaterial,
    pub content: Vec<ContentTopicDraft>,
    pub video_courses: Vec<VideoCourseDraft>,
}

// Wire inputs

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct TopicInput {
    pub title: String,
    pub content: String,
    pub topics: Vec<String>,
    pub order: i32,
}

impl Validate for TopicInput {
    type Output = ContentTopicDraft;

    fn validate(self) -> Result<ContentTopicDraft, ValidationErrors> {
        let mut rules = Rules::new();
        rules
            .required("title", &self.title)
            .non_empty("topics", &self.topics);
        rules.finish()?;

        Ok(ContentTopicDraft {
            title: self.title,
            content: self.content,
            topics: self.topics,
            order: self.order,
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct VideoCourseInput {
    pub title: String,
    pub description: String,
    pub youtube_id: String,
    pub duration: String,
    pub instructor: String,
    pub level: String,
}

impl Validate for VideoCourseInput {
    type Output = VideoCourseDraft;

    fn validate(self) -> Result<VideoCourseDraft, ValidationErrors> {
        let mut rules = Rules::new();
        rules
            .required("title", &self.title)
            .required("description", &self.description)
            .required("youtube_id", &self.youtube_id)
            .required("duration", &self.duration)
            .required("instructor", &self.instructor)
            .one_of("level", &self.level, &Level::ALL);
        rules.finish()?;

        let level = self
            .level
            .parse()
            .map_err(|e: UnknownVariant| ValidationErrors::single("level", e.to_string()))?;

        Ok(VideoCourseDraft {
            title: self.title,
            description: self.description,
            youtube_id: self.youtube_id,
            duration: self.duration,
            instructor: self.instructor,
            level,
        })
    }
}

/// Validates every child, folding failures in under `prefix[i]`.
fn children<I: Validate>(rules: &mut Rules, prefix: &str, items: Vec<I>) -> Vec<I::Output> {
    let mut checked = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match item.validate() {
            Ok(valid) => checked.push(valid),
            Err(errors) => {
                rules.nested(&format!("{}[{}]", prefix, i), errors);
            }
        }
    }
    checked
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateMaterialInput {
    pub title: String,
    pub description: String,
    pub icon: String,
    pub duration: i32,
    pub lessons: i32,
    #[serde(rename = "learningPoints")]
    pub learning_points: Vec<String>,
    pub content: Vec<TopicInput>,
    #[serde(rename = "videoCourses")]
    pub video_courses: Vec<VideoCourseInput>,
}

impl Validate for CreateMaterialInput {
    type Output = NewMaterialTree;

    fn validate(self) -> Result<NewMaterialTree, ValidationErrors> {
        let mut rules = Rules::new();
        rules
            .required("title", &self.title)
            .required("description", &self.description)
            .required("icon", &self.icon)
            .min_int("duration", self.duration, 1)
            .min_int("lessons", self.lessons, 1)
            .non_empty("learningPoints", &self.learning_points)
            .non_empty("content", &self.content)
            .non_empty("videoCourses", &self.video_courses);

        let content = children(&mut rules, "content", self.content);
        let video_courses = children(&mut rules, "videoCourses", self.video_courses);
        rules.finish()?;

        Ok(NewMaterialTree {
            material: NewMaterial {
                title: self.title,
                description: self.description,
                icon: self.icon,
                duration: self.duration,
                lessons: self.lessons,
                learning_points: self.learning_points,
            },
            content,
            video_courses,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateMaterialInput {
    pub title: String,
    pub description: String,
    pub icon: String,
    pub duration: i32,
    pub lessons: i32,
    #[serde(rename = "learningPoints")]
    pub learning_points: Vec<String>,
    pub content: Vec<TopicInput>,
    #[serde(rename = "videoCourses")]
    pub video_courses: Vec<VideoCourseInput>,
}

/// Sparse material update. A present child list replaces the whole set.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MaterialPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub duration: Option<i32>,
    pub lessons: Option<i32>,
    pub learning_points: Option<Vec<String>>,
    pub content: Option<Vec<ContentTopicDraft>>,
    pub video_courses: Option<Vec<VideoCourseDraft>>,
}

impl Validate for UpdateMaterialInput {
    type Output = MaterialPatch;

    fn validate(self) -> Result<MaterialPatch, ValidationErrors> {
        let mut rules = Rules::new();
        if let Some(duration) = super::int(self.duration) {
            rules.min_int("duration", duration, 1);
        }
        if let Some(lessons) = super::int(self.lessons) {
            rules.min_int("lessons", lessons, 1);
        }
        let content = children(&mut rules, "content", self.content);
        let video_courses = children(&mut rules, "videoCourses", self.video_courses);
        rules.finish()?;

        Ok(MaterialPatch {
            title: super::text(self.title),
            description: super::text(self.description),
            icon: super::text(self.icon),
            duration: super::int(self.duration),
            lessons: super::int(self.lessons),
            learning_points: super::list(self.learning_points),
            content: super::list(content),
            video_courses: super::list(video_courses),
        })
    }
}

impl Material {
    /// Overwrites the scalar fields present in `patch`. Child lists are
    /// replaced by the store, not here.
    pub fn apply(&mut self, patch: &MaterialPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(icon) = &patch.icon {
            self.icon = icon.clone();
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(lessons) = patch.lessons {
            self.lessons = lessons;
        }
        if let Some(points) = &patch.learning_points {
            self.learning_points = points.clone();
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateContentTopicInput {
    pub title: String,
    pub content: String,
    pub topics: Vec<String>,
    pub order: i32,
    pub material_id: i64,
}

impl Validate for CreateContentTopicInput {
    type Output = NewContentTopic;

    fn validate(self) -> Result<NewContentTopic, ValidationErrors> {
        let mut rules = Rules::new();
        rules
            .required("title", &self.title)
            .non_empty("topics", &self.topics);
        if self.material_id < 1 {
            rules.violate("material_id", "is required");
        }
        rules.finish()?;

        Ok(NewContentTopic {
            material_id: self.material_id,
            title: self.title,
            content: self.content,
            topics: self.topics,
            order: self.order,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateContentTopicInput {
    pub title: String,
    pub content: String,
    pub topics: Vec<String>,
    pub order: i32,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ContentTopicPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub topics: Option<Vec<String>>,
    pub order: Option<i32>,
}

impl Validate for UpdateContentTopicInput {
    type Output = ContentTopicPatch;

    fn validate(self) -> Result<ContentTopicPatch, ValidationErrors> {
        Ok(ContentTopicPatch {
            title: super::text(self.title),
            content: super::text(self.content),
            topics: super::list(self.topics),
            order: super::int(self.order),
        })
    }
}

impl ContentTopic {
    pub fn apply(&mut self, patch: ContentTopicPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(topics) = patch.topics {
            self.topics = topics;
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
    }
}
