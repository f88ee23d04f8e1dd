use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashSet;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::database::manager::DatabaseError;
use crate::database::models::{
    ContentTopic, Course, Material, Metadata, NewContentTopic, NewCourse, NewMaterial, NewProgram,
    NewUser, NewVideoCourse, Program, User, VideoCourse,
};
use crate::database::store::{CatalogStore, StoreTx};

/// Transactional steps that can be made to fail on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    InsertMaterial,
    UpdateMaterial,
    InsertContentTopic,
    InsertVideoCourse,
    DeleteVideoCourses,
    Commit,
}

impl Fault {
    fn name(&self) -> &'static str {
        match self {
            Fault::InsertMaterial => "insert material",
            Fault::UpdateMaterial => "update material",
            Fault::InsertContentTopic => "insert content topic",
            Fault::InsertVideoCourse => "insert video course",
            Fault::DeleteVideoCourses => "delete video courses",
            Fault::Commit => "commit",
        }
    }
}

/// Physical row counts, soft-deleted rows included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCounts {
    pub materials: usize,
    pub content_topics: usize,
    pub video_courses: usize,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    courses: BTreeMap<i64, Course>,
    programs: BTreeMap<i64, Program>,
    materials: BTreeMap<i64, Material>,
    content_topics: BTreeMap<i64, ContentTopic>,
    video_courses: BTreeMap<i64, VideoCourse>,
}

fn active<T: Clone>(rows: &BTreeMap<i64, T>, meta: fn(&T) -> &Metadata) -> Vec<T> {
    rows.values().filter(|r| meta(r).is_active()).cloned().collect()
}

fn find<T: Clone>(rows: &BTreeMap<i64, T>, id: i64, meta: fn(&T) -> &Metadata) -> Option<T> {
    rows.get(&id).filter(|r| meta(r).is_active()).cloned()
}

fn missing(table: &str, id: i64) -> DatabaseError {
    DatabaseError::NotFound(format!("{} {}", table, id))
}

impl Tables {
    fn allocate(&mut self) -> Metadata {
        self.next_id += 1;
        Metadata::new(self.next_id, Utc::now())
    }

    fn material_exists(&self, id: i64) -> bool {
        find(&self.materials, id, |m| &m.meta).is_some()
    }

    fn load_material(&self, material: &Material) -> Material {
        let mut loaded = material.clone();
        loaded.content = self.topics_of(material.meta.id);
        loaded.video_courses = self
            .video_courses
            .values()
            .filter(|v| v.material_id == material.meta.id && v.meta.is_active())
            .cloned()
            .collect();
        loaded
    }

    fn topics_of(&self, material_id: i64) -> Vec<ContentTopic> {
        let mut topics: Vec<ContentTopic> = self
            .content_topics
            .values()
            .filter(|t| t.material_id == material_id && t.meta.is_active())
            .cloned()
            .collect();
        topics.sort_by_key(|t| (t.order, t.meta.id));
        topics
    }

    fn insert_topic(&mut self, topic: &NewContentTopic) -> ContentTopic {
        let row = ContentTopic {
            meta: self.allocate(),
            title: topic.title.clone(),
            content: topic.content.clone(),
            topics: topic.topics.clone(),
            order: topic.order,
            material_id: topic.material_id,
        };
        self.content_topics.insert(row.meta.id, row.clone());
        row
    }
}

/// Overwrites the stored row of an active record, bumping `updated_at`.
fn save<T: Clone>(
    rows: &mut BTreeMap<i64, T>,
    table: &str,
    record: &T,
    meta: fn(&mut T) -> &mut Metadata,
) -> Result<T, DatabaseError> {
    let mut updated = record.clone();
    let id = meta(&mut updated).id;
    let stored = rows.get_mut(&id).ok_or_else(|| missing(table, id))?;
    let stored_meta = meta(stored);
    if !stored_meta.is_active() {
        return Err(missing(table, id));
    }
    let created_at = stored_meta.created_at;

    let m = meta(&mut updated);
    m.created_at = created_at;
    m.updated_at = Utc::now();
    m.deleted_at = None;
    *stored = updated.clone();
    Ok(updated)
}

fn soft_delete<T>(
    rows: &mut BTreeMap<i64, T>,
    table: &str,
    id: i64,
    meta: fn(&mut T) -> &mut Metadata,
) -> Result<(), DatabaseError> {
    let row = rows.get_mut(&id).ok_or_else(|| missing(table, id))?;
    let m = meta(row);
    if !m.is_active() {
        return Err(missing(table, id));
    }
    m.deleted_at = Some(Utc::now());
    Ok(())
}

/// In-process store for tests and local runs. Transactions copy the
/// tables, hold the lock until they finish and publish only on commit.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    faults: Arc<DashSet<Fault>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, fault: Fault) {
        self.faults.insert(fault);
    }

    pub fn clear_faults(&self) {
        self.faults.clear();
    }

    pub async fn row_counts(&self) -> RowCounts {
        let tables = self.tables.lock().await;
        RowCounts {
            materials: tables.materials.len(),
            content_topics: tables.content_topics.len(),
            video_courses: tables.video_courses.len(),
        }
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email == email && u.meta.is_active())
            .cloned())
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.lock().await;
        if tables
            .users
            .values()
            .any(|u| u.email == user.email && u.meta.is_active())
        {
            return Err(DatabaseError::Conflict(format!(
                "email {} already registered",
                user.email
            )));
        }
        let row = User {
            meta: tables.allocate(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
        };
        tables.users.insert(row.meta.id, row.clone());
        Ok(row)
    }

    async fn list_courses(&self) -> Result<Vec<Course>, DatabaseError> {
        Ok(active(&self.tables.lock().await.courses, |c| &c.meta))
    }

    async fn find_course(&self, id: i64) -> Result<Option<Course>, DatabaseError> {
        Ok(find(&self.tables.lock().await.courses, id, |c| &c.meta))
    }

    async fn create_course(&self, course: &NewCourse) -> Result<Course, DatabaseError> {
        let mut tables = self.tables.lock().await;
        let row = Course {
            meta: tables.allocate(),
            title: course.title.clone(),
            description: course.description.clone(),
            instructor: course.instructor.clone(),
            duration: course.duration,
            price: course.price,
        };
        tables.courses.insert(row.meta.id, row.clone());
        Ok(row)
    }

    async fn save_course(&self, course: &Course) -> Result<Course, DatabaseError> {
        let mut tables = self.tables.lock().await;
        save(&mut tables.courses, "courses", course, |c| &mut c.meta)
    }

    async fn delete_course(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.lock().await;
        soft_delete(&mut tables.courses, "courses", id, |c| &mut c.meta)
    }

    async fn list_programs(&self) -> Result<Vec<Program>, DatabaseError> {
        Ok(active(&self.tables.lock().await.programs, |p| &p.meta))
    }

    async fn find_program(&self, id: i64) -> Result<Option<Program>, DatabaseError> {
        Ok(find(&self.tables.lock().await.programs, id, |p| &p.meta))
    }

    async fn create_program(&self, program: &NewProgram) -> Result<Program, DatabaseError> {
        let mut tables = self.tables.lock().await;
        let row = Program {
            meta: tables.allocate(),
            title: program.title.clone(),
            program_type: program.program_type,
            duration: program.duration.clone(),
            price: program.price,
            features: program.features.clone(),
        };
        tables.programs.insert(row.meta.id, row.clone());
        Ok(row)
    }

    async fn save_program(&self, program: &Program) -> Result<Program, DatabaseError> {
        let mut tables = self.tables.lock().await;
        save(&mut tables.programs, "programs", program, |p| &mut p.meta)
    }

    async fn delete_program(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.lock().await;
        soft_delete(&mut tables.programs, "programs", id, |p| &mut p.meta)
    }

    async fn list_materials(&self) -> Result<Vec<Material>, DatabaseError> {
        let tables = self.tables.lock().await;
        Ok(active(&tables.materials, |m| &m.meta)
            .iter()
            .map(|m| tables.load_material(m))
            .collect())
    }

    async fn find_material(&self, id: i64) -> Result<Option<Material>, DatabaseError> {
        let tables = self.tables.lock().await;
        Ok(find(&tables.materials, id, |m| &m.meta).map(|m| tables.load_material(&m)))
    }

    async fn list_content_topics(&self, material_id: i64) -> Result<Vec<ContentTopic>, DatabaseError> {
        Ok(self.tables.lock().await.topics_of(material_id))
    }

    async fn find_content_topic(&self, id: i64) -> Result<Option<ContentTopic>, DatabaseError> {
        Ok(find(&self.tables.lock().await.content_topics, id, |t| &t.meta))
    }

    async fn create_content_topic(&self, topic: &NewContentTopic) -> Result<ContentTopic, DatabaseError> {
        let mut tables = self.tables.lock().await;
        if !tables.material_exists(topic.material_id) {
            return Err(missing("materials", topic.material_id));
        }
        Ok(tables.insert_topic(topic))
    }

    async fn save_content_topic(&self, topic: &ContentTopic) -> Result<ContentTopic, DatabaseError> {
        let mut tables = self.tables.lock().await;
        save(&mut tables.content_topics, "content_topics", topic, |t| &mut t.meta)
    }

    async fn delete_content_topic(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.lock().await;
        soft_delete(&mut tables.content_topics, "content_topics", id, |t| &mut t.meta)
    }

    async fn begin(&self) -> Result<Box<dyn StoreTx>, DatabaseError> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTx {
            guard,
            staged,
            faults: Arc::clone(&self.faults),
        }))
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    staged: Tables,
    faults: Arc<DashSet<Fault>>,
}

impl MemoryTx {
    fn check(&self, fault: Fault) -> Result<(), DatabaseError> {
        if self.faults.contains(&fault) {
            return Err(DatabaseError::Fault(fault.name()));
        }
        Ok(())
    }

    fn delete_children<T>(
        rows: &mut BTreeMap<i64, T>,
        material_id: i64,
        parent: fn(&T) -> i64,
        meta: fn(&mut T) -> &mut Metadata,
    ) -> u64 {
        let now = Utc::now();
        let mut affected = 0;
        for row in rows.values_mut() {
            if parent(row) != material_id {
                continue;
            }
            let m = meta(row);
            if m.is_active() {
                m.deleted_at = Some(now);
                affected += 1;
            }
        }
        affected
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn insert_material(&mut self, material: &NewMaterial) -> Result<i64, DatabaseError> {
        self.check(Fault::InsertMaterial)?;
        let row = Material {
            meta: self.staged.allocate(),
            title: material.title.clone(),
            description: material.description.clone(),
            icon: material.icon.clone(),
            duration: material.duration,
            lessons: material.lessons,
            learning_points: material.learning_points.clone(),
            content: Vec::new(),
            video_courses: Vec::new(),
        };
        let id = row.meta.id;
        self.staged.materials.insert(id, row);
        Ok(id)
    }

    async fn update_material(&mut self, material: &Material) -> Result<(), DatabaseError> {
        self.check(Fault::UpdateMaterial)?;
        let mut row = material.clone();
        row.content.clear();
        row.video_courses.clear();
        save(&mut self.staged.materials, "materials", &row, |m| &mut m.meta)?;
        Ok(())
    }

    async fn delete_material(&mut self, id: i64) -> Result<(), DatabaseError> {
        soft_delete(&mut self.staged.materials, "materials", id, |m| &mut m.meta)
    }

    async fn insert_content_topic(&mut self, topic: &NewContentTopic) -> Result<i64, DatabaseError> {
        self.check(Fault::InsertContentTopic)?;
        if !self.staged.materials.contains_key(&topic.material_id) {
            return Err(missing("materials", topic.material_id));
        }
        Ok(self.staged.insert_topic(topic).meta.id)
    }

    async fn delete_content_topics(&mut self, material_id: i64) -> Result<u64, DatabaseError> {
        Ok(Self::delete_children(
            &mut self.staged.content_topics,
            material_id,
            |t| t.material_id,
            |t| &mut t.meta,
        ))
    }

    async fn insert_video_course(&mut self, video: &NewVideoCourse) -> Result<i64, DatabaseError> {
        self.check(Fault::InsertVideoCourse)?;
        if !self.staged.materials.contains_key(&video.material_id) {
            return Err(missing("materials", video.material_id));
        }
        let row = VideoCourse {
            meta: self.staged.allocate(),
            title: video.title.clone(),
            description: video.description.clone(),
            youtube_id: video.youtube_id.clone(),
            duration: video.duration.clone(),
            instructor: video.instructor.clone(),
            level: video.level,
            material_id: video.material_id,
        };
        let id = row.meta.id;
        self.staged.video_courses.insert(id, row);
        Ok(id)
    }

    async fn delete_video_courses(&mut self, material_id: i64) -> Result<u64, DatabaseError> {
        self.check(Fault::DeleteVideoCourses)?;
        Ok(Self::delete_children(
            &mut self.staged.video_courses,
            material_id,
            |v| v.material_id,
            |v| &mut v.meta,
        ))
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        self.check(Fault::Commit)?;
        let MemoryTx {
            mut guard, staged, ..
        } = *self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{ContentTopicDraft, Level, MaterialPatch, NewMaterialTree, VideoCourseDraft};
    use crate::database::store::{create_material_tree, delete_material_tree, update_material_tree};

    fn tree() -> NewMaterialTree {
        let topic = |title: &str, order| ContentTopicDraft {
            title: title.into(),
            content: String::new(),
            topics: vec!["t".into()],
            order,
        };
        NewMaterialTree {
            material: NewMaterial {
                title: "Rust".into(),
                description: "d".into(),
                icon: "crab".into(),
                duration: 4,
                lessons: 2,
                learning_points: vec!["ownership".into()],
            },
            content: vec![topic("second", 2), topic("first", 1)],
            video_courses: vec![VideoCourseDraft {
                title: "v".into(),
                description: "d".into(),
                youtube_id: "yt".into(),
                duration: "5m".into(),
                instructor: "i".into(),
                level: Level::Advanced,
            }],
        }
    }

    #[tokio::test]
    async fn tree_create_orders_topics() {
        let store = MemoryStore::new();
        let material = create_material_tree(&store, &tree()).await.unwrap();
        let titles: Vec<_> = material.content.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["first", "second"]);
        assert_eq!(material.video_courses.len(), 1);
    }

    #[tokio::test]
    async fn failed_step_leaves_no_rows() {
        let store = MemoryStore::new();
        store.fail_on(Fault::InsertVideoCourse);
        let err = create_material_tree(&store, &tree()).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Fault("insert video course")));
        assert_eq!(store.row_counts().await, RowCounts::default());
    }

    #[tokio::test]
    async fn failed_commit_publishes_nothing() {
        let store = MemoryStore::new();
        store.fail_on(Fault::Commit);
        assert!(create_material_tree(&store, &tree()).await.is_err());
        store.clear_faults();
        assert!(store.list_materials().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_update_keeps_old_children() {
        let store = MemoryStore::new();
        let mut material = create_material_tree(&store, &tree()).await.unwrap();
        let patch = MaterialPatch {
            title: Some("Rust 2".into()),
            video_courses: Some(vec![]),
            ..Default::default()
        };
        material.apply(&patch);
        store.fail_on(Fault::DeleteVideoCourses);
        assert!(update_material_tree(&store, &material, &patch).await.is_err());

        let stored = store.find_material(material.meta.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Rust");
        assert_eq!(stored.video_courses.len(), 1);
    }

    #[tokio::test]
    async fn delete_cascades_to_children() {
        let store = MemoryStore::new();
        let material = create_material_tree(&store, &tree()).await.unwrap();
        let topic_id = material.content[0].meta.id;

        delete_material_tree(&store, material.meta.id).await.unwrap();
        assert!(store.find_material(material.meta.id).await.unwrap().is_none());
        assert!(store.find_content_topic(topic_id).await.unwrap().is_none());
        assert!(store.list_content_topics(material.meta.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn topic_requires_live_material() {
        let store = MemoryStore::new();
        let topic = NewContentTopic {
            material_id: 99,
            title: "t".into(),
            content: String::new(),
            topics: vec![],
            order: 0,
        };
        assert!(store.create_content_topic(&topic).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryStore::new();
        let user = NewUser {
            email: "a@b.com".into(),
            password_hash: "h".into(),
            full_name: "A".into(),
            role: crate::database::models::Role::Student,
        };
        store.create_user(&user).await.unwrap();
        assert!(matches!(
            store.create_user(&user).await,
            Err(DatabaseError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn save_keeps_created_at() {
        let store = MemoryStore::new();
        let created = store
            .create_course(&NewCourse {
                title: "c".into(),
                description: "d".into(),
                instructor: "i".into(),
                duration: 1,
                price: 0.0,
            })
            .await
            .unwrap();
        let mut edited = created.clone();
        edited.title = "c2".into();
        let saved = store.save_course(&edited).await.unwrap();
        assert_eq!(saved.meta.created_at, created.meta.created_at);
        assert_eq!(saved.title, "c2");

        store.delete_course(created.meta.id).await.unwrap();
        assert!(store.save_course(&edited).await.unwrap_err().is_not_found());
    }
}
