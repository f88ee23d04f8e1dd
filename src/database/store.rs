use async_trait::async_trait;
use tracing::{info, warn};

use crate::database::manager::DatabaseError;
use crate::database::models::{
    ContentTopic, Course, Material, MaterialPatch, NewContentTopic, NewCourse, NewMaterial,
    NewMaterialTree, NewProgram, NewUser, NewVideoCourse, Program, User,
};

/// Per-entity persistence operations. Reads never return soft-deleted rows.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn ping(&self) -> Result<(), DatabaseError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
    /// Fails with `Conflict` when the email is taken.
    async fn create_user(&self, user: &NewUser) -> Result<User, DatabaseError>;

    async fn list_courses(&self) -> Result<Vec<Course>, DatabaseError>;
    async fn find_course(&self, id: i64) -> Result<Option<Course>, DatabaseError>;
    async fn create_course(&self, course: &NewCourse) -> Result<Course, DatabaseError>;
    async fn save_course(&self, course: &Course) -> Result<Course, DatabaseError>;
    async fn delete_course(&self, id: i64) -> Result<(), DatabaseError>;

    async fn list_programs(&self) -> Result<Vec<Program>, DatabaseError>;
    async fn find_program(&self, id: i64) -> Result<Option<Program>, DatabaseError>;
    async fn create_program(&self, program: &NewProgram) -> Result<Program, DatabaseError>;
    async fn save_program(&self, program: &Program) -> Result<Program, DatabaseError>;
    async fn delete_program(&self, id: i64) -> Result<(), DatabaseError>;

    /// Materials come back with their children loaded.
    async fn list_materials(&self) -> Result<Vec<Material>, DatabaseError>;
    async fn find_material(&self, id: i64) -> Result<Option<Material>, DatabaseError>;

    /// Topics of one material, by `order` then id.
    async fn list_content_topics(&self, material_id: i64) -> Result<Vec<ContentTopic>, DatabaseError>;
    async fn find_content_topic(&self, id: i64) -> Result<Option<ContentTopic>, DatabaseError>;
    /// Fails with `NotFound` when the parent material does not exist.
    async fn create_content_topic(&self, topic: &NewContentTopic) -> Result<ContentTopic, DatabaseError>;
    async fn save_content_topic(&self, topic: &ContentTopic) -> Result<ContentTopic, DatabaseError>;
    async fn delete_content_topic(&self, id: i64) -> Result<(), DatabaseError>;

    async fn begin(&self) -> Result<Box<dyn StoreTx>, DatabaseError>;
}

/// Writes that must land together. Dropping without `commit` discards them.
#[async_trait]
pub trait StoreTx: Send {
    async fn insert_material(&mut self, material: &NewMaterial) -> Result<i64, DatabaseError>;
    async fn update_material(&mut self, material: &Material) -> Result<(), DatabaseError>;
    async fn delete_material(&mut self, id: i64) -> Result<(), DatabaseError>;

    async fn insert_content_topic(&mut self, topic: &NewContentTopic) -> Result<i64, DatabaseError>;
    async fn delete_content_topics(&mut self, material_id: i64) -> Result<u64, DatabaseError>;

    async fn insert_video_course(&mut self, video: &NewVideoCourse) -> Result<i64, DatabaseError>;
    async fn delete_video_courses(&mut self, material_id: i64) -> Result<u64, DatabaseError>;

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError>;
    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError>;
}

async fn abort(tx: Box<dyn StoreTx>, error: DatabaseError) -> DatabaseError {
    if let Err(e) = tx.rollback().await {
        warn!(error = %e, "Rollback failed");
    }
    error
}

async fn write_tree(tx: &mut dyn StoreTx, tree: &NewMaterialTree) -> Result<i64, DatabaseError> {
    let material_id = tx.insert_material(&tree.material).await?;
    for topic in &tree.content {
        tx.insert_content_topic(&topic.attach(material_id)).await?;
    }
    for video in &tree.video_courses {
        tx.insert_video_course(&video.attach(material_id)).await?;
    }
    Ok(material_id)
}

async fn write_patch(
    tx: &mut dyn StoreTx,
    material: &Material,
    patch: &MaterialPatch,
) -> Result<(), DatabaseError> {
    tx.update_material(material).await?;
    if let Some(content) = &patch.content {
        tx.delete_content_topics(material.meta.id).await?;
        for topic in content {
            tx.insert_content_topic(&topic.attach(material.meta.id)).await?;
        }
    }
    if let Some(videos) = &patch.video_courses {
        tx.delete_video_courses(material.meta.id).await?;
        for video in videos {
            tx.insert_video_course(&video.attach(material.meta.id)).await?;
        }
    }
    Ok(())
}

async fn remove_tree(tx: &mut dyn StoreTx, material_id: i64) -> Result<(), DatabaseError> {
    tx.delete_content_topics(material_id).await?;
    tx.delete_video_courses(material_id).await?;
    tx.delete_material(material_id).await
}

async fn reload(store: &dyn CatalogStore, id: i64) -> Result<Material, DatabaseError> {
    store
        .find_material(id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("material {}", id)))
}

/// Inserts a material and all of its children in one transaction.
pub async fn create_material_tree(
    store: &dyn CatalogStore,
    tree: &NewMaterialTree,
) -> Result<Material, DatabaseError> {
    let mut tx = store.begin().await?;
    let id = match write_tree(tx.as_mut(), tree).await {
        Ok(id) => id,
        Err(e) => return Err(abort(tx, e).await),
    };
    tx.commit().await?;

    info!(
        material_id = id,
        topics = tree.content.len(),
        videos = tree.video_courses.len(),
        "Material created"
    );
    reload(store, id).await
}

/// Saves `material` (already patched) and replaces any child set the patch
/// carries, in one transaction.
pub async fn update_material_tree(
    store: &dyn CatalogStore,
    material: &Material,
    patch: &MaterialPatch,
) -> Result<Material, DatabaseError> {
    let mut tx = store.begin().await?;
    if let Err(e) = write_patch(tx.as_mut(), material, patch).await {
        return Err(abort(tx, e).await);
    }
    tx.commit().await?;

    info!(material_id = material.meta.id, "Material updated");
    reload(store, material.meta.id).await
}

/// Soft-deletes the children then the material, in one transaction.
pub async fn delete_material_tree(store: &dyn CatalogStore, material_id: i64) -> Result<(), DatabaseError> {
    let mut tx = store.begin().await?;
    if let Err(e) = remove_tree(tx.as_mut(), material_id).await {
        return Err(abort(tx, e).await);
    }
    tx.commit().await?;

    info!(material_id, "Material deleted");
    Ok(())
}
