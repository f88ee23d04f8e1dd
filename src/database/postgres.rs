use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{PgExecutor, Postgres, Row, Transaction};
use std::collections::HashMap;
use std::str::FromStr;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    ContentTopic, Course, Material, Metadata, NewContentTopic, NewCourse, NewMaterial, NewProgram,
    NewUser, NewVideoCourse, Program, UnknownVariant, User, VideoCourse,
};
use crate::database::store::{CatalogStore, StoreTx};
use crate::database::string_list;

const USER_COLUMNS: &str = "id, email, password_hash, full_name, role, created_at, updated_at, deleted_at";
const COURSE_COLUMNS: &str =
    "id, title, description, instructor, duration, price, created_at, updated_at, deleted_at";
const PROGRAM_COLUMNS: &str =
    "id, title, program_type, duration, price, features, created_at, updated_at, deleted_at";
const MATERIAL_COLUMNS: &str = "id, title, description, icon, duration, lessons, learning_points, \
     created_at, updated_at, deleted_at";
const TOPIC_COLUMNS: &str = "id, material_id, title, content, topics, sort_order, \
     created_at, updated_at, deleted_at";
const VIDEO_COLUMNS: &str = "id, material_id, title, description, youtube_id, duration, instructor, level, \
     created_at, updated_at, deleted_at";

fn meta(row: &PgRow) -> Result<Metadata, sqlx::Error> {
    Ok(Metadata {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get("deleted_at")?,
    })
}

fn variant<T>(row: &PgRow, column: &str) -> Result<T, DatabaseError>
where
    T: FromStr<Err = UnknownVariant>,
{
    let raw: String = row.try_get(column)?;
    raw.parse()
        .map_err(|e: UnknownVariant| DatabaseError::Corrupt(format!("{}: {}", column, e)))
}

fn list(row: &PgRow, column: &str) -> Result<Vec<String>, DatabaseError> {
    string_list::decode(column, row.try_get(column)?)
}

fn user_row(row: &PgRow) -> Result<User, DatabaseError> {
    Ok(User {
        meta: meta(row)?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        full_name: row.try_get("full_name")?,
        role: variant(row, "role")?,
    })
}

fn course_row(row: &PgRow) -> Result<Course, DatabaseError> {
    Ok(Course {
        meta: meta(row)?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        instructor: row.try_get("instructor")?,
        duration: row.try_get("duration")?,
        price: row.try_get("price")?,
    })
}

fn program_row(row: &PgRow) -> Result<Program, DatabaseError> {
    Ok(Program {
        meta: meta(row)?,
        title: row.try_get("title")?,
        program_type: variant(row, "program_type")?,
        duration: row.try_get("duration")?,
        price: row.try_get("price")?,
        features: list(row, "features")?,
    })
}

fn material_row(row: &PgRow) -> Result<Material, DatabaseError> {
    Ok(Material {
        meta: meta(row)?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        icon: row.try_get("icon")?,
        duration: row.try_get("duration")?,
        lessons: row.try_get("lessons")?,
        learning_points: list(row, "learning_points")?,
        content: Vec::new(),
        video_courses: Vec::new(),
    })
}

fn topic_row(row: &PgRow) -> Result<ContentTopic, DatabaseError> {
    Ok(ContentTopic {
        meta: meta(row)?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        topics: list(row, "topics")?,
        order: row.try_get("sort_order")?,
        material_id: row.try_get("material_id")?,
    })
}

fn video_row(row: &PgRow) -> Result<VideoCourse, DatabaseError> {
    Ok(VideoCourse {
        meta: meta(row)?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        youtube_id: row.try_get("youtube_id")?,
        duration: row.try_get("duration")?,
        instructor: row.try_get("instructor")?,
        level: variant(row, "level")?,
        material_id: row.try_get("material_id")?,
    })
}

fn rows<T>(rows: Vec<PgRow>, map: fn(&PgRow) -> Result<T, DatabaseError>) -> Result<Vec<T>, DatabaseError> {
    rows.iter().map(map).collect()
}

/// `table` is always one of the constants in this module.
async fn soft_delete<'e, E: PgExecutor<'e>>(executor: E, table: &str, id: i64) -> Result<(), DatabaseError> {
    let sql = format!(
        "UPDATE {} SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
        table
    );
    let done = sqlx::query(&sql).bind(id).execute(executor).await?;
    if done.rows_affected() == 0 {
        return Err(DatabaseError::NotFound(format!("{} {}", table, id)));
    }
    Ok(())
}

async fn soft_delete_children<'e, E: PgExecutor<'e>>(
    executor: E,
    table: &str,
    material_id: i64,
) -> Result<u64, DatabaseError> {
    let sql = format!(
        "UPDATE {} SET deleted_at = now() WHERE material_id = $1 AND deleted_at IS NULL",
        table
    );
    let done = sqlx::query(&sql).bind(material_id).execute(executor).await?;
    Ok(done.rows_affected())
}

fn missing(table: &str, id: i64) -> DatabaseError {
    DatabaseError::NotFound(format!("{} {}", table, id))
}

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn with_children(&self, mut materials: Vec<Material>) -> Result<Vec<Material>, DatabaseError> {
        if materials.is_empty() {
            return Ok(materials);
        }
        let ids: Vec<i64> = materials.iter().map(|m| m.meta.id).collect();

        let sql = format!(
            "SELECT {} FROM content_topics WHERE material_id = ANY($1) AND deleted_at IS NULL \
             ORDER BY sort_order, id",
            TOPIC_COLUMNS
        );
        let topic_rows = sqlx::query(&sql).bind(&ids).fetch_all(&self.pool).await?;
        let mut topics: HashMap<i64, Vec<ContentTopic>> = HashMap::new();
        for topic in rows(topic_rows, topic_row)? {
            topics.entry(topic.material_id).or_default().push(topic);
        }

        let sql = format!(
            "SELECT {} FROM video_courses WHERE material_id = ANY($1) AND deleted_at IS NULL ORDER BY id",
            VIDEO_COLUMNS
        );
        let video_rows = sqlx::query(&sql).bind(&ids).fetch_all(&self.pool).await?;
        let mut videos: HashMap<i64, Vec<VideoCourse>> = HashMap::new();
        for video in rows(video_rows, video_row)? {
            videos.entry(video.material_id).or_default().push(video);
        }

        for material in &mut materials {
            material.content = topics.remove(&material.meta.id).unwrap_or_default();
            material.video_courses = videos.remove(&material.meta.id).unwrap_or_default();
        }
        Ok(materials)
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM users WHERE email = $1 AND deleted_at IS NULL",
            USER_COLUMNS
        );
        let row = sqlx::query(&sql).bind(email).fetch_optional(&self.pool).await?;
        row.as_ref().map(user_row).transpose()
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (email, password_hash, full_name, role) VALUES ($1, $2, $3, $4) \
             RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.full_name)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    DatabaseError::Conflict(format!("email {} already registered", user.email))
                }
                _ => DatabaseError::from(e),
            })?;
        user_row(&row)
    }

    async fn list_courses(&self) -> Result<Vec<Course>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM courses WHERE deleted_at IS NULL ORDER BY id",
            COURSE_COLUMNS
        );
        rows(sqlx::query(&sql).fetch_all(&self.pool).await?, course_row)
    }

    async fn find_course(&self, id: i64) -> Result<Option<Course>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM courses WHERE id = $1 AND deleted_at IS NULL",
            COURSE_COLUMNS
        );
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(course_row).transpose()
    }

    async fn create_course(&self, course: &NewCourse) -> Result<Course, DatabaseError> {
        let sql = format!(
            "INSERT INTO courses (title, description, instructor, duration, price) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            COURSE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&course.title)
            .bind(&course.description)
            .bind(&course.instructor)
            .bind(course.duration)
            .bind(course.price)
            .fetch_one(&self.pool)
            .await?;
        course_row(&row)
    }

    async fn save_course(&self, course: &Course) -> Result<Course, DatabaseError> {
        let sql = format!(
            "UPDATE courses SET title = $2, description = $3, instructor = $4, duration = $5, \
             price = $6, updated_at = now() WHERE id = $1 AND deleted_at IS NULL RETURNING {}",
            COURSE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(course.meta.id)
            .bind(&course.title)
            .bind(&course.description)
            .bind(&course.instructor)
            .bind(course.duration)
            .bind(course.price)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| missing("courses", course.meta.id))?;
        course_row(&row)
    }

    async fn delete_course(&self, id: i64) -> Result<(), DatabaseError> {
        soft_delete(&self.pool, "courses", id).await
    }

    async fn list_programs(&self) -> Result<Vec<Program>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM programs WHERE deleted_at IS NULL ORDER BY id",
            PROGRAM_COLUMNS
        );
        rows(sqlx::query(&sql).fetch_all(&self.pool).await?, program_row)
    }

    async fn find_program(&self, id: i64) -> Result<Option<Program>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM programs WHERE id = $1 AND deleted_at IS NULL",
            PROGRAM_COLUMNS
        );
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(program_row).transpose()
    }

    async fn create_program(&self, program: &NewProgram) -> Result<Program, DatabaseError> {
        let sql = format!(
            "INSERT INTO programs (title, program_type, duration, price, features) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            PROGRAM_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&program.title)
            .bind(program.program_type.as_str())
            .bind(&program.duration)
            .bind(program.price)
            .bind(string_list::encode(&program.features))
            .fetch_one(&self.pool)
            .await?;
        program_row(&row)
    }

    async fn save_program(&self, program: &Program) -> Result<Program, DatabaseError> {
        let sql = format!(
            "UPDATE programs SET title = $2, program_type = $3, duration = $4, price = $5, \
             features = $6, updated_at = now() WHERE id = $1 AND deleted_at IS NULL RETURNING {}",
            PROGRAM_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(program.meta.id)
            .bind(&program.title)
            .bind(program.program_type.as_str())
            .bind(&program.duration)
            .bind(program.price)
            .bind(string_list::encode(&program.features))
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| missing("programs", program.meta.id))?;
        program_row(&row)
    }

    async fn delete_program(&self, id: i64) -> Result<(), DatabaseError> {
        soft_delete(&self.pool, "programs", id).await
    }

    async fn list_materials(&self) -> Result<Vec<Material>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM materials WHERE deleted_at IS NULL ORDER BY id",
            MATERIAL_COLUMNS
        );
        let materials = rows(sqlx::query(&sql).fetch_all(&self.pool).await?, material_row)?;
        self.with_children(materials).await
    }

    async fn find_material(&self, id: i64) -> Result<Option<Material>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM materials WHERE id = $1 AND deleted_at IS NULL",
            MATERIAL_COLUMNS
        );
        let Some(row) = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await? else {
            return Ok(None);
        };
        let loaded = self.with_children(vec![material_row(&row)?]).await?;
        Ok(loaded.into_iter().next())
    }

    async fn list_content_topics(&self, material_id: i64) -> Result<Vec<ContentTopic>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM content_topics WHERE material_id = $1 AND deleted_at IS NULL \
             ORDER BY sort_order, id",
            TOPIC_COLUMNS
        );
        rows(
            sqlx::query(&sql).bind(material_id).fetch_all(&self.pool).await?,
            topic_row,
        )
    }

    async fn find_content_topic(&self, id: i64) -> Result<Option<ContentTopic>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM content_topics WHERE id = $1 AND deleted_at IS NULL",
            TOPIC_COLUMNS
        );
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(topic_row).transpose()
    }

    async fn create_content_topic(&self, topic: &NewContentTopic) -> Result<ContentTopic, DatabaseError> {
        let sql = format!(
            "INSERT INTO content_topics (material_id, title, content, topics, sort_order) \
             SELECT $1, $2, $3, $4, $5 \
             WHERE EXISTS (SELECT 1 FROM materials WHERE id = $1 AND deleted_at IS NULL) \
             RETURNING {}",
            TOPIC_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(topic.material_id)
            .bind(&topic.title)
            .bind(&topic.content)
            .bind(string_list::encode(&topic.topics))
            .bind(topic.order)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| missing("materials", topic.material_id))?;
        topic_row(&row)
    }

    async fn save_content_topic(&self, topic: &ContentTopic) -> Result<ContentTopic, DatabaseError> {
        let sql = format!(
            "UPDATE content_topics SET title = $2, content = $3, topics = $4, sort_order = $5, \
             updated_at = now() WHERE id = $1 AND deleted_at IS NULL RETURNING {}",
            TOPIC_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(topic.meta.id)
            .bind(&topic.title)
            .bind(&topic.content)
            .bind(string_list::encode(&topic.topics))
            .bind(topic.order)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| missing("content_topics", topic.meta.id))?;
        topic_row(&row)
    }

    async fn delete_content_topic(&self, id: i64) -> Result<(), DatabaseError> {
        soft_delete(&self.pool, "content_topics", id).await
    }

    async fn begin(&self) -> Result<Box<dyn StoreTx>, DatabaseError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }
}

/// An open Postgres transaction. Dropping it rolls back.
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn insert_material(&mut self, material: &NewMaterial) -> Result<i64, DatabaseError> {
        let row = sqlx::query(
            "INSERT INTO materials (title, description, icon, duration, lessons, learning_points) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(&material.title)
        .bind(&material.description)
        .bind(&material.icon)
        .bind(material.duration)
        .bind(material.lessons)
        .bind(string_list::encode(&material.learning_points))
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(row.try_get("id")?)
    }

    async fn update_material(&mut self, material: &Material) -> Result<(), DatabaseError> {
        let done = sqlx::query(
            "UPDATE materials SET title = $2, description = $3, icon = $4, duration = $5, \
             lessons = $6, learning_points = $7, updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(material.meta.id)
        .bind(&material.title)
        .bind(&material.description)
        .bind(&material.icon)
        .bind(material.duration)
        .bind(material.lessons)
        .bind(string_list::encode(&material.learning_points))
        .execute(&mut *self.tx)
        .await?;
        if done.rows_affected() == 0 {
            return Err(missing("materials", material.meta.id));
        }
        Ok(())
    }

    async fn delete_material(&mut self, id: i64) -> Result<(), DatabaseError> {
        soft_delete(&mut *self.tx, "materials", id).await
    }

    async fn insert_content_topic(&mut self, topic: &NewContentTopic) -> Result<i64, DatabaseError> {
        let row = sqlx::query(
            "INSERT INTO content_topics (material_id, title, content, topics, sort_order) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(topic.material_id)
        .bind(&topic.title)
        .bind(&topic.content)
        .bind(string_list::encode(&topic.topics))
        .bind(topic.order)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(row.try_get("id")?)
    }

    async fn delete_content_topics(&mut self, material_id: i64) -> Result<u64, DatabaseError> {
        soft_delete_children(&mut *self.tx, "content_topics", material_id).await
    }

    async fn insert_video_course(&mut self, video: &NewVideoCourse) -> Result<i64, DatabaseError> {
        let row = sqlx::query(
            "INSERT INTO video_courses \
             (material_id, title, description, youtube_id, duration, instructor, level) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(video.material_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.youtube_id)
        .bind(&video.duration)
        .bind(&video.instructor)
        .bind(video.level.as_str())
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(row.try_get("id")?)
    }

    async fn delete_video_courses(&mut self, material_id: i64) -> Result<u64, DatabaseError> {
        soft_delete_children(&mut *self.tx, "video_courses", material_id).await
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
