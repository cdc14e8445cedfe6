// src/database.rs

//! Entry point for all persistence.
//!
//! `Database` owns one `Store`, chosen once when it is built, and exposes the
//! same async CRUD surface whichever backend is active.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};

use crate::{
    config::Config,
    models::{
        Course, Feedback, FeedbackStatus, GamificationProfile, ProfileKey, Question, QuestionKey,
        Quiz, Score, Turma, User,
    },
    storage::{
        BackendKind, Collection, FirebaseStore, MemoryStore, Record, Repository, Result, Store,
    },
};

#[derive(Clone)]
pub struct Database {
    store: Arc<dyn Store>,
}

impl Database {
    /// Builds the database from configuration.
    ///
    /// Uses Firebase when credentials are present and usable; any
    /// initialization failure is logged and the memory store is used instead.
    pub fn from_config(config: &Config) -> Self {
        if !config.firebase.is_configured() {
            tracing::info!("No Firebase credentials found, using in-memory storage");
            return Self::in_memory();
        }

        match FirebaseStore::from_settings(&config.firebase) {
            Ok(store) => {
                tracing::info!("Using Firebase Realtime Database at {}", store.database_url());
                Self::with_store(Arc::new(store))
            }
            Err(e) => {
                tracing::warn!("Firebase initialization failed ({}), falling back to in-memory storage", e);
                Self::in_memory()
            }
        }
    }

    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    pub fn with_store(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn backend(&self) -> BackendKind {
        self.store.kind()
    }

    pub fn is_firebase_enabled(&self) -> bool {
        self.backend() == BackendKind::Firebase
    }

    /// One keyed read against the backend to confirm it answers.
    pub async fn ping(&self) -> Result<()> {
        self.store.get(Collection::Users, &0_i64).await?;
        Ok(())
    }

    fn repo<T: Record>(&self) -> Repository<'_, T> {
        Repository::new(self.store.as_ref())
    }

    /// Next free integer id for a collection.
    pub async fn get_next_id(&self, collection: Collection) -> Result<i64> {
        self.store.next_id(collection).await
    }

    /// Wipes every collection on the active backend.
    pub async fn reset_all(&self) -> Result<()> {
        tracing::warn!("Resetting all {} data", self.backend().as_str());
        self.store.clear().await
    }

    // ---- Users ----

    pub async fn get_users(&self) -> Result<Vec<User>> {
        self.repo::<User>().all().await
    }

    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.repo::<User>().get(&id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let mut users = self.repo::<User>().find_by("email", email).await?;
        Ok(users.pop())
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let mut users = self.repo::<User>().find_by("username", username).await?;
        Ok(users.pop())
    }

    pub async fn create_user(&self, user: User) -> Result<User> {
        self.repo::<User>().save(user).await
    }

    pub async fn update_user(&self, id: i64, fields: Map<String, Value>) -> Result<Option<User>> {
        self.repo::<User>().update(&id, fields).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<bool> {
        self.repo::<User>().delete(&id).await
    }

    // ---- Courses ----

    pub async fn get_courses(&self) -> Result<Vec<Course>> {
        self.repo::<Course>().all().await
    }

    pub async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>> {
        self.repo::<Course>().get(&id).await
    }

    pub async fn create_course(&self, course: Course) -> Result<Course> {
        self.repo::<Course>().save(course).await
    }

    pub async fn update_course(
        &self,
        id: i64,
        fields: Map<String, Value>,
    ) -> Result<Option<Course>> {
        self.repo::<Course>().update(&id, fields).await
    }

    /// Removes the course only; its questions and scores stay until the
    /// caller deletes them with the `*_by_course` helpers.
    pub async fn delete_course(&self, id: i64) -> Result<bool> {
        self.repo::<Course>().delete(&id).await
    }

    // ---- Questions ----

    pub async fn get_questions(&self) -> Result<Vec<Question>> {
        self.repo::<Question>().all().await
    }

    pub async fn get_questions_by_course(&self, course_id: i64) -> Result<Vec<Question>> {
        self.repo::<Question>().find_by("courseId", course_id).await
    }

    pub async fn get_question_by_id(
        &self,
        course_id: i64,
        question_id: &str,
    ) -> Result<Option<Question>> {
        self.repo::<Question>().get(&QuestionKey::new(course_id, question_id)).await
    }

    pub async fn create_question(&self, question: Question) -> Result<Question> {
        self.repo::<Question>().save(question).await
    }

    pub async fn update_question(
        &self,
        course_id: i64,
        question_id: &str,
        fields: Map<String, Value>,
    ) -> Result<Option<Question>> {
        self.repo::<Question>()
            .update(&QuestionKey::new(course_id, question_id), fields)
            .await
    }

    pub async fn delete_question(&self, course_id: i64, question_id: &str) -> Result<bool> {
        self.repo::<Question>()
            .delete(&QuestionKey::new(course_id, question_id))
            .await
    }

    pub async fn delete_questions_by_course(&self, course_id: i64) -> Result<usize> {
        let removed = self.repo::<Question>().delete_by("courseId", course_id).await?;
        tracing::info!("Deleted {} questions of course {}", removed, course_id);
        Ok(removed)
    }

    // ---- Quizzes ----

    pub async fn get_quizzes(&self) -> Result<Vec<Quiz>> {
        self.repo::<Quiz>().all().await
    }

    pub async fn get_quiz_by_id(&self, id: i64) -> Result<Option<Quiz>> {
        self.repo::<Quiz>().get(&id).await
    }

    pub async fn get_quizzes_by_course(&self, course_id: i64) -> Result<Vec<Quiz>> {
        self.repo::<Quiz>().find_by("courseId", course_id).await
    }

    pub async fn create_quiz(&self, quiz: Quiz) -> Result<Quiz> {
        self.repo::<Quiz>().save(quiz).await
    }

    pub async fn update_quiz(&self, id: i64, fields: Map<String, Value>) -> Result<Option<Quiz>> {
        self.repo::<Quiz>().update(&id, fields).await
    }

    pub async fn delete_quiz(&self, id: i64) -> Result<bool> {
        self.repo::<Quiz>().delete(&id).await
    }

    // ---- Scores ----

    pub async fn get_scores(&self) -> Result<Vec<Score>> {
        self.repo::<Score>().all().await
    }

    pub async fn get_score_by_id(&self, id: i64) -> Result<Option<Score>> {
        self.repo::<Score>().get(&id).await
    }

    pub async fn get_scores_by_user(&self, user_id: i64) -> Result<Vec<Score>> {
        self.repo::<Score>().find_by("userId", user_id).await
    }

    pub async fn get_scores_by_course(&self, course_id: i64) -> Result<Vec<Score>> {
        self.repo::<Score>().find_by("courseId", course_id).await
    }

    pub async fn create_score(&self, score: Score) -> Result<Score> {
        self.repo::<Score>().save(score).await
    }

    pub async fn update_score(&self, id: i64, fields: Map<String, Value>) -> Result<Option<Score>> {
        self.repo::<Score>().update(&id, fields).await
    }

    pub async fn delete_score(&self, id: i64) -> Result<bool> {
        self.repo::<Score>().delete(&id).await
    }

    pub async fn delete_scores_by_user(&self, user_id: i64) -> Result<usize> {
        let removed = self.repo::<Score>().delete_by("userId", user_id).await?;
        tracing::info!("Deleted {} scores of user {}", removed, user_id);
        Ok(removed)
    }

    pub async fn delete_scores_by_course(&self, course_id: i64) -> Result<usize> {
        let removed = self.repo::<Score>().delete_by("courseId", course_id).await?;
        tracing::info!("Deleted {} scores of course {}", removed, course_id);
        Ok(removed)
    }

    // ---- Feedbacks ----

    pub async fn get_feedbacks(&self) -> Result<Vec<Feedback>> {
        self.repo::<Feedback>().all().await
    }

    pub async fn get_feedback_by_id(&self, id: i64) -> Result<Option<Feedback>> {
        self.repo::<Feedback>().get(&id).await
    }

    pub async fn get_feedbacks_by_status(&self, status: FeedbackStatus) -> Result<Vec<Feedback>> {
        self.repo::<Feedback>().find_by("status", status.as_str()).await
    }

    pub async fn create_feedback(&self, feedback: Feedback) -> Result<Feedback> {
        self.repo::<Feedback>().save(feedback).await
    }

    pub async fn update_feedback(
        &self,
        id: i64,
        fields: Map<String, Value>,
    ) -> Result<Option<Feedback>> {
        self.repo::<Feedback>().update(&id, fields).await
    }

    pub async fn delete_feedback(&self, id: i64) -> Result<bool> {
        self.repo::<Feedback>().delete(&id).await
    }

    // ---- Turmas ----

    pub async fn get_turmas(&self) -> Result<Vec<Turma>> {
        self.repo::<Turma>().all().await
    }

    pub async fn get_turma_by_id(&self, id: i64) -> Result<Option<Turma>> {
        self.repo::<Turma>().get(&id).await
    }

    pub async fn get_turmas_by_professor(&self, professor_id: i64) -> Result<Vec<Turma>> {
        self.repo::<Turma>().find_by("professorId", professor_id).await
    }

    pub async fn create_turma(&self, turma: Turma) -> Result<Turma> {
        self.repo::<Turma>().save(turma).await
    }

    pub async fn update_turma(&self, id: i64, fields: Map<String, Value>) -> Result<Option<Turma>> {
        self.repo::<Turma>().update(&id, fields).await
    }

    pub async fn delete_turma(&self, id: i64) -> Result<bool> {
        self.repo::<Turma>().delete(&id).await
    }

    // ---- Gamification ----

    pub async fn get_gamification_profile(
        &self,
        user_id: i64,
    ) -> Result<Option<GamificationProfile>> {
        self.repo::<GamificationProfile>().get(&ProfileKey(user_id)).await
    }

    /// Creates the profile on first save, otherwise merges `fields` into it.
    pub async fn save_gamification_profile(
        &self,
        user_id: i64,
        mut fields: Map<String, Value>,
    ) -> Result<GamificationProfile> {
        let repo = self.repo::<GamificationProfile>();
        let key = ProfileKey(user_id);
        let now = serde_json::to_value(Utc::now())?;

        fields.insert("updatedAt".to_string(), now.clone());

        if let Some(profile) = repo.update(&key, fields.clone()).await? {
            return Ok(profile);
        }

        fields.insert("userId".to_string(), Value::from(user_id));
        fields.insert("createdAt".to_string(), now);
        fields.retain(|_, value| !value.is_null());

        let profile: GamificationProfile = serde_json::from_value(Value::Object(fields))?;
        tracing::debug!("Created gamification profile for user {}", user_id);
        repo.save(profile).await
    }

    pub async fn delete_gamification_profile(&self, user_id: i64) -> Result<bool> {
        self.repo::<GamificationProfile>()
            .delete(&ProfileKey(user_id))
            .await
    }
}
