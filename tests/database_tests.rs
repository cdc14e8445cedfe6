// tests/database_tests.rs

use chrono::Utc;
use quiz_backend::{
    Database,
    models::{Course, Feedback, FeedbackStatus, Question, Score, Turma, User},
    storage::{Collection, StoreError},
};
use serde_json::{Map, Value, json};

fn fields(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("fields must be a JSON object")
}

fn course(id: i64, name: &str) -> Course {
    Course {
        id,
        name: name.to_string(),
        description: format!("{} basics", name),
        category: Some("exact".to_string()),
        color: Some("#4f46e5".to_string()),
        created_by: Some(1),
        created_at: Some(Utc::now()),
        extra: Map::new(),
    }
}

fn question(course_id: i64, id: &str, command: &str) -> Question {
    Question {
        id: id.to_string(),
        course_id,
        capacidade: "C1".to_string(),
        context: "A train leaves the station...".to_string(),
        command: command.to_string(),
        options: vec![json!("a"), json!("b"), json!("c")],
        created_by: Some(1),
        created_at: Some(Utc::now()),
        extra: Map::new(),
    }
}

fn score(id: i64, user_id: i64, course_id: i64) -> Score {
    Score {
        id,
        user_id,
        course_id,
        quiz_id: None,
        score: 80.0,
        correct: 8,
        total: 10,
        created_at: Some(Utc::now()),
        extra: Map::new(),
    }
}

fn user(id: i64, username: &str) -> User {
    User {
        id,
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password: "$argon2id$fake".to_string(),
        role: "student".to_string(),
        created_at: Some(Utc::now()),
        extra: Map::new(),
    }
}

#[tokio::test]
async fn memory_is_the_default_backend() {
    let db = Database::in_memory();
    assert!(!db.is_firebase_enabled());
}

#[tokio::test]
async fn created_records_read_back_equal() {
    let db = Database::in_memory();

    let created = db.create_user(user(1, "ana")).await.unwrap();
    assert_eq!(db.get_user_by_id(1).await.unwrap(), Some(created.clone()));
    assert_eq!(db.get_user_by_email("ana@example.com").await.unwrap(), Some(created.clone()));
    assert_eq!(db.get_user_by_username("ana").await.unwrap(), Some(created));
    assert_eq!(db.get_user_by_email("bob@example.com").await.unwrap(), None);

    let turma = Turma {
        id: 3,
        professor_id: 1,
        name: "3A".to_string(),
        student_ids: vec![4, 5],
        created_at: None,
        extra: Map::new(),
    };
    db.create_turma(turma.clone()).await.unwrap();
    assert_eq!(db.get_turma_by_id(3).await.unwrap(), Some(turma.clone()));
    assert_eq!(db.get_turmas_by_professor(1).await.unwrap(), vec![turma]);
}

#[tokio::test]
async fn delete_then_get_is_absent() {
    let db = Database::in_memory();
    db.create_course(course(1, "Math")).await.unwrap();

    assert!(db.delete_course(1).await.unwrap());
    assert_eq!(db.get_course_by_id(1).await.unwrap(), None);

    // Nothing left to delete.
    assert!(!db.delete_course(1).await.unwrap());
}

#[tokio::test]
async fn next_id_follows_the_highest_id() {
    let db = Database::in_memory();
    assert_eq!(db.get_next_id(Collection::Courses).await.unwrap(), 1);

    db.create_course(course(7, "Physics")).await.unwrap();
    db.create_course(course(3, "Chemistry")).await.unwrap();

    let first = db.get_next_id(Collection::Courses).await.unwrap();
    assert_eq!(first, 8);
    db.create_course(course(first, "Biology")).await.unwrap();
    assert_eq!(db.get_next_id(Collection::Courses).await.unwrap(), 9);
}

#[tokio::test]
async fn questions_are_keyed_by_course_and_id() {
    let db = Database::in_memory();
    db.create_course(course(1, "Math")).await.unwrap();
    db.create_course(course(2, "History")).await.unwrap();

    db.create_question(question(1, "Q1", "2 + 2?")).await.unwrap();
    db.create_question(question(1, "Q2", "3 * 3?")).await.unwrap();
    db.create_question(question(2, "Q1", "When did Rome fall?")).await.unwrap();

    assert_eq!(db.get_questions_by_course(1).await.unwrap().len(), 2);
    assert_eq!(db.get_questions().await.unwrap().len(), 3);

    let history = db.get_question_by_id(2, "Q1").await.unwrap().unwrap();
    assert_eq!(history.command, "When did Rome fall?");
    let math = db.get_question_by_id(1, "Q1").await.unwrap().unwrap();
    assert_eq!(math.command, "2 + 2?");

    assert!(db.delete_question(1, "Q1").await.unwrap());
    assert!(db.get_question_by_id(2, "Q1").await.unwrap().is_some());
}

#[tokio::test]
async fn question_ids_follow_remote_key_rules() {
    let db = Database::in_memory();

    // Valid remotely once percent-encoded, so valid here too.
    db.create_question(question(1, "Q?1", "a")).await.unwrap();
    db.create_question(question(1, "50%", "b")).await.unwrap();
    assert_eq!(db.get_questions_by_course(1).await.unwrap().len(), 2);

    let result = db.create_question(question(1, "Q.1", "c")).await;
    assert!(matches!(result, Err(StoreError::InvalidKey(key)) if key == "1_Q.1"));
    assert!(matches!(
        db.delete_question(1, "a/b").await,
        Err(StoreError::InvalidKey(_))
    ));
    assert_eq!(db.get_questions().await.unwrap().len(), 2);
}

#[tokio::test]
async fn deleting_a_course_does_not_cascade() {
    let db = Database::in_memory();
    db.create_course(course(1, "Math")).await.unwrap();
    db.create_question(question(1, "Q1", "2 + 2?")).await.unwrap();
    db.create_score(score(1, 10, 1)).await.unwrap();

    db.delete_course(1).await.unwrap();

    assert_eq!(db.get_questions_by_course(1).await.unwrap().len(), 1);
    assert_eq!(db.get_scores_by_course(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn bulk_delete_only_touches_matches() {
    let db = Database::in_memory();
    db.create_question(question(1, "Q1", "a")).await.unwrap();
    db.create_question(question(1, "Q2", "b")).await.unwrap();
    db.create_question(question(2, "Q1", "c")).await.unwrap();

    assert_eq!(db.delete_questions_by_course(1).await.unwrap(), 2);
    assert!(db.get_questions_by_course(1).await.unwrap().is_empty());
    assert_eq!(db.get_questions_by_course(2).await.unwrap().len(), 1);

    // Repeating on an empty match set is a no-op.
    assert_eq!(db.delete_questions_by_course(1).await.unwrap(), 0);
    assert_eq!(db.get_questions().await.unwrap().len(), 1);
}

#[tokio::test]
async fn scores_bulk_delete_by_user_and_course() {
    let db = Database::in_memory();
    db.create_score(score(1, 10, 1)).await.unwrap();
    db.create_score(score(2, 10, 2)).await.unwrap();
    db.create_score(score(3, 11, 1)).await.unwrap();
    db.create_score(score(4, 12, 2)).await.unwrap();

    assert_eq!(db.get_scores_by_user(10).await.unwrap().len(), 2);

    assert_eq!(db.delete_scores_by_user(10).await.unwrap(), 2);
    assert_eq!(db.delete_scores_by_course(1).await.unwrap(), 1);

    let remaining: Vec<i64> = db.get_scores().await.unwrap().iter().map(|s| s.id).collect();
    assert_eq!(remaining, vec![4]);
}

#[tokio::test]
async fn update_merges_and_preserves_other_fields() {
    let db = Database::in_memory();
    let original = db.create_course(course(1, "Math")).await.unwrap();

    let updated = db
        .update_course(1, fields(json!({"name": "Algebra", "level": "advanced"})))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.name, "Algebra");
    assert_eq!(updated.description, original.description);
    assert_eq!(updated.color, original.color);
    assert_eq!(updated.created_at, original.created_at);
    assert_eq!(updated.extra.get("level"), Some(&json!("advanced")));
    assert_eq!(db.get_course_by_id(1).await.unwrap(), Some(updated));
}

#[tokio::test]
async fn update_never_moves_a_record() {
    let db = Database::in_memory();
    db.create_question(question(1, "Q1", "a")).await.unwrap();

    let updated = db
        .update_question(1, "Q1", fields(json!({"id": "Q9", "courseId": 5, "command": "b"})))
        .await
        .unwrap()
        .unwrap();

    assert_eq!((updated.course_id, updated.id.as_str()), (1, "Q1"));
    assert_eq!(updated.command, "b");
}

#[tokio::test]
async fn update_of_missing_record_is_absent() {
    let db = Database::in_memory();

    let result = db
        .update_feedback(42, fields(json!({"status": "resolved"})))
        .await
        .unwrap();

    assert_eq!(result, None);
    assert!(db.get_feedbacks().await.unwrap().is_empty());
}

#[tokio::test]
async fn feedbacks_filter_by_status() {
    let db = Database::in_memory();
    for (id, status) in [
        (1, FeedbackStatus::Pending),
        (2, FeedbackStatus::Resolved),
        (3, FeedbackStatus::Pending),
    ] {
        db.create_feedback(Feedback {
            id,
            status,
            user_id: Some(10),
            message: format!("feedback {}", id),
            created_at: None,
            extra: Map::new(),
        })
        .await
        .unwrap();
    }

    let pending = db.get_feedbacks_by_status(FeedbackStatus::Pending).await.unwrap();
    assert_eq!(pending.iter().map(|f| f.id).collect::<Vec<_>>(), vec![1, 3]);

    db.update_feedback(1, fields(json!({"status": "reviewed"}))).await.unwrap();
    assert_eq!(
        db.get_feedbacks_by_status(FeedbackStatus::Reviewed).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn gamification_profile_is_created_then_merged() {
    let db = Database::in_memory();
    assert_eq!(db.get_gamification_profile(5).await.unwrap(), None);

    let created = db
        .save_gamification_profile(5, fields(json!({"points": 30, "badges": ["first-quiz"]})))
        .await
        .unwrap();
    assert_eq!(created.user_id, 5);
    assert_eq!(created.points, 30);
    assert_eq!(created.level, 1);
    assert!(created.created_at.is_some());

    let merged = db
        .save_gamification_profile(5, fields(json!({"points": 55, "level": 2})))
        .await
        .unwrap();
    assert_eq!(merged.points, 55);
    assert_eq!(merged.level, 2);
    assert_eq!(merged.badges, vec!["first-quiz".to_string()]);
    assert_eq!(merged.created_at, created.created_at);

    assert!(db.delete_gamification_profile(5).await.unwrap());
    assert_eq!(db.get_gamification_profile(5).await.unwrap(), None);
}

#[tokio::test]
async fn reset_all_empties_every_collection() {
    let db = Database::in_memory();
    db.create_user(user(1, "ana")).await.unwrap();
    db.create_course(course(1, "Math")).await.unwrap();
    db.create_question(question(1, "Q1", "a")).await.unwrap();
    db.create_score(score(1, 1, 1)).await.unwrap();
    db.save_gamification_profile(1, Map::new()).await.unwrap();

    db.reset_all().await.unwrap();

    assert!(db.get_users().await.unwrap().is_empty());
    assert!(db.get_courses().await.unwrap().is_empty());
    assert!(db.get_questions().await.unwrap().is_empty());
    assert!(db.get_quizzes().await.unwrap().is_empty());
    assert!(db.get_scores().await.unwrap().is_empty());
    assert!(db.get_feedbacks().await.unwrap().is_empty());
    assert!(db.get_turmas().await.unwrap().is_empty());
    assert_eq!(db.get_gamification_profile(1).await.unwrap(), None);
    assert_eq!(db.get_next_id(Collection::Users).await.unwrap(), 1);
}
