// src/models/mod.rs

pub mod course;
pub mod feedback;
pub mod gamification;
pub mod question;
pub mod quiz;
pub mod score;
pub mod turma;
pub mod user;

pub use course::Course;
pub use feedback::{Feedback, FeedbackStatus};
pub use gamification::{GamificationProfile, ProfileKey};
pub use question::{Question, QuestionKey};
pub use quiz::Quiz;
pub use score::Score;
pub use turma::Turma;
pub use user::User;
