// src/services/mod.rs

pub mod access;
pub mod auth_service;
pub mod grading_service;
pub mod lifecycle;
pub mod question_service;
pub mod quiz_service;
pub mod score_service;
pub mod submission_service;

pub use auth_service::AuthService;
pub use grading_service::GradingService;
pub use question_service::QuestionService;
pub use quiz_service::QuizService;
pub use score_service::ScoreService;
pub use submission_service::SubmissionService;
