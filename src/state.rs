// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    repositories::Repositories,
    services::{
        AuthService, GradingService, QuestionService, QuizService, ScoreService,
        SubmissionService,
    },
    utils::{
        cache::{CodeCache, MemoryCodeCache},
        notifier::{LogNotifier, Notifier},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub auth: Arc<AuthService>,
    pub quizzes: Arc<QuizService>,
    pub questions: Arc<QuestionService>,
    pub submissions: Arc<SubmissionService>,
    pub grading: Arc<GradingService>,
    pub scores: Arc<ScoreService>,
}

impl AppState {
    /// Wires every service on top of the given stores.
    pub fn new(config: Config, repos: Repositories) -> Self {
        let codes: Arc<dyn CodeCache> = Arc::new(MemoryCodeCache::new());
        let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
        Self::with_delivery(config, repos, codes, notifier)
    }

    pub fn with_delivery(
        config: Config,
        repos: Repositories,
        codes: Arc<dyn CodeCache>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            auth: Arc::new(AuthService::new(
                repos.users.clone(),
                codes,
                notifier,
                config.clone(),
            )),
            quizzes: Arc::new(QuizService::new(
                repos.quizzes.clone(),
                repos.questions.clone(),
            )),
            questions: Arc::new(QuestionService::new(
                repos.quizzes.clone(),
                repos.questions.clone(),
            )),
            submissions: Arc::new(SubmissionService::new(
                repos.quizzes.clone(),
                repos.questions.clone(),
                repos.participants.clone(),
            )),
            grading: Arc::new(GradingService::new(
                repos.quizzes.clone(),
                repos.participants.clone(),
            )),
            scores: Arc::new(ScoreService::new(
                repos.quizzes,
                repos.questions,
                repos.participants,
            )),
            config,
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
