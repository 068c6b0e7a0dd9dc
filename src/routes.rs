// src/routes.rs

use axum::{
    Router,
    http::{Method, header},
    middleware,
    routing::{delete, get, patch, post, put},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{auth, published, question, quiz, results},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * `/api/auth` for accounts, `/api/quizzes` for owners (bearer token required),
///   `/api/pub` for participants.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/register/send-code", post(auth::send_code))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .merge(
            Router::new()
                .route("/profile", get(auth::profile))
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        );

    let quiz_routes = Router::new()
        .route("/", post(quiz::create_quiz).get(quiz::list_quizzes))
        .route(
            "/{id}",
            get(quiz::get_quiz)
                .patch(quiz::update_settings)
                .delete(quiz::delete_quiz),
        )
        .route("/{id}/password", post(quiz::set_password))
        .route("/{id}/activation", post(quiz::toggle_activation))
        .route("/{id}/questions", get(question::list_questions))
        .route(
            "/{id}/questions/descriptive-short",
            post(question::create_descriptive_short),
        )
        .route(
            "/{id}/questions/descriptive-long",
            post(question::create_descriptive_long),
        )
        .route(
            "/{id}/questions/multiple-options",
            post(question::create_multiple_options),
        )
        .route(
            "/{id}/questions/{qid}",
            delete(question::delete_question),
        )
        .route(
            "/{id}/questions/{qid}/descriptive",
            put(question::update_descriptive),
        )
        .route(
            "/{id}/questions/{qid}/multiple-options",
            put(question::update_multiple_options),
        )
        .route(
            "/{id}/questions/{qid}/correct-option",
            put(question::set_correct_option),
        )
        .route("/{id}/answer-key", get(results::answer_key))
        .route("/{id}/results", get(results::results))
        .route(
            "/{id}/participants/{pid}",
            get(results::participant_detail),
        )
        .route(
            "/{id}/participants/{pid}/grades",
            patch(results::grade_participant),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let published_routes = Router::new()
        .route("/{quiz}/password-status", get(published::password_status))
        .route("/{quiz}/questions", post(published::published_questions))
        .route("/{quiz}/answers", post(published::submit_answers));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/quizzes", quiz_routes)
        .nest("/api/pub", published_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
