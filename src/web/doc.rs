use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::web::middlewares::AUTH_TOKEN;

pub struct CookieAuthModifier;

impl Modify for CookieAuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    AUTH_TOKEN,
                    "JWT token for current user",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::routes::user::user_signup_handler,
        crate::web::routes::user::user_signin_handler,
        crate::web::routes::user::user_list_handler,
        crate::web::routes::user::user_update_handler,
        crate::web::routes::user::user_delete_handler,
        crate::web::routes::courses::courses_list_handler,
        crate::web::routes::courses::courses_get_handler,
        crate::web::routes::lessons::lessons_get_handler,
        crate::web::routes::lessons::lessons_complete_handler,
        crate::web::routes::quizzes::quizzes_get_handler,
        crate::web::routes::quizzes::quizzes_submit_handler,
        crate::web::routes::progress::progress_get_handler,
        crate::web::routes::progress::progress_reset_handler,
        crate::web::routes::progress::progress_leaderboard_handler,
    ),
    modifiers(&CookieAuthModifier),
    tags(
        (name = "account", description = "Sign up, sign in and account management"),
        (name = "courses", description = "Course catalog"),
        (name = "lessons", description = "Lessons and their completion"),
        (name = "quizzes", description = "Quizzes and their results"),
        (name = "progress", description = "Points, ranks and the leaderboard"),
    ),
)]
pub struct ApiDoc;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn openapi_lists_progress_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/api/v1/lessons/{lesson_id}/complete"));
        assert!(paths.contains_key("/api/v1/quizzes/{quiz_id}/submit"));
        assert!(paths.contains_key("/api/v1/progress/courses/{course_id}"));
        assert!(paths.contains_key("/api/v1/progress/leaderboard"));
    }
}
