use actix_web::{
    cookie::{time::Duration, Cookie, SameSite},
    get, post, web, HttpRequest, HttpResponse,
};
use serde_json::json;

use crate::{
    app_state::AppState,
    auth::{extract_token, AuthenticatedUser, TOKEN_COOKIE},
    errors::AppError,
    models::{
        domain::User,
        dto::{
            request::{LoginRequest, SignupRequest},
            response::{AuthResponse, MessageResponse, UserDto},
        },
    },
};

fn token_cookie(token: &str, lifetime_hours: i64) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::hours(lifetime_hours))
        .finish()
}

fn auth_response(message: &str, user: &User, token: String) -> AuthResponse {
    AuthResponse {
        message: message.to_string(),
        user: UserDto::from(user),
        token,
    }
}

#[post("/auth/signup")]
pub async fn signup(
    state: web::Data<AppState>,
    request: web::Json<SignupRequest>,
) -> Result<HttpResponse, AppError> {
    let (user, token) = state.auth_service.signup(request.into_inner()).await?;
    let cookie = token_cookie(&token, state.auth_service.token_lifetime_hours());

    Ok(HttpResponse::Created()
        .cookie(cookie)
        .json(auth_response("User registered successfully", &user, token)))
}

#[post("/auth/login")]
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let (user, token) = state.auth_service.login(request.into_inner()).await?;
    let cookie = token_cookie(&token, state.auth_service.token_lifetime_hours());

    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(auth_response("Login successful", &user, token)))
}

#[post("/auth/logout")]
pub async fn logout(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let token = extract_token(&req);
    state.auth_service.logout(token.as_deref()).await?;

    let mut removal = Cookie::build(TOKEN_COOKIE, "").path("/").finish();
    removal.make_removal();

    Ok(HttpResponse::Ok()
        .cookie(removal)
        .json(MessageResponse::new("Logged out successfully")))
}

#[get("/auth/me")]
pub async fn me(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user = state.auth_service.current_user(&auth.0).await?;
    Ok(HttpResponse::Ok().json(json!({ "user": UserDto::from(&user) })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_cookie_attributes() {
        let cookie = token_cookie("abc", 2);

        assert_eq!(cookie.name(), TOKEN_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), Some(Duration::hours(2)));
    }
}
