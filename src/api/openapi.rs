use super::handlers::{auth, health, user};
use utoipa::openapi::{InfoBuilder, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Reuse the same router wiring and only return the generated OpenAPI spec.
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Build the router that also drives the `OpenAPI` document.
///
/// Add new endpoints here via `.routes(routes!(...))` so they are both served
/// and included in the generated `OpenAPI` spec.
/// Routes added outside (like `/`) are intentionally not documented.
pub(crate) fn api_router() -> OpenApiRouter {
    // `routes!` reads #[utoipa::path] to bind HTTP method + path and add the route to OpenAPI.
    let mut router = OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::health))
        .routes(routes!(auth::register::register))
        .routes(routes!(auth::login::login))
        .routes(routes!(auth::session::logout))
        .routes(routes!(auth::session::is_auth))
        .routes(routes!(auth::verification::send_verification))
        .routes(routes!(auth::verification::verify_email))
        .routes(routes!(auth::reset::send_password_reset))
        .routes(routes!(auth::reset::reset_password))
        .routes(routes!(auth::federated::google_sign_in))
        .routes(routes!(user::user_data));

    let mut auth_tag = Tag::new("auth");
    auth_tag.description =
        Some("Registration, login, email verification and password reset".to_string());

    let mut user_tag = Tag::new("user");
    user_tag.description = Some("Authenticated account profile".to_string());

    router.get_openapi_mut().tags = Some(vec![auth_tag, user_tag]);

    router
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    // Use Cargo.toml metadata instead of the utoipa-axum crate info defaults.
    let info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(Some(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    OpenApiBuilder::new().info(info).build()
}

#[cfg(test)]
mod tests {
    use super::openapi;

    #[test]
    fn openapi_uses_cargo_metadata() {
        let spec = openapi();
        assert_eq!(spec.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(spec.info.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn openapi_documents_auth_routes() {
        let spec = openapi();
        let paths = &spec.paths.paths;
        assert!(paths.contains_key("/v1/auth/register"));
        assert!(paths.contains_key("/v1/auth/login"));
        assert!(paths.contains_key("/v1/auth/verify-email"));
        assert!(paths.contains_key("/v1/auth/reset-password"));
        assert!(paths.contains_key("/v1/auth/google"));
        assert!(paths.contains_key("/v1/user/data"));
    }
}
