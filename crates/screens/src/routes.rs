//! Named paths of the portal

use guard_portal_session::SessionStore;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Signup,
    ForgotPassword,
    /// Carries the token from the emailed reset link
    ResetPassword { token: String },
    GuardProfile,
    EntryPermission,
    ServiceEntry,
    Vehicles,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/security/login".to_string(),
            Route::Signup => "/security/signup".to_string(),
            Route::ForgotPassword => "/security/forgot-password".to_string(),
            Route::ResetPassword { token } => {
                format!("/reset-password/{}", urlencoding::encode(token))
            }
            Route::GuardProfile => "/guard-profile".to_string(),
            Route::EntryPermission => "/security/entry-permission".to_string(),
            Route::ServiceEntry => "/security/service-entry".to_string(),
            Route::Vehicles => "/security/vehicles".to_string(),
        }
    }

    /// Screens that need a session
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Route::GuardProfile | Route::EntryPermission | Route::ServiceEntry | Route::Vehicles
        )
    }

    /// Map a path to its route; unknown paths fall back to login
    pub fn parse(path: &str) -> Route {
        let path = path
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or_default();
        let path = path.trim_end_matches('/');

        match path {
            "/security/login" => Route::Login,
            "/security/signup" => Route::Signup,
            "/security/forgot-password" => Route::ForgotPassword,
            "/guard-profile" => Route::GuardProfile,
            "/security/entry-permission" => Route::EntryPermission,
            "/security/service-entry" => Route::ServiceEntry,
            "/security/vehicles" => Route::Vehicles,
            other => other
                .strip_prefix("/reset-password/")
                .filter(|raw| !raw.is_empty() && !raw.contains('/'))
                .and_then(|raw| urlencoding::decode(raw).ok())
                .map(|token| Route::ResetPassword {
                    token: token.into_owned(),
                })
                .unwrap_or(Route::Login),
        }
    }

    /// The route actually shown for `path`, given the current session
    pub fn resolve(path: &str, session: &SessionStore) -> Route {
        let route = Route::parse(path);
        if route.is_protected() && !session.is_authenticated() {
            log::debug!("{} requires a session, redirecting to login", route);
            return Route::Login;
        }
        route
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guard_portal_session::Session;

    #[test]
    fn test_parse_known_paths() {
        assert_eq!(Route::parse("/security/vehicles"), Route::Vehicles);
        assert_eq!(Route::parse("/guard-profile/"), Route::GuardProfile);
        assert_eq!(
            Route::parse("/security/entry-permission?tab=list"),
            Route::EntryPermission
        );
    }

    #[test]
    fn test_unknown_and_root_fall_back_to_login() {
        assert_eq!(Route::parse("/"), Route::Login);
        assert_eq!(Route::parse("/nope"), Route::Login);
        assert_eq!(Route::parse("/reset-password/"), Route::Login);
    }

    #[test]
    fn test_reset_token_round_trip() {
        let route = Route::ResetPassword {
            token: "abc def".to_string(),
        };
        assert_eq!(route.path(), "/reset-password/abc%20def");
        assert_eq!(Route::parse(&route.path()), route);
    }

    #[test]
    fn test_protected_routes_need_session() {
        let session = SessionStore::in_memory();
        assert_eq!(Route::resolve("/guard-profile", &session), Route::Login);
        assert_eq!(Route::resolve("/security/signup", &session), Route::Signup);

        session.set(Session::new("tok", "guard@example.com")).unwrap();
        assert_eq!(Route::resolve("/guard-profile", &session), Route::GuardProfile);
    }
}
