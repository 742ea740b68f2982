use super::dashboard::DashboardState;
use super::session::Session;

/// Screen currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    Login,
    /// Protected; only reachable with a session token.
    #[default]
    Dashboard,
}

#[derive(Debug, Clone, Default)]
pub struct LoginStatus {
    /// A login request is in flight.
    pub pending: bool,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct AppState {
    pub route: Route,
    pub session: Session,
    pub login: LoginStatus,
    pub dashboard: DashboardState,
}

impl AppState {
    pub fn with_session(session: Session) -> Self {
        Self {
            session,
            ..Default::default()
        }
    }

    /// Session gate: resolves the route to show, sending the user to the
    /// login screen when the dashboard is requested without a token.
    pub fn gate(&mut self) -> Route {
        if self.route == Route::Dashboard && !self.session.is_authenticated() {
            self.route = Route::Login;
        }
        self.route
    }

    pub fn navigate(&mut self, route: Route) {
        self.route = route;
    }

    pub fn logout(&mut self) {
        self.session.sign_out();
        self.login = LoginStatus::default();
        self.route = Route::Login;
    }
}
