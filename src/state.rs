use crate::config::Config;
use crate::database::Database;
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Config,
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
