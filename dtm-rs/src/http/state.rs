use std::sync::Arc;

use crate::config::Settings;
use crate::token::TokenIssuer;
use crate::users::UserStore;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub users: Arc<dyn UserStore>,
    pub tokens: TokenIssuer,
}

impl AppState {
    pub fn new(settings: Arc<Settings>, users: Arc<dyn UserStore>) -> Self {
        let tokens = TokenIssuer::new(&settings.secret_key, settings.access_token_expire_minutes);
        Self {
            settings,
            users,
            tokens,
        }
    }
}
