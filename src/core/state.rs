use std::sync::Arc;

use crate::snapshot::OwnerSnapshots;
use crate::token::manager::TokenManager;
use crate::utils::cookies::CookiePolicy;

#[derive(Clone, Debug)]
pub(crate) struct AppState {
    pub(crate) manager: Arc<TokenManager>,
    pub(crate) snapshots: Arc<OwnerSnapshots>,
    pub(crate) cookies: CookiePolicy,
    pub(crate) home: String,
    pub(crate) admin_key: Option<String>,
}

impl AppState {
    pub(crate) fn new(
        manager: TokenManager,
        cookies: CookiePolicy,
        home: String,
        admin_key: Option<String>,
    ) -> Self {
        let manager = Arc::new(manager);

        AppState {
            snapshots: Arc::new(OwnerSnapshots::new(manager.clone())),
            manager,
            cookies,
            home,
            admin_key: admin_key.filter(|key| !key.is_empty()),
        }
    }
}
