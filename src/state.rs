use std::sync::Arc;
use std::time::Instant;

use crate::db::PracticeStore;
use crate::services::practice::PracticeService;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    practice: Arc<PracticeService>,
    jwt_secret: Option<Arc<str>>,
    database_backed: bool,
}

impl AppState {
    pub fn new(practice: PracticeService, jwt_secret: Option<String>, database_backed: bool) -> Self {
        Self {
            started_at: Instant::now(),
            practice: Arc::new(practice),
            jwt_secret: jwt_secret.map(Arc::from),
            database_backed,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn practice(&self) -> &PracticeService {
        &self.practice
    }

    pub fn store(&self) -> Arc<dyn PracticeStore> {
        self.practice.store()
    }

    pub fn jwt_secret(&self) -> Option<&str> {
        self.jwt_secret.as_deref()
    }

    /// Whether logs persist in Postgres rather than process memory.
    pub fn database_backed(&self) -> bool {
        self.database_backed
    }
}
