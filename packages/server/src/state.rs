use std::sync::Arc;

use crate::config::AppConfig;
use crate::lifecycle::ContentManager;
use crate::mailer::Mailer;
use crate::store::{CategoryStore, RecordStore};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub records: Arc<dyn RecordStore>,
    pub categories: Arc<dyn CategoryStore>,
    pub manager: ContentManager,
    pub mailer: Mailer,
}
