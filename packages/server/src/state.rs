use std::sync::Arc;

use crate::config::AppConfig;
use crate::images::ImageStorage;
use crate::repository::ProductRepository;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub products: Arc<dyn ProductRepository>,
    pub images: ImageStorage,
}
