use std::sync::Arc;

use glimpse_service::GlimpseService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<GlimpseService>,
}
impl AppState {
	pub async fn new(config: glimpse_config::Config) -> color_eyre::Result<Self> {
		let service = GlimpseService::connect(config).await?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: GlimpseService) -> Self {
		Self { service: Arc::new(service) }
	}
}
