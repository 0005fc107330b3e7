use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn},
    mail::{LogMailer, Mailer, SmtpMailer},
    payments::Gateways,
    shipping::{AramexProvider, ShippingProvider},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
    pub gateways: Arc<Gateways>,
    /// Carrier integration; `None` means the flat fee from site settings.
    pub shipping: Option<Arc<dyn ShippingProvider>>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(pool: DbPool, orm: OrmConn, config: AppConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(20))
            .build()?;

        let gateways = Gateways::from_config(&config, http.clone());
        let shipping: Option<Arc<dyn ShippingProvider>> = config
            .aramex
            .clone()
            .map(|c| Arc::new(AramexProvider::new(http, c)) as Arc<dyn ShippingProvider>);
        let mailer: Arc<dyn Mailer> = match &config.smtp {
            Some(smtp) => Arc::new(SmtpMailer::new(smtp)?),
            None => Arc::new(LogMailer),
        };

        Ok(Self {
            pool,
            orm,
            config: Arc::new(config),
            gateways: Arc::new(gateways),
            shipping,
            mailer,
        })
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
