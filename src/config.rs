use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub public_base_url: String,
    pub currency: String,
    pub referral_rate_bps: i64,
    pub stripe: Option<StripeConfig>,
    pub razorpay: Option<RazorpayConfig>,
    pub paypal: Option<PaypalConfig>,
    pub paymob: Option<PaymobConfig>,
    pub myfatoorah: Option<MyFatoorahConfig>,
    pub aramex: Option<AramexConfig>,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,
}

#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: String,
}

#[derive(Debug, Clone)]
pub struct PaypalConfig {
    pub client_id: String,
    pub client_secret: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct PaymobConfig {
    pub api_key: String,
    pub integration_id: String,
    pub iframe_id: String,
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct MyFatoorahConfig {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct AramexConfig {
    pub username: String,
    pub password: String,
    pub account_number: String,
    pub account_pin: String,
    pub account_entity: String,
    pub account_country_code: String,
    pub version: String,
    pub source: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let jwt_ttl_hours = env::var("JWT_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(24);
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"));
        let currency = env::var("DEFAULT_CURRENCY").unwrap_or_else(|_| "usd".to_string());
        let referral_rate_bps = env::var("REFERRAL_RATE_BPS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(250);

        let stripe = match (var("STRIPE_SECRET_KEY"), var("STRIPE_WEBHOOK_SECRET")) {
            (Some(secret_key), Some(webhook_secret)) => Some(StripeConfig {
                secret_key,
                webhook_secret,
            }),
            _ => None,
        };

        let razorpay = match (var("RAZORPAY_KEY_ID"), var("RAZORPAY_KEY_SECRET")) {
            (Some(key_id), Some(key_secret)) => Some(RazorpayConfig { key_id, key_secret }),
            _ => None,
        };

        let paypal = match (var("PAYPAL_CLIENT_ID"), var("PAYPAL_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(PaypalConfig {
                client_id,
                client_secret,
                base_url: var("PAYPAL_BASE_URL")
                    .unwrap_or_else(|| "https://api-m.sandbox.paypal.com".to_string()),
            }),
            _ => None,
        };

        let paymob = match (
            var("PAYMOB_API_KEY"),
            var("PAYMOB_INTEGRATION_ID"),
            var("PAYMOB_IFRAME_ID"),
        ) {
            (Some(api_key), Some(integration_id), Some(iframe_id)) => Some(PaymobConfig {
                api_key,
                integration_id,
                iframe_id,
                currency: var("PAYMOB_CURRENCY").unwrap_or_else(|| "EGP".to_string()),
            }),
            _ => None,
        };

        let myfatoorah = var("MYFATOORAH_API_KEY").map(|api_key| MyFatoorahConfig {
            api_key,
            base_url: var("MYFATOORAH_BASE_URL")
                .unwrap_or_else(|| "https://apitest.myfatoorah.com/v2".to_string()),
        });

        let aramex = var("ARAMEX_USERNAME").map(|username| AramexConfig {
            username,
            password: var("ARAMEX_PASSWORD").unwrap_or_default(),
            account_number: var("ARAMEX_ACCOUNT_NUMBER").unwrap_or_default(),
            account_pin: var("ARAMEX_ACCOUNT_PIN").unwrap_or_default(),
            account_entity: var("ARAMEX_ACCOUNT_ENTITY").unwrap_or_default(),
            account_country_code: var("ARAMEX_ACCOUNT_COUNTRY_CODE").unwrap_or_default(),
            version: var("ARAMEX_VERSION").unwrap_or_else(|| "v1.0".to_string()),
            source: var("ARAMEX_SOURCE").unwrap_or_else(|| "24".to_string()),
            base_url: var("ARAMEX_BASE_URL")
                .unwrap_or_else(|| "https://ws.aramex.net/ShippingAPI.V2".to_string()),
        });

        let smtp = var("SMTP_HOST").map(|smtp_host| SmtpConfig {
            host: smtp_host,
            port: var("SMTP_PORT")
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(587),
            username: var("SMTP_USERNAME").unwrap_or_default(),
            password: var("SMTP_PASSWORD").unwrap_or_default(),
            from: var("MAIL_FROM").unwrap_or_else(|| "no-reply@localhost".to_string()),
        });

        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            jwt_ttl_hours,
            public_base_url,
            currency,
            referral_rate_bps,
            stripe,
            razorpay,
            paypal,
            paymob,
            myfatoorah,
            aramex,
            smtp,
        })
    }

    /// Configuration with every integration disabled, used by tests and tooling.
    pub fn local(database_url: &str, jwt_secret: &str) -> Self {
        Self {
            database_url: database_url.to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            jwt_secret: jwt_secret.to_string(),
            jwt_ttl_hours: 24,
            public_base_url: "http://localhost:3000".to_string(),
            currency: "usd".to_string(),
            referral_rate_bps: 250,
            stripe: None,
            razorpay: None,
            paypal: None,
            paymob: None,
            myfatoorah: None,
            aramex: None,
            smtp: None,
        }
    }
}

// Empty values count as unset.
fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
