use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub razorpay_key_id: Option<String>,
    pub razorpay_key_secret: Option<String>,
    pub razorpay_webhook_secret: Option<String>,
    /// When true, razorpay webhook deliveries without a valid signature are
    /// rejected before anything is persisted. Defaults to on iff a webhook
    /// secret is configured; the no-secret default is fail-open and
    /// intentionally explicit here rather than buried in the handler.
    pub require_webhook_signature: bool,
    pub gupshup_api_key: Option<String>,
    pub gupshup_base_url: Option<String>,
    pub gupshup_source: Option<String>,
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_whatsapp_number: Option<String>,
    pub meta_waba_token: Option<String>,
    pub meta_waba_phone_id: Option<String>,
}

#[derive(Debug)]
pub struct ConfigError {
    pub missing_vars: Vec<String>,
    pub invalid_vars: Vec<(String, String)>,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.missing_vars.is_empty() {
            writeln!(f, "Missing required environment variables:")?;
            for var in &self.missing_vars {
                writeln!(f, "  - {}", var)?;
            }
        }
        if !self.invalid_vars.is_empty() {
            writeln!(f, "Invalid environment variables:")?;
            for (var, err) in &self.invalid_vars {
                writeln!(f, "  - {}: {}", var, err)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ConfigError {}

fn get_required(name: &str, missing: &mut Vec<String>) -> Option<String> {
    match env::var(name) {
        Ok(v) if !v.is_empty() => Some(v),
        _ => {
            missing.push(name.to_string());
            None
        }
    }
}

fn get_optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let mut invalid = Vec::new();

        let database_url = get_required("DATABASE_URL", &mut missing);

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse::<u16>()
            .map_err(|e| {
                invalid.push(("PORT".into(), e.to_string()));
            })
            .unwrap_or(8080);

        let razorpay_webhook_secret = get_optional("RAZORPAY_WEBHOOK_SECRET");

        let require_webhook_signature = match env::var("WEBHOOK_REQUIRE_SIGNATURE") {
            Ok(v) => match v.parse::<bool>() {
                Ok(b) => b,
                Err(e) => {
                    invalid.push(("WEBHOOK_REQUIRE_SIGNATURE".into(), e.to_string()));
                    false
                }
            },
            Err(_) => razorpay_webhook_secret.is_some(),
        };

        if !missing.is_empty() || !invalid.is_empty() {
            return Err(ConfigError {
                missing_vars: missing,
                invalid_vars: invalid,
            });
        }

        Ok(Self {
            database_url: database_url.unwrap(),
            port,
            razorpay_key_id: get_optional("RAZORPAY_KEY_ID"),
            razorpay_key_secret: get_optional("RAZORPAY_KEY_SECRET"),
            razorpay_webhook_secret,
            require_webhook_signature,
            gupshup_api_key: get_optional("GUPSHUP_API_KEY"),
            gupshup_base_url: get_optional("GUPSHUP_BASE_URL"),
            gupshup_source: get_optional("GUPSHUP_SOURCE"),
            twilio_account_sid: get_optional("TWILIO_ACCOUNT_SID"),
            twilio_auth_token: get_optional("TWILIO_AUTH_TOKEN"),
            twilio_whatsapp_number: get_optional("TWILIO_WHATSAPP_NUMBER"),
            meta_waba_token: get_optional("META_WABA_TOKEN"),
            meta_waba_phone_id: get_optional("META_WABA_PHONE_ID"),
        })
    }
}
