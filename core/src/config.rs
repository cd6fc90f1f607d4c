//! Process configuration, loaded once at startup from the environment.
//!
//! | Variable                            | Default         |
//! |--------------------------------------|-----------------|
//! | `DATABASE_URL`                       | (required)      |
//! | `BIND_ADDR`                          | `0.0.0.0:3000`  |
//! | `SESSION_TTL_HOURS`                  | `4`             |
//! | `TAX_RATE`                           | `0.16`          |
//! | `PRICE_DISPLAY_MODE`                 | `tax_excluded`  |
//! | `CLOSED_SESSIONS_HISTORY_HOURS`      | `24`            |
//! | `STORE_CANCEL_REASON`                | `true`          |
//! | `ASSIGNMENT_AUTO_ON_ACCEPT_DEFAULT`  | `true`          |
//! | `PII_MASTER_KEY`                     | (required, base64 32 bytes) |

use rust_decimal::Decimal;
use shared::pii::PiiKey;
use std::str::FromStr;
use std::time::Duration;

/// Tax display mode: whether the quoted unit price already contains tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceDisplayMode {
    TaxIncluded,
    TaxExcluded,
}

impl FromStr for PriceDisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tax_included" => Ok(Self::TaxIncluded),
            "tax_excluded" => Ok(Self::TaxExcluded),
            other => Err(format!("invalid PRICE_DISPLAY_MODE: {other}")),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,

    pub session_ttl: Duration,
    pub tax_rate: Decimal,
    pub price_display_mode: PriceDisplayMode,
    pub closed_sessions_history: Duration,
    pub store_cancel_reason: bool,
    pub assignment_auto_on_accept_default: bool,

    /// Master key for PII envelope encryption. Not `Debug`/`Clone`-leaked;
    /// callers obtain the key once at startup and pass it explicitly.
    pub pii_key: PiiKey,
}

impl Config {
    /// Load configuration from the environment. Panics on malformed (not
    /// missing) values — a bad config should fail fast at startup rather
    /// than silently fall back to a default.
    pub fn from_env() -> Self {
        let pii_master_key =
            std::env::var("PII_MASTER_KEY").expect("PII_MASTER_KEY must be set");

        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into()),

            session_ttl: Duration::from_secs(
                env_parse("SESSION_TTL_HOURS", 4u64) * 3600,
            ),
            tax_rate: env_parse("TAX_RATE", Decimal::new(16, 2)),
            price_display_mode: std::env::var("PRICE_DISPLAY_MODE")
                .ok()
                .map(|v| v.parse().expect("invalid PRICE_DISPLAY_MODE"))
                .unwrap_or(PriceDisplayMode::TaxExcluded),
            closed_sessions_history: Duration::from_secs(
                env_parse("CLOSED_SESSIONS_HISTORY_HOURS", 24u64) * 3600,
            ),
            store_cancel_reason: env_parse("STORE_CANCEL_REASON", true),
            assignment_auto_on_accept_default: env_parse(
                "ASSIGNMENT_AUTO_ON_ACCEPT_DEFAULT",
                true,
            ),

            pii_key: PiiKey::from_base64(&pii_master_key).expect("invalid PII_MASTER_KEY"),
        }
    }
}

fn env_parse<T>(name: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
