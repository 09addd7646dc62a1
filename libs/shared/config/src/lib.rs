use std::env;

use chrono::{FixedOffset, Offset, Utc};
use tracing::warn;

const DEFAULT_UTC_OFFSET: &str = "+08:00";
const DEFAULT_OPENING_HOUR: u32 = 8;
const DEFAULT_CLOSING_HOUR: u32 = 20;
const DEFAULT_SLOT_STEP_MINUTES: i64 = 30;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
    pub jwt_secret: String,
    pub clinic_utc_offset: FixedOffset,
    pub clinic_opening_hour: u32,
    pub clinic_closing_hour: u32,
    pub slot_step_minutes: i64,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let string_or_empty = |key: &str| {
            lookup(key).unwrap_or_else(|| {
                warn!("{} not set, using empty value", key);
                String::new()
            })
        };

        let clinic_utc_offset = lookup("CLINIC_UTC_OFFSET")
            .and_then(|raw| {
                let parsed = parse_utc_offset(&raw);
                if parsed.is_none() {
                    warn!("CLINIC_UTC_OFFSET '{}' is not a valid offset, using {}", raw, DEFAULT_UTC_OFFSET);
                }
                parsed
            })
            .or_else(|| parse_utc_offset(DEFAULT_UTC_OFFSET))
            .unwrap_or_else(|| Utc.fix());

        let clinic_opening_hour = parse_or_default(&lookup, "CLINIC_OPENING_HOUR", DEFAULT_OPENING_HOUR);
        let clinic_closing_hour = parse_or_default(&lookup, "CLINIC_CLOSING_HOUR", DEFAULT_CLOSING_HOUR);
        let (clinic_opening_hour, clinic_closing_hour) =
            if clinic_opening_hour < clinic_closing_hour && clinic_closing_hour <= 24 {
                (clinic_opening_hour, clinic_closing_hour)
            } else {
                warn!(
                    "Clinic hours {}-{} are invalid, using {}-{}",
                    clinic_opening_hour, clinic_closing_hour, DEFAULT_OPENING_HOUR, DEFAULT_CLOSING_HOUR
                );
                (DEFAULT_OPENING_HOUR, DEFAULT_CLOSING_HOUR)
            };

        let slot_step_minutes = match parse_or_default(&lookup, "SLOT_STEP_MINUTES", DEFAULT_SLOT_STEP_MINUTES) {
            step if step > 0 => step,
            step => {
                warn!("SLOT_STEP_MINUTES {} must be positive, using {}", step, DEFAULT_SLOT_STEP_MINUTES);
                DEFAULT_SLOT_STEP_MINUTES
            }
        };

        let config = Self {
            supabase_url: string_or_empty("SUPABASE_URL"),
            supabase_anon_key: string_or_empty("SUPABASE_ANON_PUBLIC_KEY"),
            supabase_service_role_key: string_or_empty("SUPABASE_SERVICE_ROLE_KEY"),
            jwt_secret: string_or_empty("JWT_SECRET"),
            clinic_utc_offset,
            clinic_opening_hour,
            clinic_closing_hour,
            slot_step_minutes,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.jwt_secret.is_empty()
    }

    pub fn is_supabase_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_service_role_key.is_empty()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            supabase_service_role_key: String::new(),
            jwt_secret: String::new(),
            clinic_utc_offset: parse_utc_offset(DEFAULT_UTC_OFFSET)
                .unwrap_or_else(|| Utc.fix()),
            clinic_opening_hour: DEFAULT_OPENING_HOUR,
            clinic_closing_hour: DEFAULT_CLOSING_HOUR,
            slot_step_minutes: DEFAULT_SLOT_STEP_MINUTES,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} '{}' is not valid, using default {}", key, raw, default);
            default
        }),
        None => default,
    }
}

/// Parse `+HH:MM`, `-HH:MM`, `+HH` or `Z` into a fixed offset.
pub fn parse_utc_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };

    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h.parse::<i32>().ok()?, m.parse::<i32>().ok()?),
        None => (rest.parse::<i32>().ok()?, 0),
    };

    if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
