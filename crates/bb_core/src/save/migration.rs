use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use super::error::SaveError;
use super::format::SCHEMA_VERSION;
use crate::rng::Seed;

/// Upgrade a header (as JSON) to the current schema.
///
/// Headers carry their version in `schema_version`; a missing field means
/// version 0. Headers from a newer build are rejected.
pub fn migrate_header(header: Value) -> Result<Value, SaveError> {
    let found = match header.get("schema_version") {
        None | Some(Value::Null) => 0,
        Some(raw) => raw.as_u64().and_then(|v| u32::try_from(v).ok()).ok_or_else(|| {
            SaveError::MalformedImport(format!("schema_version {} is out of range", raw))
        })?,
    };

    let migrated = match found {
        0 => migrate_v0_to_v1(header)?,
        SCHEMA_VERSION => header,
        v => {
            warn!("Rejecting header from future schema {} (current: {})", v, SCHEMA_VERSION);
            return Err(SaveError::UnsupportedVersion { found: v, supported: SCHEMA_VERSION });
        }
    };

    if found != SCHEMA_VERSION {
        info!("Migrated save header from schema {} to {}", found, SCHEMA_VERSION);
    }
    Ok(migrated)
}

/// v0 headers were flat: `{seed, away, home, manager?, created?, token?}`
/// with the seed in whatever case it was typed and no strategies.
fn migrate_v0_to_v1(header: Value) -> Result<Value, SaveError> {
    let field = |name: &str| {
        header
            .get(name)
            .cloned()
            .ok_or_else(|| SaveError::MalformedImport(format!("v0 header is missing '{}'", name)))
    };

    let seed_text = field("seed")?;
    let seed = seed_text
        .as_str()
        .ok_or_else(|| SaveError::MalformedImport("v0 seed is not text".to_string()))
        .and_then(|s| Seed::parse(s).map_err(|e| SaveError::MalformedImport(e.to_string())))?;

    let manager = match header.get("manager").and_then(Value::as_str) {
        Some(team) => json!({ "team": team }),
        None => Value::Null,
    };

    let created_at = header
        .get("created")
        .and_then(Value::as_i64)
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .unwrap_or_else(Utc::now);

    let session_token = header
        .get("token")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    Ok(json!({
        "schema_version": 1,
        "session_token": session_token,
        "seed": seed.to_string(),
        "setup": {
            "away": field("away")?,
            "home": field("home")?,
            "away_strategy": "balanced",
            "home_strategy": "balanced",
            "manager": manager,
        },
        "created_at": created_at,
    }))
}
