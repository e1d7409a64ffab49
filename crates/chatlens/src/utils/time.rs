use anyhow::{Result, anyhow, bail};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

const EPOCH_SECONDS_CUTOFF: i128 = 100_000_000_000;
const EPOCH_MILLIS_CUTOFF: i128 = 100_000_000_000_000;
const EPOCH_MICROS_CUTOFF: i128 = 100_000_000_000_000_000;

/// Parses a free-form chat-log timestamp.
///
/// Returns `Ok(None)` for empty input. Naive date-times are read as UTC;
/// timestamps carrying an offset keep it, so `hour()` reports the wall-clock
/// hour the log was written in.
pub fn parse_timestamp(raw: &str) -> Result<Option<OffsetDateTime>> {
    let candidate = raw.trim();
    if candidate.is_empty() {
        return Ok(None);
    }

    if candidate.bytes().all(|byte| byte.is_ascii_digit()) {
        let epoch_raw = candidate
            .parse::<i128>()
            .map_err(|_| anyhow!("epoch timestamp out of range: {candidate}"))?;
        return epoch_to_datetime(epoch_raw).map(Some);
    }

    let candidate = with_t_separator(candidate);

    if let Ok(parsed) = OffsetDateTime::parse(&candidate, &Rfc3339) {
        return Ok(Some(parsed));
    }

    if let Ok(parsed) = OffsetDateTime::parse(
        &candidate,
        format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]][offset_hour sign:mandatory][offset_minute]"
        ),
    ) {
        return Ok(Some(parsed));
    }

    if let Ok(parsed) = PrimitiveDateTime::parse(
        &candidate,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"),
    ) {
        return Ok(Some(parsed.assume_utc()));
    }

    if let Ok(parsed) = PrimitiveDateTime::parse(
        &candidate,
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    ) {
        return Ok(Some(parsed.assume_utc()));
    }

    if let Ok(parsed) = Date::parse(&candidate, format_description!("[year]-[month]-[day]")) {
        return Ok(Some(parsed.midnight().assume_utc()));
    }

    bail!("unsupported timestamp format: {candidate}");
}

fn with_t_separator(candidate: &str) -> String {
    if candidate.len() > 10 && candidate.as_bytes()[10] == b' ' {
        format!("{}T{}", &candidate[..10], candidate[11..].trim_start())
    } else {
        candidate.to_string()
    }
}

fn epoch_to_datetime(epoch_raw: i128) -> Result<OffsetDateTime> {
    let epoch_nanos = if epoch_raw < EPOCH_SECONDS_CUTOFF {
        epoch_raw.checked_mul(1_000_000_000)
    } else if epoch_raw < EPOCH_MILLIS_CUTOFF {
        epoch_raw.checked_mul(1_000_000)
    } else if epoch_raw < EPOCH_MICROS_CUTOFF {
        epoch_raw.checked_mul(1_000)
    } else {
        Some(epoch_raw)
    }
    .ok_or_else(|| anyhow!("epoch conversion overflow"))?;

    OffsetDateTime::from_unix_timestamp_nanos(epoch_nanos)
        .map_err(|error| anyhow!("epoch timestamp out of range: {error}"))
}
