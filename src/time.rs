use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};

use crate::i18n::Language;

/// Formats an epoch-millisecond timestamp in the language's home timezone.
pub fn format_ts_ms(ts_ms: i64, lang: Language) -> Result<String> {
    let tz: chrono_tz::Tz = lang
        .timezone()
        .parse()
        .map_err(|_| anyhow!("invalid tz: {}", lang.timezone()))?;
    let utc = DateTime::<Utc>::from_timestamp_millis(ts_ms).ok_or_else(|| anyhow!("timestamp out of range: {ts_ms}"))?;
    Ok(utc.with_timezone(&tz).format(lang.datetime_format()).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_in_language_timezone() {
        // 2024-01-02T03:04:00Z
        let ts = 1_704_164_640_000;
        assert_eq!(format_ts_ms(ts, Language::Ja).unwrap(), "2024/01/02 12:04");
        assert_eq!(format_ts_ms(ts, Language::ZhCn).unwrap(), "2024年01月02日 11:04");
        assert_eq!(format_ts_ms(ts, Language::En).unwrap(), "01/01/2024 10:04 PM");
    }
}
