use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::domain::{InvestmentId, InvestorId};

/// Wire shape of a single investment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub investment_id: InvestmentId,
    pub investment_name: String,
    pub initial_investment_amount: f64,
    #[serde(deserialize_with = "deserialize_start_date")]
    pub investment_start_date: DateTime<Utc>,
    pub current_value: f64,
    pub investor_id: InvestorId,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date '{0}'")]
pub struct InvalidDate(pub String);

/// Parses the date formats the backend and form inputs produce: RFC 3339,
/// a zone-less `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC) or a bare
/// `YYYY-MM-DD` (UTC midnight).
pub fn parse_start_date(raw: &str) -> Result<DateTime<Utc>, InvalidDate> {
    let trimmed = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }

    Err(InvalidDate(raw.to_string()))
}

fn deserialize_start_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_start_date(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn sample() -> Investment {
        Investment {
            investment_id: InvestmentId(1),
            investment_name: "Investment 1".to_string(),
            initial_investment_amount: 1000.0,
            investment_start_date: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            current_value: 1500.0,
            investor_id: InvestorId(1),
        }
    }

    #[test]
    fn serializes_with_camel_case_field_names() {
        let value = serde_json::to_value(sample()).expect("serialize");
        assert_eq!(value["investmentId"], json!(1));
        assert_eq!(value["investmentName"], json!("Investment 1"));
        assert_eq!(value["initialInvestmentAmount"], json!(1000.0));
        assert_eq!(value["investmentStartDate"], json!("2023-01-01T00:00:00Z"));
        assert_eq!(value["currentValue"], json!(1500.0));
        assert_eq!(value["investorId"], json!(1));
    }

    #[test]
    fn accepts_bare_and_zone_less_dates_from_backend() {
        for date in [
            "2023-01-01",
            "2023-01-01T00:00",
            "2023-01-01T00:00:00",
            "2023-01-01T00:00:00.000Z",
        ] {
            let parsed: Investment = serde_json::from_value(json!({
                "investmentId": 1,
                "investmentName": "Investment 1",
                "initialInvestmentAmount": 1000,
                "investmentStartDate": date,
                "currentValue": 1500,
                "investorId": 1
            }))
            .expect("deserialize");
            assert_eq!(parsed, sample(), "date format {date}");
        }
    }

    #[test]
    fn rejects_garbage_dates() {
        assert_eq!(
            parse_start_date("not a date"),
            Err(InvalidDate("not a date".to_string()))
        );
        assert!(parse_start_date("2023-13-40").is_err());
    }
}
