use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serializer};

/// Dates leave the API as `DD.MM.YYYY`.
pub const DISPLAY_FORMAT: &str = "%d.%m.%Y";
const INPUT_FORMATS: [&str; 2] = ["%d.%m.%Y", "%Y-%m-%d"];

/// Accepts `DD.MM.YYYY` or ISO `YYYY-MM-DD`.
pub fn parse(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .ok_or_else(|| format!("Invalid date '{s}', expected DD.MM.YYYY or YYYY-MM-DD"))
}

pub fn format(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(*date))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse(&s).map_err(serde::de::Error::custom)
}

/// Same representation for nullable dates.
pub mod option {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.serialize_str(&super::format(*d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let s: Option<String> = Option::deserialize(deserializer)?;
        match s.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => super::parse(s).map(Some).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Row {
        #[serde(with = "crate::dates")]
        day: NaiveDate,
        #[serde(with = "crate::dates::option", default)]
        maybe: Option<NaiveDate>,
    }

    #[test]
    fn accepts_both_input_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(parse("07.03.2024").unwrap(), expected);
        assert_eq!(parse("2024-03-07").unwrap(), expected);
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse("2024/03/07").is_err());
        assert!(parse("31.02.2024").is_err());
        assert!(parse("").is_err());
    }

    #[test]
    fn serializes_display_format() {
        let row = Row {
            day: NaiveDate::from_ymd_opt(1990, 12, 1).unwrap(),
            maybe: None,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["day"], "01.12.1990");
        assert!(json["maybe"].is_null());
    }

    #[test]
    fn optional_date_treats_empty_string_as_none() {
        let row: Row = serde_json::from_str(r#"{"day":"2020-01-01","maybe":""}"#).unwrap();
        assert_eq!(row.maybe, None);
        let row: Row = serde_json::from_str(r#"{"day":"2020-01-01"}"#).unwrap();
        assert_eq!(row.maybe, None);
    }
}
