//! Delay quantization onto the delay flap unit
//!
//! The delay unit carries a fixed set of flaps: one per bucket of the
//! ascending minutes table, one overflow flap and a few keyword flaps.
//!
//! | code                    | flap                       |
//! |-------------------------|----------------------------|
//! | `0`                     | blank                      |
//! | `1..=buckets`           | bucket `code - 1`          |
//! | `buckets + 1`           | overflow label (`">480"`)  |
//! | `buckets + 2 ..`        | keywords, in table order   |

use crate::error::SolariError;
use crate::types::DelayInput;
use serde::{Deserialize, Serialize};

/// Bucket table plus the overflow and keyword flaps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayQuantizer {
    /// Ascending delay values in minutes
    pub buckets: Vec<u32>,

    /// Text of the flap shown for delays above the last bucket
    pub overflow: String,

    /// Texts of the flaps following the overflow flap
    pub keywords: Vec<String>,
}

impl DelayQuantizer {
    /// Table of the 26-unit Solari panels
    pub fn solari() -> Self {
        Self {
            buckets: vec![
                5, 10, 15, 20, 25, 30, 35, 40, 45, 50, 55, 60, 70, 80, 90, 100, 110, 120, 130,
                140, 150, 160, 170, 180, 200, 220, 240, 260, 280, 300, 330, 360, 390, 420, 450,
                480,
            ],
            overflow: ">480".into(),
            keywords: vec!["VLAK NEJEDE".into(), "BUS".into()],
        }
    }

    /// Code of the overflow flap
    pub fn overflow_code(&self) -> u8 {
        (self.buckets.len() + 1) as u8
    }

    /// Highest code this table can produce
    pub fn max_code(&self) -> usize {
        self.buckets.len() + 1 + self.keywords.len()
    }

    /// Check the table is ascending and fits the unit's code space
    pub fn validate(&self) -> Result<(), SolariError> {
        if self.buckets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SolariError::InvalidProfile(
                "delay buckets must be strictly ascending".into(),
            ));
        }
        if self.max_code() >= crate::constants::UNKNOWN_POSITION as usize {
            return Err(SolariError::InvalidProfile(format!(
                "delay table needs {} codes, at most 254 fit a unit",
                self.max_code()
            )));
        }
        Ok(())
    }

    /// Encode a delay as written in content
    pub fn encode(&self, input: &DelayInput) -> Result<u8, SolariError> {
        match input {
            DelayInput::Minutes(minutes) => Ok(self.encode_minutes(*minutes)),
            DelayInput::Text(text) => self.encode_text(text.trim()),
        }
    }

    /// Encode a keyword, `"H:MM"` duration or digit string
    pub fn encode_text(&self, text: &str) -> Result<u8, SolariError> {
        let upper = text.to_uppercase();
        if upper == self.overflow.to_uppercase() {
            return Ok(self.overflow_code());
        }
        if let Some(index) = self
            .keywords
            .iter()
            .position(|keyword| keyword.to_uppercase() == upper)
        {
            return Ok(self.overflow_code() + 1 + index as u8);
        }

        let minutes = match text.split_once(':') {
            Some((hours, minutes)) => {
                let hours = parse_number(hours, text)?;
                let minutes = parse_number(minutes, text)?;
                hours
                    .checked_mul(60)
                    .and_then(|m| m.checked_add(minutes))
                    .ok_or_else(|| SolariError::content("delay", format!("'{text}' is too large")))?
            }
            None => parse_number(text, text)?,
        };
        Ok(self.encode_minutes(minutes))
    }

    /// Quantize minutes down to the nearest bucket
    pub fn encode_minutes(&self, minutes: u32) -> u8 {
        match self.buckets.last() {
            Some(&largest) if minutes > largest => self.overflow_code(),
            _ => self
                .buckets
                .iter()
                .rposition(|&bucket| bucket <= minutes)
                .map_or(0, |index| index as u8 + 1),
        }
    }

    /// Render the flap shown for `code`
    pub fn decode(&self, code: u8) -> String {
        let code = code as usize;
        let buckets = self.buckets.len();
        match code {
            0 => String::new(),
            c if c <= buckets => {
                let minutes = self.buckets[c - 1];
                format!("{}:{:02}", minutes / 60, minutes % 60)
            }
            c if c == buckets + 1 => self.overflow.clone(),
            c => self
                .keywords
                .get(c - buckets - 2)
                .cloned()
                .unwrap_or_default(),
        }
    }
}

fn parse_number(part: &str, whole: &str) -> Result<u32, SolariError> {
    let part = part.trim();
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SolariError::content(
            "delay",
            format!("'{whole}' is not minutes, H:MM or a known keyword"),
        ));
    }
    part.parse()
        .map_err(|_| SolariError::content("delay", format!("'{whole}' is too large")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_buckets() {
        let q = DelayQuantizer::solari();
        assert_eq!(q.encode_minutes(5), 1);
        assert_eq!(q.encode_minutes(60), 12);
        assert_eq!(q.encode_minutes(100), 16);
        assert_eq!(q.encode_minutes(480), 36);
    }

    #[test]
    fn test_every_bucket_decodes_to_its_duration() {
        let q = DelayQuantizer::solari();
        assert_eq!(q.buckets.len(), 36);
        for &minutes in &q.buckets {
            let code = q.encode_minutes(minutes);
            assert_eq!(
                q.decode(code),
                format!("{}:{:02}", minutes / 60, minutes % 60),
                "bucket {minutes}"
            );

            let text = format!("{}:{:02}", minutes / 60, minutes % 60);
            assert_eq!(q.encode_text(&text).unwrap(), code, "bucket {text}");
        }
    }

    #[test]
    fn test_rounds_down_between_buckets() {
        let q = DelayQuantizer::solari();
        assert_eq!(q.encode_minutes(7), 1);
        assert_eq!(q.encode_minutes(69), 12);
        assert_eq!(q.encode_minutes(479), 35);
    }

    #[test]
    fn test_below_first_bucket_is_unset() {
        let q = DelayQuantizer::solari();
        assert_eq!(q.encode_minutes(0), 0);
        assert_eq!(q.encode_minutes(4), 0);
    }

    #[test]
    fn test_overflow_and_keywords() {
        let q = DelayQuantizer::solari();
        assert_eq!(q.encode_minutes(481), 37);
        assert_eq!(q.encode_text(">480").unwrap(), 37);
        assert_eq!(q.encode_text("vlak nejede").unwrap(), 38);
        assert_eq!(q.encode_text("Bus").unwrap(), 39);
    }

    #[test]
    fn test_text_forms() {
        let q = DelayQuantizer::solari();
        assert_eq!(q.encode_text("1:10").unwrap(), 13);
        assert_eq!(q.encode_text("25").unwrap(), 5);
        assert_eq!(q.encode(&DelayInput::Minutes(30)).unwrap(), 6);
        assert!(q.encode_text("soon").is_err());
        assert!(q.encode_text("1:x").is_err());
        assert!(q.encode_text("-5").is_err());
    }

    #[test]
    fn test_decode() {
        let q = DelayQuantizer::solari();
        assert_eq!(q.decode(0), "");
        assert_eq!(q.decode(1), "0:05");
        assert_eq!(q.decode(13), "1:10");
        assert_eq!(q.decode(36), "8:00");
        assert_eq!(q.decode(37), ">480");
        assert_eq!(q.decode(39), "BUS");
        assert_eq!(q.decode(40), "");
        assert_eq!(q.decode(0xFF), "");
    }

    #[test]
    fn test_validate() {
        assert!(DelayQuantizer::solari().validate().is_ok());

        let mut q = DelayQuantizer::solari();
        q.buckets.swap(0, 1);
        assert!(q.validate().is_err());
    }
}
