//! Content codec: display content to unit codes and back

use crate::error::SolariError;
use crate::profile::Profile;
use crate::types::{Content, ContentExplanation, DelayInput, FlapUnits, TrainNumber};

/// Offset added to nonzero numeral codes of a highlighted train number
const HIGHLIGHT_OFFSET: u8 = 10;

/// Encodes [`Content`] into the unit layout of one installation
#[derive(Debug, Clone, Copy)]
pub struct ContentCodec<'a> {
    profile: &'a Profile,
}

impl<'a> ContentCodec<'a> {
    /// Create a codec for `profile`
    pub fn new(profile: &'a Profile) -> Self {
        Self { profile }
    }

    /// Encode content into one code per unit
    ///
    /// Absent fields become blank units. Every field is checked before the
    /// result is returned, so an error here means nothing may be sent.
    pub fn encode(&self, content: &Content) -> Result<FlapUnits, SolariError> {
        let profile = self.profile;
        let layout = &profile.layout;
        let mut units = vec![0u8; profile.unit_count];

        if let Some(name) = &content.train_type {
            let code = table_code(&profile.types, name, "type")?;
            put(&mut units, layout.train_type, "type", code)?;
        }

        let numerals = self.numerals(content.num.as_ref(), content.num_red)?;
        for (&offset, code) in layout.number.iter().zip(numerals) {
            put(&mut units, Some(offset), "num", code)?;
        }

        let destination = self.destination(content.destination.as_deref().unwrap_or(""))?;
        for (&offset, code) in layout.destination.iter().zip(destination) {
            put(&mut units, Some(offset), "final", code)?;
        }

        if let Some(name) = &content.direction1 {
            let code = table_code(&profile.directions1, name, "direction1")?;
            put(&mut units, layout.direction1, "direction1", code)?;
        }
        if let Some(name) = &content.direction2 {
            let code = table_code(&profile.directions2, name, "direction2")?;
            put(&mut units, layout.direction2, "direction2", code)?;
        }

        if let Some(time) = &content.time {
            let (hour, minute) = parse_time(time)?;
            put(&mut units, layout.hour, "time", hour + 1)?;
            put(&mut units, layout.minute_tens, "time", minute / 10 + 1)?;
            put(&mut units, layout.minute_ones, "time", minute % 10 + 1)?;
        }

        match &content.delay {
            None => {}
            Some(DelayInput::Text(text)) if text.trim().is_empty() => {}
            Some(delay) => {
                let code = profile.delays.encode(delay)?;
                put(&mut units, layout.delay, "delay", code)?;
            }
        }

        Ok(FlapUnits::new(units))
    }

    /// Render a unit snapshot for humans
    ///
    /// Numerals read as `(code - 1) mod 10` with code 0 read as 1, so a blank
    /// number shows as 0. Absent fields cannot be told from blank ones.
    pub fn decode(&self, units: &[u8]) -> ContentExplanation {
        let profile = self.profile;
        let layout = &profile.layout;
        let at = |offset: Option<usize>| {
            offset
                .and_then(|o| units.get(o))
                .copied()
                .unwrap_or(0)
        };

        let numerals: Vec<u8> = layout.number.iter().map(|&o| at(Some(o))).collect();
        let num = numerals.iter().fold(0u32, |acc, &code| {
            let digit = (code.max(1) - 1) % 10;
            acc.saturating_mul(10).saturating_add(u32::from(digit))
        });

        let destination = layout
            .destination
            .iter()
            .map(|&o| profile.symbol(at(Some(o))).unwrap_or('?'))
            .collect();

        let (hour, tens, ones) = (at(layout.hour), at(layout.minute_tens), at(layout.minute_ones));
        let time = if hour != 0 && tens != 0 && ones != 0 {
            format!("{}:{}{}", hour - 1, tens - 1, ones - 1)
        } else {
            String::new()
        };

        ContentExplanation {
            train_type: table_name(&profile.types, at(layout.train_type)),
            num,
            num_red: numerals.iter().any(|&code| code > HIGHLIGHT_OFFSET),
            destination,
            direction1: table_name(&profile.directions1, at(layout.direction1)),
            direction2: table_name(&profile.directions2, at(layout.direction2)),
            time,
            delay: profile.delays.decode(at(layout.delay)),
        }
    }

    fn numerals(
        &self,
        num: Option<&TrainNumber>,
        highlighted: bool,
    ) -> Result<Vec<u8>, SolariError> {
        let width = self.profile.layout.number.len();
        let digits = match num {
            None | Some(TrainNumber::Number(0)) => String::new(),
            Some(TrainNumber::Number(n)) => n.to_string(),
            Some(TrainNumber::Text(text)) => text.trim().to_owned(),
        };

        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SolariError::content("num", format!("'{digits}' is not a number")));
        }
        if digits.len() > width {
            return Err(SolariError::content(
                "num",
                format!("'{digits}' has more than {width} digits"),
            ));
        }

        let mut codes = vec![0u8; width - digits.len()];
        codes.extend(digits.bytes().map(|b| {
            let code = b - b'0' + 1;
            if highlighted {
                code + HIGHLIGHT_OFFSET
            } else {
                code
            }
        }));
        Ok(codes)
    }

    fn destination(&self, text: &str) -> Result<Vec<u8>, SolariError> {
        let width = self.profile.layout.destination.len();
        let folded: Vec<char> = text.chars().flat_map(char::to_lowercase).collect();
        if folded.len() > width {
            return Err(SolariError::content(
                "final",
                format!("'{text}' is longer than {width} characters"),
            ));
        }

        folded
            .into_iter()
            .chain(std::iter::repeat(' '))
            .take(width)
            .map(|c| {
                self.profile.symbol_code(c).ok_or_else(|| {
                    SolariError::content("final", format!("character '{c}' has no flap"))
                })
            })
            .collect()
    }
}

fn put(
    units: &mut [u8],
    offset: Option<usize>,
    field: &'static str,
    code: u8,
) -> Result<(), SolariError> {
    let offset = offset.ok_or_else(|| SolariError::content(field, "panel has no unit for it"))?;
    let unit = units.get_mut(offset).ok_or_else(|| {
        SolariError::InvalidProfile(format!("{field} unit {offset} outside the panel"))
    })?;
    *unit = code;
    Ok(())
}

fn table_code(table: &[String], name: &str, field: &'static str) -> Result<u8, SolariError> {
    table
        .iter()
        .position(|entry| entry == name)
        .map(|index| index as u8 + 1)
        .ok_or_else(|| SolariError::content(field, format!("'{name}' has no flap")))
}

fn table_name(table: &[String], code: u8) -> String {
    match code {
        0 => String::new(),
        code => table
            .get(code as usize - 1)
            .cloned()
            .unwrap_or_else(|| "?".into()),
    }
}

fn parse_time(time: &str) -> Result<(u8, u8), SolariError> {
    let invalid = || SolariError::content("time", format!("'{time}' is not a valid H:MM time"));
    let (hour, minute) = time.trim().split_once(':').ok_or_else(invalid)?;
    let hour: u8 = hour.parse().map_err(|_| invalid())?;
    let minute: u8 = minute.parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok((hour, minute))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(content: &Content) -> Result<FlapUnits, SolariError> {
        ContentCodec::new(&Profile::solari_26()).encode(content)
    }

    #[test]
    fn test_empty_content_is_blank() {
        let units = encode(&Content::default()).unwrap();
        assert_eq!(units, FlapUnits::blank(26));
    }

    #[test]
    fn test_train_number_padding() {
        let content = Content {
            num: Some(42.into()),
            ..Default::default()
        };
        let units = encode(&content).unwrap();
        assert_eq!(&units[1..6], &[0, 0, 0, 5, 3]);
    }

    #[test]
    fn test_highlighted_number_keeps_blanks() {
        let content = Content {
            num: Some("905".into()),
            num_red: true,
            ..Default::default()
        };
        let units = encode(&content).unwrap();
        assert_eq!(&units[1..6], &[0, 0, 20, 11, 16]);
    }

    #[test]
    fn test_time_and_directions() {
        let content = Content {
            direction1: Some("Vranovice".into()),
            direction2: Some("S3".into()),
            time: Some("7:45".into()),
            delay: Some("0:20".into()),
            ..Default::default()
        };
        let units = encode(&content).unwrap();
        assert_eq!(units[12], 53);
        assert_eq!(units[13], 48);
        assert_eq!((units[14], units[15], units[24]), (8, 5, 6));
        assert_eq!(units[25], 4);
    }

    #[test]
    fn test_rejects_unknown_vocabulary() {
        let bad_type = Content {
            train_type: Some("Hyperloop".into()),
            ..Default::default()
        };
        assert!(matches!(
            encode(&bad_type),
            Err(SolariError::InvalidContentField { field: "type", .. })
        ));

        let bad_char = Content {
            destination: Some("Köln!".into()),
            ..Default::default()
        };
        assert!(matches!(
            encode(&bad_char),
            Err(SolariError::InvalidContentField { field: "final", .. })
        ));
    }

    #[test]
    fn test_rejects_out_of_range_fields() {
        let long = Content {
            destination: Some("Praha hlavní nádraží".into()),
            ..Default::default()
        };
        assert!(encode(&long).is_err());

        let big = Content {
            num: Some(123456.into()),
            ..Default::default()
        };
        assert!(encode(&big).is_err());

        let late = Content {
            time: Some("24:00".into()),
            ..Default::default()
        };
        assert!(encode(&late).is_err());
    }

    #[test]
    fn test_empty_delay_text_is_absent() {
        let content = Content {
            delay: Some("".into()),
            ..Default::default()
        };
        assert_eq!(encode(&content).unwrap()[25], 0);
    }

    #[test]
    fn test_decode_blank_number_reads_zero() {
        let profile = Profile::solari_26();
        let explained = ContentCodec::new(&profile).decode(&[0u8; 26]);
        assert_eq!(explained.num, 0);
        assert!(!explained.num_red);
        assert_eq!(explained.train_type, "");
        assert_eq!(explained.destination, " ".repeat(14));
        assert_eq!(explained.time, "");
    }

    #[test]
    fn test_decode_highlighted_number_and_time() {
        let profile = Profile::solari_26();
        let mut units = vec![0u8; 26];
        units[1..6].copy_from_slice(&[0, 0, 20, 11, 16]);
        units[14] = 8;
        units[15] = 5;
        units[24] = 6;
        units[0] = 200;

        let explained = ContentCodec::new(&profile).decode(&units);
        assert_eq!(explained.num, 905);
        assert!(explained.num_red);
        assert_eq!(explained.time, "7:45");
        assert_eq!(explained.train_type, "?");
    }
}
