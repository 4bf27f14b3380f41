//! Installation profiles: unit count, field layout and vocabulary
//!
//! Panels differ between installations in the number of flap units, in which
//! unit shows which field and in the flaps mounted on each unit. A profile
//! captures all of that so one codec serves every panel.

use crate::constants::{MAX_PAYLOAD_SIZE, UNKNOWN_POSITION};
use crate::delay::DelayQuantizer;
use crate::error::SolariError;
use serde::{Deserialize, Serialize};

/// Unit offsets of each content field
///
/// Single-unit fields are optional so smaller panels can leave them out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLayout {
    /// Train type unit
    pub train_type: Option<usize>,

    /// Numeral units of the train number, most significant first
    pub number: Vec<usize>,

    /// Unit showing each destination character, in text order
    pub destination: Vec<usize>,

    /// First direction unit
    pub direction1: Option<usize>,

    /// Second direction unit
    pub direction2: Option<usize>,

    /// Hour unit
    pub hour: Option<usize>,

    /// Tens-of-minutes unit
    pub minute_tens: Option<usize>,

    /// Ones-of-minutes unit
    pub minute_ones: Option<usize>,

    /// Delay unit
    pub delay: Option<usize>,
}

impl FieldLayout {
    /// Layout of the 26-unit Solari panels
    ///
    /// Destination characters 0-1 sit on units 6-7, characters 2-9 on units
    /// 16-23 and characters 10-13 on units 8-11.
    pub fn solari_26() -> Self {
        let destination = [6, 7]
            .into_iter()
            .chain(16..24)
            .chain(8..12)
            .collect();
        Self {
            train_type: Some(0),
            number: (1..6).collect(),
            destination,
            direction1: Some(12),
            direction2: Some(13),
            hour: Some(14),
            minute_tens: Some(15),
            minute_ones: Some(24),
            delay: Some(25),
        }
    }

    fn offsets(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        let singles = [
            ("type", self.train_type),
            ("direction1", self.direction1),
            ("direction2", self.direction2),
            ("hour", self.hour),
            ("minute_tens", self.minute_tens),
            ("minute_ones", self.minute_ones),
            ("delay", self.delay),
        ];
        singles
            .into_iter()
            .filter_map(|(name, offset)| offset.map(|o| (name, o)))
            .chain(self.number.iter().map(|&o| ("number", o)))
            .chain(self.destination.iter().map(|&o| ("destination", o)))
    }
}

/// Everything installation-specific about a panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Free-form installation name
    pub name: String,

    /// Number of flap units per side
    pub unit_count: usize,

    /// Which unit shows which field
    pub layout: FieldLayout,

    /// Destination flaps in unit order; a character's code is its index
    pub alphabet: String,

    /// Train type flaps; code is index + 1
    pub types: Vec<String>,

    /// First direction flaps; code is index + 1
    pub directions1: Vec<String>,

    /// Second direction flaps; code is index + 1
    pub directions2: Vec<String>,

    /// Delay flaps
    pub delays: DelayQuantizer,
}

impl Default for Profile {
    fn default() -> Self {
        Self::solari_26()
    }
}

impl Profile {
    /// Built-in profile of the 26-unit platform panels
    pub fn solari_26() -> Self {
        Self {
            name: "solari-26".into(),
            unit_count: 26,
            layout: FieldLayout::solari_26(),
            alphabet: " 0123456789aáäbcčdďeéěfghiíjklmnňoóöpqrřsštťuúůüvwxyýzž/.()".into(),
            types: strings(&[
                "Ec", "Ic", "Ex R", "Ex lůžkový", "Ex", "R R", "R lůžkový", "R", "Sp", "Os",
                "Mim. Ex", "Mim. R", "Mim. Sp", "Mim. Os", "Zvláštní vlak", "Special train",
                "Parní vlak", "Steam train", "IR", "ICE", "Sc", "TGV", "", "Ic bílá", "Sp",
            ]),
            directions1: strings(&[
                "Adamov", "Adamov-Blansko", "Bylnice", "Blansko", "Blažovice", "Bohumín",
                "Břeclav", "Břeclav-Kúty", "Břeclav-Bratislava", "Bučovice", "Bzenec",
                "Česká Třebová", "Č.Třebová-Pardubice", "Havlíčkův Brod", "Holubice",
                "Horní Cerekev", "Hradec Králové", "Jihlava", "Jihlava-Horní Cerekev",
                "Kolín", "Kojetín", "Kroměříž", "Křižanov", "Kunovice", "Kuřim",
                "Kuřim-Tišnov", "Kyjov", "Modřice", "Moravské Bránice", "Moravský Krumlov",
                "Náměšť nad Oslavou", "Nezamyslice", "Olomouc hl.n.", "Olomouc-Uničov",
                "Ostrava hl.n.", "Ostrava-Vítkovice", "Pardubice hl.n.", "Praha-Holešovice",
                "Přerov", "Přerov-Bohumín", "Prostějov hl.n.", "Prostějov-Olomouc",
                "Rajhrad", "Rousínov", "Šakvice", "Skalice nad Svitavou", "Sokolnice-Teln.",
                "Střelice", "Studenec", "Studénka", "Tišnov", "Veselí nad Moravou",
                "Vranovice", "Vyškov na Moravě", "Zastávka u Brna", "Žďár nad Sázavou", "?",
                "Studenec", "Štúrovo", "Svitavy", "Tábor", "Tišnov", "Tišnov-Křižanov",
                "Trenč. Teplá", "Turnov", "Uherské Hradiště", "?",
            ]),
            directions2: strings(&[
                "Blansko", "Bohumín", "Bojkovice", "Břeclav", "Bratislava", "Bylnice",
                "Bučovice", "Bzenec", "Čadca", "České Budějovice", "Český Těšín", "Chornice",
                "Děčin", "Frýdek-Místek", "Havířov", "Havlíčkův Brod", "Holubice",
                "Horní Cerekev", "Hradec Králové", "Hranice na Moravě",
                "Hrušovany nad Jevišovkou", "Hulín", "Kolína", "Komárno", "Kyjov",
                "Kyjov Bzenec", "Křižanov", "Kunovice", "Kúty", "Moravské Bránice",
                "Moravský Krumlov", "Moravský Písek", "Moravská Třebová", "Mosty u Jablunkova",
                "Náměšť nad Oslavou", "Nezamyslice", "Nové Město na Moravě", "Okříšky",
                "Ostrava hl.n.", "Ostrava-Svinov", "Ostrava-Vítkovice", "Pardubice hl.n.",
                "Pardubice-Kolín", "Praha-Holešovice", "Přerov", "S1", "S2", "S3", "S4",
                "S41", "S5", "S6", "S7", "R1", "R2", "R3", "R4", "R41", "R5", "R6", "R7",
                "Uničov", "Ústí nad Labem", "Valašské Meziřící", "Veselí nad Lužnicí",
                "Veseá nad Moravou", "Vyškov na Moravě", "Zábřeh na Moravě", "Zaječí",
                "Žďár nad Sázavou", "Žilina", "Kojetín", "Vlárský Průsmyk",
                "Tábor-Veselí nad Lužnicí", "", "Praha hl.n.", "", "ODKLON",
            ]),
            delays: DelayQuantizer::solari(),
        }
    }

    /// Check the profile can be used to drive a panel
    ///
    /// Verifies that every field offset lies within the unit count, that no
    /// unit is claimed by two fields and that every table fits a unit's
    /// code space without reaching the unknown-position sentinel.
    pub fn validate(&self) -> Result<(), SolariError> {
        // side prefix + units must fit one frame
        if self.unit_count == 0 || self.unit_count + 1 > MAX_PAYLOAD_SIZE {
            return Err(SolariError::InvalidProfile(format!(
                "unit count {} outside 1..={}",
                self.unit_count,
                MAX_PAYLOAD_SIZE - 1
            )));
        }

        let mut claimed = vec![None; self.unit_count];
        for (field, offset) in self.layout.offsets() {
            let slot = claimed.get_mut(offset).ok_or_else(|| {
                SolariError::InvalidProfile(format!(
                    "{field} unit {offset} outside 0..{}",
                    self.unit_count
                ))
            })?;
            if let Some(other) = slot.replace(field) {
                return Err(SolariError::InvalidProfile(format!(
                    "unit {offset} claimed by both {other} and {field}"
                )));
            }
        }

        let limit = UNKNOWN_POSITION as usize;
        if self.alphabet.chars().count() > limit {
            return Err(SolariError::InvalidProfile(format!(
                "alphabet has more than {limit} characters"
            )));
        }
        if self.symbol_code(' ').is_none() {
            return Err(SolariError::InvalidProfile(
                "alphabet needs a space for padding".into(),
            ));
        }
        for (name, table) in [
            ("types", &self.types),
            ("directions1", &self.directions1),
            ("directions2", &self.directions2),
        ] {
            if table.len() >= limit {
                return Err(SolariError::InvalidProfile(format!(
                    "{name} has {} entries, at most {} fit a unit",
                    table.len(),
                    limit - 1
                )));
            }
        }

        self.delays.validate()
    }

    /// Code of a destination character (raw alphabet index)
    pub fn symbol_code(&self, c: char) -> Option<u8> {
        self.alphabet.chars().position(|s| s == c).map(|i| i as u8)
    }

    /// Destination character shown for `code`
    pub fn symbol(&self, code: u8) -> Option<char> {
        self.alphabet.chars().nth(code as usize)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profile_is_valid() {
        let profile = Profile::solari_26();
        profile.validate().unwrap();
        assert_eq!(profile.layout.destination.len(), 14);
        assert_eq!(profile.layout.number.len(), 5);
        assert_eq!(profile.layout.offsets().count(), 26);
    }

    #[test]
    fn test_alphabet_codes() {
        let profile = Profile::solari_26();
        assert_eq!(profile.symbol_code(' '), Some(0));
        assert_eq!(profile.symbol_code('0'), Some(1));
        assert_eq!(profile.symbol_code('b'), Some(14));
        assert_eq!(profile.symbol_code('B'), None);
        assert_eq!(profile.symbol(38), Some('r'));
        assert_eq!(profile.symbol(200), None);
    }

    #[test]
    fn test_rejects_overlapping_fields() {
        let mut profile = Profile::solari_26();
        profile.layout.delay = Some(0);
        assert!(matches!(
            profile.validate(),
            Err(SolariError::InvalidProfile(msg)) if msg.contains("claimed by both")
        ));
    }

    #[test]
    fn test_rejects_offset_past_unit_count() {
        let mut profile = Profile::solari_26();
        profile.unit_count = 25;
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_rejects_alphabet_without_space() {
        let mut profile = Profile::solari_26();
        profile.alphabet = "abc".into();
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_profile_json_round_trip() {
        let profile = Profile::solari_26();
        let json = serde_json::to_string(&profile).unwrap();
        let back: Profile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, profile);
    }
}
