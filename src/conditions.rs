//! Weather-code lookup tables
//!
//! Open-Meteo reports conditions as WMO weather codes. A [`WeatherCodeTable`]
//! maps each code to a display string per [`Locale`], with a per-locale
//! sentinel for codes it does not know.
//! See: https://open-meteo.com/en/docs#weathervariables

use crate::WeatherPlanError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Languages with a built-in condition table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "pt-BR")]
    BrazilianPortuguese,
}

impl Locale {
    pub const COUNT: usize = 2;
    pub const ALL: [Locale; Self::COUNT] = [Locale::English, Locale::BrazilianPortuguese];

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::BrazilianPortuguese => "pt-BR",
        }
    }

    /// Position in [`Locale::ALL`]
    fn index(self) -> usize {
        match self {
            Locale::English => 0,
            Locale::BrazilianPortuguese => 1,
        }
    }

    fn builtin_entries(self) -> &'static [(i32, &'static str)] {
        match self {
            Locale::English => ENGLISH,
            Locale::BrazilianPortuguese => BRAZILIAN_PORTUGUESE,
        }
    }

    fn unknown_text(self) -> &'static str {
        match self {
            Locale::English => "Unknown",
            Locale::BrazilianPortuguese => "Desconhecido",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = WeatherPlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" => Ok(Locale::English),
            "pt" | "pt-br" => Ok(Locale::BrazilianPortuguese),
            other => Err(WeatherPlanError::invalid_input(format!(
                "Unsupported locale '{other}'. Must be one of: en, pt-BR"
            ))),
        }
    }
}

const ENGLISH: &[(i32, &str)] = &[
    (0, "Clear sky"),
    (1, "Mainly clear"),
    (2, "Partly cloudy"),
    (3, "Overcast"),
    (45, "Foggy"),
    (48, "Depositing rime fog"),
    (51, "Light drizzle"),
    (53, "Moderate drizzle"),
    (55, "Dense drizzle"),
    (56, "Light freezing drizzle"),
    (57, "Dense freezing drizzle"),
    (61, "Slight rain"),
    (63, "Moderate rain"),
    (65, "Heavy rain"),
    (66, "Light freezing rain"),
    (67, "Heavy freezing rain"),
    (71, "Slight snow fall"),
    (73, "Moderate snow fall"),
    (75, "Heavy snow fall"),
    (77, "Snow grains"),
    (80, "Slight rain showers"),
    (81, "Moderate rain showers"),
    (82, "Violent rain showers"),
    (85, "Slight snow showers"),
    (86, "Heavy snow showers"),
    (95, "Thunderstorm"),
    (96, "Thunderstorm with slight hail"),
    (99, "Thunderstorm with heavy hail"),
];

const BRAZILIAN_PORTUGUESE: &[(i32, &str)] = &[
    (0, "Céu limpo"),
    (1, "Predominantemente limpo"),
    (2, "Parcialmente nublado"),
    (3, "Encoberto"),
    (45, "Neblina"),
    (48, "Neblina com gelo"),
    (51, "Garoa leve"),
    (53, "Garoa moderada"),
    (55, "Garoa intensa"),
    (56, "Garoa congelante leve"),
    (57, "Garoa congelante intensa"),
    (61, "Chuva fraca"),
    (63, "Chuva moderada"),
    (65, "Chuva forte"),
    (66, "Chuva congelante leve"),
    (67, "Chuva congelante forte"),
    (71, "Neve fraca"),
    (73, "Neve moderada"),
    (75, "Neve forte"),
    (77, "Grãos de neve"),
    (80, "Pancadas de chuva fracas"),
    (81, "Pancadas de chuva moderadas"),
    (82, "Pancadas de chuva violentas"),
    (85, "Pancadas de neve fracas"),
    (86, "Pancadas de neve fortes"),
    (95, "Tempestade"),
    (96, "Tempestade com granizo leve"),
    (99, "Tempestade com granizo forte"),
];

#[derive(Debug, Clone)]
struct LocaleTable {
    conditions: HashMap<i32, String>,
    unknown: String,
}

impl LocaleTable {
    fn from_entries(entries: &[(i32, &str)], unknown: &str) -> Self {
        Self {
            conditions: entries
                .iter()
                .map(|(code, text)| (*code, (*text).to_string()))
                .collect(),
            unknown: unknown.to_string(),
        }
    }
}

/// Locale-keyed mapping from weather code to condition text
#[derive(Debug, Clone)]
pub struct WeatherCodeTable {
    tables: [LocaleTable; Locale::COUNT],
    default_locale: Locale,
}

impl Default for WeatherCodeTable {
    fn default() -> Self {
        Self::builtin(Locale::default())
    }
}

impl WeatherCodeTable {
    /// Built-in tables for every [`Locale`], looking up `default_locale` when
    /// no locale is given.
    #[must_use]
    pub fn builtin(default_locale: Locale) -> Self {
        Self {
            tables: Locale::ALL.map(|locale| {
                LocaleTable::from_entries(locale.builtin_entries(), locale.unknown_text())
            }),
            default_locale,
        }
    }

    fn table(&self, locale: Locale) -> &LocaleTable {
        &self.tables[locale.index()]
    }

    #[must_use]
    pub fn default_locale(&self) -> Locale {
        self.default_locale
    }

    /// Override or add a single entry for one locale
    #[must_use]
    pub fn with_condition(mut self, locale: Locale, code: i32, text: impl Into<String>) -> Self {
        self.tables[locale.index()]
            .conditions
            .insert(code, text.into());
        self
    }

    /// Condition text in the default locale
    #[must_use]
    pub fn describe(&self, code: i32) -> &str {
        self.describe_in(self.default_locale, code)
    }

    /// Condition text in `locale`; unknown codes yield that locale's sentinel
    #[must_use]
    pub fn describe_in(&self, locale: Locale, code: i32) -> &str {
        let table = self.table(locale);
        table
            .conditions
            .get(&code)
            .map_or(table.unknown.as_str(), String::as_str)
    }

    /// Sentinel returned for codes missing from `locale`'s table
    #[must_use]
    pub fn unknown_in(&self, locale: Locale) -> &str {
        &self.table(locale).unknown
    }

    /// Known codes for `locale`, ascending
    #[must_use]
    pub fn codes(&self, locale: Locale) -> Vec<i32> {
        let mut codes: Vec<i32> = self.table(locale).conditions.keys().copied().collect();
        codes.sort_unstable();
        codes
    }
}
