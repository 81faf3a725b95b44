//! Descriptive labels for predicted quantities.
//!
//! Each classifier is a fixed, ordered set of threshold bands. Non-finite input has no
//! label, so every `classify` returns an `Option`.

use serde::Serialize;
use std::fmt;

/// Temperature band in degrees Celsius. Upper bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TemperatureClass {
    /// At or below 0 °C.
    Freezing,
    /// Above 0 °C, up to 7 °C.
    Cold,
    /// Above 7 °C, up to 15 °C.
    Cool,
    /// Above 15 °C, up to 22 °C.
    Mild,
    /// Above 22 °C, up to 28 °C.
    Warm,
    /// Above 28 °C.
    Hot,
}

impl TemperatureClass {
    /// Classifies a temperature.
    ///
    /// ```
    /// use seasonal_outlook::TemperatureClass;
    ///
    /// assert_eq!(TemperatureClass::classify(0.0), Some(TemperatureClass::Freezing));
    /// assert_eq!(TemperatureClass::classify(28.1), Some(TemperatureClass::Hot));
    /// assert_eq!(TemperatureClass::classify(f64::NAN), None);
    /// ```
    pub fn classify(celsius: f64) -> Option<Self> {
        if !celsius.is_finite() {
            return None;
        }
        Some(match celsius {
            t if t <= 0.0 => TemperatureClass::Freezing,
            t if t <= 7.0 => TemperatureClass::Cold,
            t if t <= 15.0 => TemperatureClass::Cool,
            t if t <= 22.0 => TemperatureClass::Mild,
            t if t <= 28.0 => TemperatureClass::Warm,
            _ => TemperatureClass::Hot,
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            TemperatureClass::Freezing => "Freezing",
            TemperatureClass::Cold => "Cold",
            TemperatureClass::Cool => "Cool",
            TemperatureClass::Mild => "Mild",
            TemperatureClass::Warm => "Warm",
            TemperatureClass::Hot => "Hot",
        }
    }
}

/// Wind band in km/h. Lower bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WindClass {
    #[serde(rename = "Calm/Light")]
    CalmLight,
    #[serde(rename = "Light Breeze")]
    LightBreeze,
    Breezy,
    Windy,
    #[serde(rename = "Strong Breeze")]
    StrongBreeze,
    Gale,
}

impl WindClass {
    pub fn classify(kph: f64) -> Option<Self> {
        if !kph.is_finite() {
            return None;
        }
        Some(match kph {
            k if k < 12.0 => WindClass::CalmLight,
            k if k < 20.0 => WindClass::LightBreeze,
            k if k < 28.0 => WindClass::Breezy,
            k if k < 39.0 => WindClass::Windy,
            k if k < 55.0 => WindClass::StrongBreeze,
            _ => WindClass::Gale,
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            WindClass::CalmLight => "Calm/Light",
            WindClass::LightBreeze => "Light Breeze",
            WindClass::Breezy => "Breezy",
            WindClass::Windy => "Windy",
            WindClass::StrongBreeze => "Strong Breeze",
            WindClass::Gale => "Gale",
        }
    }
}

/// Precipitation band in mm. `Dry` means no measurable precipitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WetClass {
    Dry,
    Drizzle,
    #[serde(rename = "Light Rain")]
    LightRain,
    #[serde(rename = "Moderate Rain")]
    ModerateRain,
    #[serde(rename = "Heavy Rain")]
    HeavyRain,
    #[serde(rename = "Very Heavy Rain")]
    VeryHeavyRain,
}

impl WetClass {
    pub fn classify(mm: f64) -> Option<Self> {
        if !mm.is_finite() {
            return None;
        }
        Some(match mm {
            m if m <= 0.0 => WetClass::Dry,
            m if m < 0.2 => WetClass::Drizzle,
            m if m < 1.0 => WetClass::LightRain,
            m if m < 5.0 => WetClass::ModerateRain,
            m if m < 20.0 => WetClass::HeavyRain,
            _ => WetClass::VeryHeavyRain,
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            WetClass::Dry => "Dry",
            WetClass::Drizzle => "Drizzle",
            WetClass::LightRain => "Light Rain",
            WetClass::ModerateRain => "Moderate Rain",
            WetClass::HeavyRain => "Heavy Rain",
            WetClass::VeryHeavyRain => "Very Heavy Rain",
        }
    }
}

/// Air pollution band on the UK DEFRA daily air quality index (1–10).
///
/// Bands are closed intervals on the real line, so values that fall between bands
/// (e.g. `3.5`) or below `1` are unclassified. The same bands double as the four
/// air-quality regimes whose probabilities are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AirQualityClass {
    /// Index 1 to 3.
    Low,
    /// Index 4 to 6.
    Moderate,
    /// Index 7 to 9.
    High,
    /// Index 10 and above.
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl AirQualityClass {
    pub fn classify(index: f64) -> Option<Self> {
        if !index.is_finite() {
            return None;
        }
        match index {
            i if (1.0..=3.0).contains(&i) => Some(AirQualityClass::Low),
            i if (4.0..=6.0).contains(&i) => Some(AirQualityClass::Moderate),
            i if (7.0..=9.0).contains(&i) => Some(AirQualityClass::High),
            i if i >= 10.0 => Some(AirQualityClass::VeryHigh),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AirQualityClass::Low => "Low",
            AirQualityClass::Moderate => "Moderate",
            AirQualityClass::High => "High",
            AirQualityClass::VeryHigh => "Very High",
        }
    }
}

/// Sky cover phrase for a cloud percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudCover {
    Clear,
    #[serde(rename = "partly cloudy")]
    PartlyCloudy,
    #[serde(rename = "mostly cloudy")]
    MostlyCloudy,
    Overcast,
}

impl CloudCover {
    pub fn classify(pct: f64) -> Option<Self> {
        if !pct.is_finite() {
            return None;
        }
        Some(match pct {
            p if p < 20.0 => CloudCover::Clear,
            p if p < 50.0 => CloudCover::PartlyCloudy,
            p if p < 80.0 => CloudCover::MostlyCloudy,
            _ => CloudCover::Overcast,
        })
    }

    pub fn phrase(self) -> &'static str {
        match self {
            CloudCover::Clear => "clear",
            CloudCover::PartlyCloudy => "partly cloudy",
            CloudCover::MostlyCloudy => "mostly cloudy",
            CloudCover::Overcast => "overcast",
        }
    }
}

/// Coarse wind regimes whose probabilities are reported alongside the point estimate.
///
/// These bins are wider than [`WindClass`]: light breeze spans 12–28 km/h and windy
/// spans 28–55 km/h.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindRegime {
    Calm,
    LightBreeze,
    Windy,
    Gale,
}

impl WindRegime {
    pub fn of(kph: f64) -> Option<Self> {
        if !kph.is_finite() {
            return None;
        }
        Some(match kph {
            k if k < 12.0 => WindRegime::Calm,
            k if k < 28.0 => WindRegime::LightBreeze,
            k if k < 55.0 => WindRegime::Windy,
            _ => WindRegime::Gale,
        })
    }
}

macro_rules! display_label {
    ($($ty:ty => $method:ident),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.$method())
                }
            }
        )*
    };
}

display_label!(
    TemperatureClass => label,
    WindClass => label,
    WetClass => label,
    AirQualityClass => label,
    CloudCover => phrase,
);
