//! Turns classified predictions into a one-line, human readable headline.

use crate::prediction::classify::{
    AirQualityClass, CloudCover, TemperatureClass, WetClass, WindClass,
};

/// Headline used when no temperature, wind or precipitation class is worth mentioning.
pub const TYPICAL_HEADLINE: &str = "Typical";

/// The classified inputs of a headline. Every part is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadlineParts<'a> {
    pub temperature: Option<TemperatureClass>,
    pub wind: Option<WindClass>,
    pub wet: Option<WetClass>,
    pub air_quality: Option<AirQualityClass>,
    pub cloud: Option<CloudCover>,
    pub condition: Option<&'a str>,
}

/// Builds the headline, e.g. `"Mild, breezy, light rain — low air pollution. Likely: partly
/// cloudy (Patchy rain nearby)"`.
///
/// The core lists the temperature class, then the lower-cased wind class unless it is
/// calm, then the lower-cased precipitation class unless it is dry. The tails for air
/// quality, cloud and the most likely condition follow in that order, each only when
/// present.
pub fn headline(parts: &HeadlineParts<'_>) -> String {
    let mut core: Vec<String> = Vec::with_capacity(3);
    if let Some(temperature) = parts.temperature {
        core.push(temperature.label().to_string());
    }
    if let Some(wind) = parts.wind.filter(|w| *w != WindClass::CalmLight) {
        core.push(wind.label().to_lowercase());
    }
    if let Some(wet) = parts.wet.filter(|w| *w != WetClass::Dry) {
        core.push(wet.label().to_lowercase());
    }

    let mut line = if core.is_empty() {
        TYPICAL_HEADLINE.to_string()
    } else {
        core.join(", ")
    };

    if let Some(air_quality) = parts.air_quality {
        line.push_str(&format!(" — {} air pollution", air_quality.label().to_lowercase()));
    }
    if let Some(cloud) = parts.cloud {
        line.push_str(&format!(". Likely: {}", cloud.phrase()));
    }
    if let Some(condition) = parts.condition {
        line.push_str(&format!(" ({condition})"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_parts_are_typical() {
        assert_eq!(headline(&HeadlineParts::default()), "Typical");
    }

    #[test]
    fn calm_and_dry_are_not_mentioned() {
        let parts = HeadlineParts {
            wind: Some(WindClass::CalmLight),
            wet: Some(WetClass::Dry),
            ..Default::default()
        };
        assert_eq!(headline(&parts), "Typical");
    }

    #[test]
    fn full_headline_keeps_fixed_order() {
        let parts = HeadlineParts {
            temperature: Some(TemperatureClass::Mild),
            wind: Some(WindClass::StrongBreeze),
            wet: Some(WetClass::LightRain),
            air_quality: Some(AirQualityClass::VeryHigh),
            cloud: Some(CloudCover::PartlyCloudy),
            condition: Some("Patchy rain nearby"),
        };
        assert_eq!(
            headline(&parts),
            "Mild, strong breeze, light rain — very high air pollution. Likely: partly cloudy (Patchy rain nearby)"
        );
    }

    #[test]
    fn tails_are_independent() {
        let parts = HeadlineParts {
            cloud: Some(CloudCover::Overcast),
            condition: Some("Mist"),
            ..Default::default()
        };
        assert_eq!(headline(&parts), "Typical. Likely: overcast (Mist)");

        let parts = HeadlineParts {
            temperature: Some(TemperatureClass::Hot),
            air_quality: Some(AirQualityClass::Low),
            ..Default::default()
        };
        assert_eq!(headline(&parts), "Hot — low air pollution");
    }
}
