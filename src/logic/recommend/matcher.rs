//! Reason-text matching, for alerts that carry no category
//!
//! Case-insensitive, first match wins. Vocabulary covers the English reasons
//! produced here and the French wording of older alerts.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::logic::detection::AnomalyCategory;

static PATTERNS: Lazy<Vec<(AnomalyCategory, Regex)>> = Lazy::new(|| {
    let table: [(AnomalyCategory, &str); 10] = [
        (
            AnomalyCategory::CriticalTemperature,
            r"critical|critique|overheat|surchauffe|\b(8[5-9]|9\d|[1-9]\d{2,})([.,]\d+)?\s*°\s*c\b",
        ),
        (
            AnomalyCategory::TemperatureTrend,
            r"trend|tendance|progressi|increasing|en hausse|rising",
        ),
        (
            AnomalyCategory::TemperatureOscillation,
            r"oscillat|fluctuat|variation.*rapide|trop rapide|rapid variation|too fast",
        ),
        (
            AnomalyCategory::NetworkSpike,
            r"traffic spike|network spike|pic de trafic|exfiltrat",
        ),
        (
            AnomalyCategory::MultipleConnections,
            r"multiple connections|connexions multiples|simultaneous connections|connexions simultanées",
        ),
        (
            AnomalyCategory::HighTxVolume,
            r"tx_bytes|transmitted|octets transmis|tx volume|volume d'envoi",
        ),
        (
            AnomalyCategory::ExcessiveHumidity,
            r"excessive humidity|humidité excessive|high humidity|humidité élevée",
        ),
        (
            AnomalyCategory::TempHumidityCorrelation,
            r"correlat|corrélation",
        ),
        (
            AnomalyCategory::DivergingBehavior,
            r"diverg",
        ),
        (
            AnomalyCategory::ErraticPattern,
            r"erratic|erratique|irregular|irrégulier",
        ),
    ];

    table
        .into_iter()
        .filter_map(|(category, pattern)| match Regex::new(&format!("(?i){}", pattern)) {
            Ok(re) => Some((category, re)),
            Err(e) => {
                log::error!("Invalid reason pattern for {}: {}", category, e);
                None
            }
        })
        .collect()
});

/// Category from free-text reason; `Unclassified` when nothing matches
pub fn match_reason(reason: &str) -> AnomalyCategory {
    PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(reason))
        .map(|(category, _)| *category)
        .unwrap_or(AnomalyCategory::Unclassified)
}
