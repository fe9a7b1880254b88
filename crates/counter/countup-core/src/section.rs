//! Stats section model: the site statistics a host page hands over as JSON,
//! turned into labelled counter items.
//!
//! The host object looks like `{ "stats": { "recipes": 50, "readers": 12000,
//! "rating": 4.9 }, ... }`. Other keys are ignored. A missing `stats` object (or
//! missing field) falls back to the built-in defaults.

use serde::{Deserialize, Serialize};

use crate::data::CounterSpec;
use crate::easing::Easing;
use crate::error::CounterError;
use crate::format::DisplayFormat;
use crate::trigger::TriggerMode;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteStats {
    pub recipes: f64,
    pub readers: f64,
    pub rating: f64,
}

impl Default for SiteStats {
    fn default() -> Self {
        Self {
            recipes: 50.0,
            readers: 12000.0,
            rating: 4.9,
        }
    }
}

impl SiteStats {
    /// One item per statistic, in page order.
    pub fn items(&self) -> Vec<StatItem> {
        vec![
            StatItem {
                label: "Hawaiian Recipes".into(),
                end_value: self.recipes,
                decimals: 0,
                suffix: "+".into(),
                grouping: false,
            },
            StatItem {
                label: "Monthly Readers".into(),
                end_value: self.readers,
                decimals: 0,
                suffix: "+".into(),
                grouping: true,
            },
            StatItem {
                label: "Average Rating".into(),
                end_value: self.rating,
                decimals: 1,
                suffix: " ★".into(),
                grouping: false,
            },
        ]
    }
}

/// A labelled statistic: counter target plus how to print it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatItem {
    pub label: String,
    pub end_value: f64,
    pub decimals: u32,
    #[serde(default)]
    pub suffix: String,
    #[serde(default)]
    pub grouping: bool,
}

impl StatItem {
    pub fn display_format(&self) -> DisplayFormat {
        DisplayFormat {
            decimals: self.decimals,
            grouping: self.grouping,
            prefix: String::new(),
            suffix: self.suffix.clone(),
        }
    }

    pub fn counter_spec(
        &self,
        easing: Easing,
        trigger: TriggerMode,
        duration_ms: f64,
    ) -> CounterSpec {
        CounterSpec::new(self.end_value)
            .decimals(self.decimals)
            .easing(easing)
            .trigger(trigger)
            .duration_ms(duration_ms)
    }
}

#[derive(Debug, Default, Deserialize)]
struct HostData {
    #[serde(default)]
    stats: Option<SiteStats>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub items: Vec<StatItem>,
}

impl Default for Section {
    fn default() -> Self {
        Self::from_site_stats(&SiteStats::default())
    }
}

impl Section {
    pub fn from_site_stats(stats: &SiteStats) -> Self {
        Self {
            items: stats.items(),
        }
    }

    /// Parse the host page's data object. `null` or `{}` yields the defaults.
    pub fn from_host_json(json: &str) -> Result<Self, CounterError> {
        let host: Option<HostData> = serde_json::from_str(json)
            .map_err(|e| CounterError::invalid(format!("host data json: {e}")))?;
        let stats = host.and_then(|h| h.stats).unwrap_or_default();
        Ok(Self::from_site_stats(&stats))
    }

    /// Build and validate one counter spec per item, sharing timing settings.
    pub fn counter_specs(
        &self,
        easing: &Easing,
        trigger: TriggerMode,
        duration_ms: f64,
    ) -> Result<Vec<CounterSpec>, CounterError> {
        self.items
            .iter()
            .map(|item| {
                let spec = item.counter_spec(easing.clone(), trigger, duration_ms);
                spec.validate().map_err(|e| {
                    CounterError::invalid(format!("stat '{}': {e}", item.label))
                })?;
                Ok(spec)
            })
            .collect()
    }
}
