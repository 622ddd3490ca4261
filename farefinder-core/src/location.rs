use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationSubType {
    Airport,
    City,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub city_name: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoCode {
    pub latitude: f64,
    pub longitude: f64,
}

/// A structured location returned by the autocomplete lookup.
/// Never edited after it arrives; `iata_code` is the canonical key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationCandidate {
    pub id: String,
    pub name: String,
    pub iata_code: String,
    pub sub_type: LocationSubType,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub geo_code: Option<GeoCode>,
    #[serde(default)]
    pub relevance_score: Option<f64>,
}

impl LocationCandidate {
    /// A candidate can be searched on only if it carries an IATA code.
    pub fn is_resolved(&self) -> bool {
        !self.iata_code.trim().is_empty()
    }
}

/// Highest relevance first. Candidates without a score sink to the bottom,
/// ties keep provider order.
pub fn rank_candidates(mut candidates: Vec<LocationCandidate>) -> Vec<LocationCandidate> {
    candidates.sort_by(|a, b| {
        let a = a.relevance_score.unwrap_or(f64::MIN);
        let b = b.relevance_score.unwrap_or(f64::MIN);
        b.total_cmp(&a)
    });
    candidates
}

#[cfg(test)]
pub(crate) fn airport(iata: &str, name: &str) -> LocationCandidate {
    LocationCandidate {
        id: format!("A{}", iata),
        name: name.to_string(),
        iata_code: iata.to_string(),
        sub_type: LocationSubType::Airport,
        address: Address::default(),
        geo_code: None,
        relevance_score: None,
    }
}
