use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct InstantSearchResponse {
    #[serde(default)]
    pub common: Vec<CommonFood>,
}

#[derive(Debug, Deserialize)]
pub struct CommonFood {
    pub food_name: Option<String>,
    pub nf_calories: Option<f64>,
}

/// Energy of the first common food, when present and positive.
#[must_use]
pub fn response_energy(resp: &InstantSearchResponse) -> Option<f64> {
    resp.common
        .first()?
        .nf_calories
        .filter(|kcal| kcal.is_finite() && *kcal > 0.0)
}
