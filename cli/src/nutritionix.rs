use anyhow::{Context, Result};
use tracing::debug;

use fitsphere_core::entries::SeedProvider;
use fitsphere_core::nutritionix::{InstantSearchResponse, response_energy};

const INSTANT_URL: &str = "https://trackapi.nutritionix.com/v2/search/instant";

/// Nutritionix application credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub app_id: String,
    pub app_key: String,
}

pub struct NutritionixClient {
    client: reqwest::Client,
    credentials: Credentials,
    rt: tokio::runtime::Handle,
}

impl NutritionixClient {
    pub fn new(credentials: Credentials) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!(
                "fitsphere-cli/{} (fitness tracker)",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(std::time::Duration::from_secs(10))
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            credentials,
            rt: tokio::runtime::Handle::current(),
        })
    }

    pub async fn energy_async(&self, food: &str) -> Result<Option<f64>> {
        let resp = self
            .client
            .get(INSTANT_URL)
            .query(&[("query", food)])
            .header("x-app-id", &self.credentials.app_id)
            .header("x-app-key", &self.credentials.app_key)
            .send()
            .await
            .context("Failed to reach Nutritionix API")?
            .error_for_status()
            .context("Nutritionix API returned an error")?;

        let data: InstantSearchResponse = resp
            .json()
            .await
            .context("Failed to parse Nutritionix search response")?;

        let kcal = response_energy(&data);
        debug!(food, ?kcal, "nutritionix lookup");
        Ok(kcal)
    }
}

impl SeedProvider for NutritionixClient {
    fn energy_per_100g(&self, food: &str) -> Result<Option<f64>> {
        // Called from inside the multi-threaded runtime at startup
        tokio::task::block_in_place(|| self.rt.block_on(self.energy_async(food)))
    }
}
