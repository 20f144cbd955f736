use serde::Deserialize;

use crate::{errors::FetchError, models::widgets::Weather};

#[derive(Deserialize, Debug)]
pub struct WeatherResponse {
    pub name: String,
    pub main: MainBlock,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

#[derive(Deserialize, Debug)]
pub struct MainBlock {
    pub temp: f64,
}

#[derive(Deserialize, Debug)]
pub struct Condition {
    pub description: String,
    pub icon: String,
}

impl TryFrom<WeatherResponse> for Weather {
    type Error = FetchError;

    fn try_from(raw: WeatherResponse) -> Result<Self, Self::Error> {
        let condition = raw
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::empty(&raw.name, "weather conditions"))?;
        Ok(Weather {
            city: raw.name,
            temperature_f: raw.main.temp,
            description: condition.description,
            icon: condition.icon,
        })
    }
}
