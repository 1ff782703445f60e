//! Current conditions from wttr.in.
use crate::briefing::{SectionPayload, SectionResult};
use crate::config::BriefingConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

const WTTR_BASE: &str = "https://wttr.in/";
const USER_AGENT: &str = "daily-briefing/2.0";
const TIMEOUT: Duration = Duration::from_secs(15);
const AFTERNOON_SLOT: &str = "1500";
const MISSING: &str = "?";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeatherReport {
    pub location: String,
    pub condition: String,
    pub temp_f: String,
    pub temp_c: String,
    pub feels_like_f: String,
    pub humidity: String,
    pub wind_mph: String,
    pub wind_dir: String,
    pub high_f: String,
    pub low_f: String,
    pub high_c: String,
    pub low_c: String,
    pub uv_index: String,
    pub sunrise: String,
    pub sunset: String,
    pub precip_chance: String,
}

// Subset of the `format=j1` document; every field is optional upstream.
#[derive(Debug, Default, Deserialize)]
struct Forecast {
    #[serde(default)]
    current_condition: Vec<CurrentCondition>,
    #[serde(default)]
    weather: Vec<Day>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentCondition {
    #[serde(default)]
    weather_desc: Vec<TextValue>,
    #[serde(rename = "temp_F")]
    temp_f: Option<String>,
    #[serde(rename = "temp_C")]
    temp_c: Option<String>,
    #[serde(rename = "FeelsLikeF")]
    feels_like_f: Option<String>,
    humidity: Option<String>,
    windspeed_miles: Option<String>,
    #[serde(rename = "winddir16Point")]
    wind_dir: Option<String>,
    uv_index: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Day {
    #[serde(rename = "maxtempF")]
    max_f: Option<String>,
    #[serde(rename = "mintempF")]
    min_f: Option<String>,
    #[serde(rename = "maxtempC")]
    max_c: Option<String>,
    #[serde(rename = "mintempC")]
    min_c: Option<String>,
    #[serde(default)]
    astronomy: Vec<Astronomy>,
    #[serde(default)]
    hourly: Vec<Hourly>,
}

#[derive(Debug, Default, Deserialize)]
struct TextValue {
    value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Astronomy {
    sunrise: Option<String>,
    sunset: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Hourly {
    time: Option<String>,
    chanceofrain: Option<String>,
}

pub fn gather(config: &BriefingConfig) -> Result<SectionResult> {
    let url = forecast_url(&config.location)?;
    tracing::debug!(%url, "fetching weather");

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(TIMEOUT))
        .build()
        .into();
    let forecast: Forecast = agent
        .get(url.as_str())
        .header("User-Agent", USER_AGENT)
        .call()
        .with_context(|| format!("fetch weather for {}", config.location))?
        .body_mut()
        .read_json()
        .context("parse weather response")?;

    Ok(SectionResult::Ready(SectionPayload::Weather(summarize(
        &config.location,
        &forecast,
    ))))
}

fn forecast_url(location: &str) -> Result<Url> {
    let mut url = Url::parse(WTTR_BASE).context("parse weather base url")?;
    url.path_segments_mut()
        .map_err(|()| anyhow::anyhow!("weather base url cannot take a path"))?
        .pop_if_empty()
        .push(location);
    url.query_pairs_mut().append_pair("format", "j1");
    Ok(url)
}

fn summarize(location: &str, forecast: &Forecast) -> WeatherReport {
    let empty_current = CurrentCondition::default();
    let empty_day = Day::default();
    let current = forecast.current_condition.first().unwrap_or(&empty_current);
    let today = forecast.weather.first().unwrap_or(&empty_day);
    let astronomy = today.astronomy.first();

    let afternoon = today
        .hourly
        .iter()
        .find(|slot| slot.time.as_deref() == Some(AFTERNOON_SLOT))
        .or_else(|| today.hourly.last());

    let or_missing = |value: &Option<String>| value.clone().unwrap_or_else(|| MISSING.to_string());

    WeatherReport {
        location: location.to_string(),
        condition: current
            .weather_desc
            .first()
            .and_then(|desc| desc.value.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        temp_f: or_missing(&current.temp_f),
        temp_c: or_missing(&current.temp_c),
        feels_like_f: or_missing(&current.feels_like_f),
        humidity: or_missing(&current.humidity),
        wind_mph: or_missing(&current.windspeed_miles),
        wind_dir: current.wind_dir.clone().unwrap_or_default(),
        high_f: or_missing(&today.max_f),
        low_f: or_missing(&today.min_f),
        high_c: or_missing(&today.max_c),
        low_c: or_missing(&today.min_c),
        uv_index: or_missing(&current.uv_index),
        sunrise: astronomy
            .and_then(|a| a.sunrise.clone())
            .unwrap_or_else(|| MISSING.to_string()),
        sunset: astronomy
            .and_then(|a| a.sunset.clone())
            .unwrap_or_else(|| MISSING.to_string()),
        precip_chance: afternoon
            .and_then(|slot| slot.chanceofrain.clone())
            .unwrap_or_else(|| "0".to_string()),
    }
}
