// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OpenWeatherMap adapter: current conditions and 3-hourly forecasts.

use crate::services::fetch::{Fetched, Upstream};
use crate::time_utils::{format_clock, format_utc_rfc3339};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

pub const DEFAULT_UNITS: &str = "metric";
pub const DEFAULT_FORECAST_DAYS: u32 = 5;

/// Forecast entries are 3 hours apart.
const POINTS_PER_DAY: u32 = 8;

/// OpenWeatherMap client. Requires an API key.
#[derive(Clone)]
pub struct WeatherClient {
    upstream: Upstream,
    api_key: Option<String>,
}

impl WeatherClient {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            upstream: Upstream::new(http, "weather", BASE_URL),
            api_key,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.upstream.set_base_url(base_url);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.upstream.set_timeout(timeout);
        self
    }

    /// Usable when a key is configured.
    pub fn check_status(&self) -> bool {
        self.api_key.is_some()
    }

    /// Current weather for a city.
    pub async fn current(&self, city: &str, units: &str) -> Fetched<WeatherReading> {
        let Some(api_key) = self.api_key.as_deref() else {
            return self.upstream.missing_credential("current");
        };

        let request = self
            .upstream
            .get("/weather")
            .query(&[("q", city), ("appid", api_key), ("units", units)]);

        self.upstream
            .fetch("current", request, |raw: RawCurrent| raw.into_reading())
            .await
    }

    /// Forecast for the next `days` days (8 points per day).
    pub async fn forecast(&self, city: &str, days: u32, units: &str) -> Fetched<Forecast> {
        let Some(api_key) = self.api_key.as_deref() else {
            return self.upstream.missing_credential("forecast");
        };

        let count = days.saturating_mul(POINTS_PER_DAY).to_string();
        let request = self.upstream.get("/forecast").query(&[
            ("q", city),
            ("appid", api_key),
            ("units", units),
            ("cnt", count.as_str()),
        ]);

        self.upstream
            .fetch("forecast", request, |raw: RawForecast| raw.into_forecast())
            .await
    }
}

// ─── Output Shapes ───────────────────────────────────────────

/// Current conditions for one city.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub city: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: i64,
    pub pressure: i64,
    /// Short condition group ("Rain", "Clouds", ...)
    pub condition: String,
    pub description: String,
    pub icon: String,
    pub wind_speed: f64,
    pub wind_deg: i64,
    /// Cloud cover percentage
    pub clouds: i64,
    pub visibility: i64,
    /// City-local `HH:MM`
    pub sunrise: String,
    pub sunset: String,
    /// When this reading was fetched (RFC3339)
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub city: String,
    pub country: String,
    pub forecasts: Vec<ForecastPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub datetime: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: i64,
    pub condition: String,
    pub description: String,
    pub icon: String,
    pub wind_speed: f64,
    pub clouds: i64,
    /// Probability of precipitation, 0-100
    pub pop: f64,
}

// ─── Provider Payloads ───────────────────────────────────────

#[derive(Deserialize, Default)]
struct RawMain {
    temp: Option<f64>,
    feels_like: Option<f64>,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
    humidity: Option<f64>,
    pressure: Option<f64>,
}

#[derive(Deserialize, Default)]
struct RawCondition {
    main: Option<String>,
    description: Option<String>,
    icon: Option<String>,
}

#[derive(Deserialize, Default)]
struct RawWind {
    speed: Option<f64>,
    deg: Option<f64>,
}

#[derive(Deserialize, Default)]
struct RawClouds {
    all: Option<f64>,
}

#[derive(Deserialize, Default)]
struct RawSys {
    country: Option<String>,
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Deserialize)]
struct RawCurrent {
    name: Option<String>,
    sys: Option<RawSys>,
    main: Option<RawMain>,
    weather: Option<Vec<RawCondition>>,
    wind: Option<RawWind>,
    clouds: Option<RawClouds>,
    visibility: Option<f64>,
    /// Shift from UTC in seconds
    timezone: Option<i64>,
}

fn whole(value: Option<f64>) -> i64 {
    value.map(|v| v.round() as i64).unwrap_or(0)
}

fn first_condition(conditions: Option<Vec<RawCondition>>) -> RawCondition {
    conditions
        .and_then(|list| list.into_iter().next())
        .unwrap_or_default()
}

impl RawCurrent {
    fn into_reading(self) -> WeatherReading {
        let main = self.main.unwrap_or_default();
        let sys = self.sys.unwrap_or_default();
        let wind = self.wind.unwrap_or_default();
        let condition = first_condition(self.weather);
        let offset = self.timezone.unwrap_or(0);
        let clock = |ts: Option<i64>| {
            ts.map(|ts| format_clock(ts, offset))
                .unwrap_or_default()
        };

        WeatherReading {
            city: self.name.unwrap_or_default(),
            country: sys.country.unwrap_or_default(),
            temperature: main.temp.unwrap_or(0.0),
            feels_like: main.feels_like.unwrap_or(0.0),
            temp_min: main.temp_min.unwrap_or(0.0),
            temp_max: main.temp_max.unwrap_or(0.0),
            humidity: whole(main.humidity),
            pressure: whole(main.pressure),
            condition: condition.main.unwrap_or_default(),
            description: condition.description.unwrap_or_default(),
            icon: condition.icon.unwrap_or_default(),
            wind_speed: wind.speed.unwrap_or(0.0),
            wind_deg: whole(wind.deg),
            clouds: whole(self.clouds.and_then(|c| c.all)),
            visibility: whole(self.visibility),
            sunrise: clock(sys.sunrise),
            sunset: clock(sys.sunset),
            timestamp: format_utc_rfc3339(chrono::Utc::now()),
        }
    }
}

#[derive(Deserialize, Default)]
struct RawForecastCity {
    name: Option<String>,
    country: Option<String>,
}

#[derive(Deserialize)]
struct RawForecastItem {
    dt_txt: Option<String>,
    main: Option<RawMain>,
    weather: Option<Vec<RawCondition>>,
    wind: Option<RawWind>,
    clouds: Option<RawClouds>,
    pop: Option<f64>,
}

#[derive(Deserialize)]
struct RawForecast {
    city: Option<RawForecastCity>,
    list: Option<Vec<RawForecastItem>>,
}

impl RawForecast {
    fn into_forecast(self) -> Forecast {
        let city = self.city.unwrap_or_default();
        let forecasts = self
            .list
            .unwrap_or_default()
            .into_iter()
            .map(|item| {
                let main = item.main.unwrap_or_default();
                let condition = first_condition(item.weather);
                ForecastPoint {
                    datetime: item.dt_txt.unwrap_or_default(),
                    temperature: main.temp.unwrap_or(0.0),
                    feels_like: main.feels_like.unwrap_or(0.0),
                    temp_min: main.temp_min.unwrap_or(0.0),
                    temp_max: main.temp_max.unwrap_or(0.0),
                    humidity: whole(main.humidity),
                    condition: condition.main.unwrap_or_default(),
                    description: condition.description.unwrap_or_default(),
                    icon: condition.icon.unwrap_or_default(),
                    wind_speed: item.wind.and_then(|w| w.speed).unwrap_or(0.0),
                    clouds: whole(item.clouds.and_then(|c| c.all)),
                    pop: item.pop.unwrap_or(0.0) * 100.0,
                }
            })
            .collect();

        Forecast {
            city: city.name.unwrap_or_default(),
            country: city.country.unwrap_or_default(),
            forecasts,
        }
    }
}
