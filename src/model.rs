use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latitude/longitude pair resolved from a current-weather response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Numeric weather metrics under the payload's `main` key.
///
/// Every field is optional so that presence validation stays a separate
/// concern from metric completeness: an empty `main` object still counts as
/// present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainMetrics {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub pressure: Option<f64>,
    pub humidity: Option<f64>,
}

/// One condition descriptor from the payload's `weather` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub id: Option<i64>,
    pub main: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

/// Wind metrics under the payload's `wind` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wind {
    pub speed: Option<f64>,
    pub deg: Option<f64>,
    pub gust: Option<f64>,
}

/// Cloud coverage under the payload's `clouds` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clouds {
    /// Coverage percentage, 0-100.
    pub all: Option<f64>,
}

/// Decoded current-weather payload.
///
/// Unknown payload fields are ignored; absent ones decode to `None`. A
/// response handed to callers as valid always carries `main`, `weather`
/// and `wind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherResponse {
    pub coord: Option<Coordinates>,
    pub main: Option<MainMetrics>,
    pub weather: Option<Vec<Condition>>,
    pub wind: Option<Wind>,
    pub clouds: Option<Clouds>,
    /// Observation time as a unix timestamp.
    pub dt: Option<i64>,
    /// Location name echoed back by the API.
    pub name: Option<String>,
}

impl WeatherResponse {
    /// True iff the payload carries all required fields: `main`, `weather`, `wind`.
    pub fn is_valid(&self) -> bool {
        self.missing_field().is_none()
    }

    /// Name of the first required field that is absent, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        missing_observation_field(&self.main, &self.weather, &self.wind)
    }

    /// Observation time converted from the payload's unix `dt`.
    pub fn observation_time(&self) -> Option<DateTime<Utc>> {
        self.dt.and_then(|ts| DateTime::from_timestamp(ts, 0))
    }
}

/// One 3-hour forecast slot from the payload's `list` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSlot {
    /// Slot time as a unix timestamp.
    pub dt: Option<i64>,
    pub main: Option<MainMetrics>,
    pub weather: Option<Vec<Condition>>,
    pub wind: Option<Wind>,
    pub clouds: Option<Clouds>,
    /// Precipitation probability, 0.0-1.0.
    pub pop: Option<f64>,
    pub dt_txt: Option<String>,
}

impl ForecastSlot {
    /// Name of the first required field this slot is missing, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        missing_observation_field(&self.main, &self.weather, &self.wind)
    }

    /// Slot time converted from the payload's unix `dt`.
    pub fn slot_time(&self) -> Option<DateTime<Utc>> {
        self.dt.and_then(|ts| DateTime::from_timestamp(ts, 0))
    }
}

/// Location metadata under the forecast payload's `city` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    pub name: Option<String>,
    pub country: Option<String>,
    pub coord: Option<Coordinates>,
}

/// Decoded forecast payload: a count field plus one entry per 3-hour slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub cnt: Option<u32>,
    #[serde(default)]
    pub list: Vec<ForecastSlot>,
    pub city: Option<City>,
}

impl ForecastResponse {
    /// True iff the count field is present and every slot carries the
    /// required `main`/`weather`/`wind` triple.
    pub fn is_valid(&self) -> bool {
        self.missing_field().is_none()
    }

    /// Name of the first required field absent anywhere in the payload, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.cnt.is_none() {
            return Some("cnt");
        }
        self.list.iter().find_map(ForecastSlot::missing_field)
    }
}

fn missing_observation_field(
    main: &Option<MainMetrics>,
    weather: &Option<Vec<Condition>>,
    wind: &Option<Wind>,
) -> Option<&'static str> {
    if main.is_none() {
        Some("main")
    } else if weather.is_none() {
        Some("weather")
    } else if wind.is_none() {
        Some("wind")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_complete_payload_is_valid() {
        let response: WeatherResponse =
            serde_json::from_str(r#"{"main":{}, "weather":[], "wind":{}}"#)
                .expect("minimal payload must decode");

        assert!(response.is_valid());
        assert_eq!(response.missing_field(), None);
    }

    #[test]
    fn each_missing_required_field_is_reported() {
        let missing_main: WeatherResponse =
            serde_json::from_str(r#"{"weather":[], "wind":{}}"#).expect("must decode");
        assert!(!missing_main.is_valid());
        assert_eq!(missing_main.missing_field(), Some("main"));

        let missing_weather: WeatherResponse =
            serde_json::from_str(r#"{"main":{}, "wind":{}}"#).expect("must decode");
        assert_eq!(missing_weather.missing_field(), Some("weather"));

        let missing_wind: WeatherResponse =
            serde_json::from_str(r#"{"main":{}, "weather":[]}"#).expect("must decode");
        assert_eq!(missing_wind.missing_field(), Some("wind"));
    }

    #[test]
    fn full_current_payload_decodes() {
        let response: WeatherResponse = serde_json::from_str(
            r#"{
                "coord": {"lat": 48.85, "lon": 2.35},
                "main": {"temp": 21.3, "feels_like": 20.9, "pressure": 1014, "humidity": 56},
                "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
                "wind": {"speed": 3.6, "deg": 220},
                "clouds": {"all": 0},
                "dt": 1700000000,
                "name": "Paris",
                "visibility": 10000
            }"#,
        )
        .expect("full payload must decode");

        assert!(response.is_valid());

        let coord = response.coord.expect("coord must be present");
        assert!((coord.lat - 48.85).abs() < f64::EPSILON);
        assert!((coord.lon - 2.35).abs() < f64::EPSILON);

        let time = response.observation_time().expect("dt must convert");
        assert_eq!(time.timestamp(), 1700000000);

        let main = response.main.expect("main must be present");
        assert_eq!(main.temp, Some(21.3));
        assert_eq!(main.humidity, Some(56.0));
    }

    #[test]
    fn forecast_without_count_field_is_invalid() {
        let forecast: ForecastResponse =
            serde_json::from_str(r#"{"list": []}"#).expect("must decode");

        assert!(!forecast.is_valid());
        assert_eq!(forecast.missing_field(), Some("cnt"));
    }

    #[test]
    fn forecast_with_incomplete_slot_is_invalid() {
        let forecast: ForecastResponse = serde_json::from_str(
            r#"{
                "cnt": 2,
                "list": [
                    {"dt": 1700000000, "main": {}, "weather": [], "wind": {}},
                    {"dt": 1700010800, "main": {}, "weather": []}
                ]
            }"#,
        )
        .expect("must decode");

        assert!(!forecast.is_valid());
        assert_eq!(forecast.missing_field(), Some("wind"));
    }

    #[test]
    fn forecast_with_complete_slots_is_valid() {
        let forecast: ForecastResponse = serde_json::from_str(
            r#"{
                "cnt": 1,
                "list": [
                    {
                        "dt": 1700000000,
                        "main": {"temp": 12.5},
                        "weather": [{"description": "light rain"}],
                        "wind": {"speed": 5.1},
                        "pop": 0.4,
                        "dt_txt": "2023-11-14 21:00:00"
                    }
                ],
                "city": {"name": "Tokyo", "country": "JP", "coord": {"lat": 35.68, "lon": 139.69}}
            }"#,
        )
        .expect("must decode");

        assert!(forecast.is_valid());
        assert_eq!(forecast.list.len(), 1);
        assert_eq!(forecast.list[0].pop, Some(0.4));

        let city = forecast.city.expect("city must be present");
        assert_eq!(city.name.as_deref(), Some("Tokyo"));
    }
}
