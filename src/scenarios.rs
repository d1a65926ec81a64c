//! Canned weather scenarios for mock mode.
//!
//! Each scenario is a complete, deterministic bundle of current
//! conditions, an hourly template and a 7-day outlook, used to exercise
//! the dashboard against extremes without touching the network.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::provider::local_day_bounds;
use crate::service::normalize::{fixed_offset, local_time, HOURS_PER_DAY};
use crate::types::{CurrentWeather, DailyForecast, HourlyForecast, Location};

pub const DEFAULT_SCENARIO_ID: &str = "sunny-day";

/// Calendar date the fixtures are stamped with.
const FIXTURE_DATE: (i32, u32, u32) = (2024, 7, 15);

// ---------------------------------------------------------------------------
// Static scenario table
// ---------------------------------------------------------------------------

struct CurrentSeed {
    temp: i32,
    feels: i32,
    humidity: u8,
    wind: i32,
    dir: u16,
    precip: f64,
    desc: &'static str,
    icon: &'static str,
}

struct HourSeed {
    temp: i32,
    feels: i32,
    humidity: u8,
    wind: i32,
    dir: u16,
    chance: u8,
    precip: f64,
    desc: &'static str,
    icon: &'static str,
}

struct DaySeed {
    high: i32,
    low: i32,
    chance: u8,
    precip: f64,
    desc: &'static str,
    icon: &'static str,
}

struct ScenarioSeed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    place: &'static str,
    lat: f64,
    lng: f64,
    /// Seconds east of UTC.
    tz_offset: i32,
    current: CurrentSeed,
    hourly: &'static [HourSeed],
    daily: &'static [DaySeed],
}

#[allow(clippy::too_many_arguments)]
const fn hs(
    temp: i32,
    feels: i32,
    humidity: u8,
    wind: i32,
    dir: u16,
    chance: u8,
    precip: f64,
    desc: &'static str,
    icon: &'static str,
) -> HourSeed {
    HourSeed {
        temp,
        feels,
        humidity,
        wind,
        dir,
        chance,
        precip,
        desc,
        icon,
    }
}

const fn ds(
    high: i32,
    low: i32,
    chance: u8,
    precip: f64,
    desc: &'static str,
    icon: &'static str,
) -> DaySeed {
    DaySeed {
        high,
        low,
        chance,
        precip,
        desc,
        icon,
    }
}

const SCENARIOS: &[ScenarioSeed] = &[
    ScenarioSeed {
        id: "sunny-day",
        name: "Sunny Day",
        description: "Mild, clear coastal weather with a light sea breeze",
        place: "San Diego, CA",
        lat: 32.7157,
        lng: -117.1611,
        tz_offset: -25_200,
        current: CurrentSeed {
            temp: 75,
            feels: 75,
            humidity: 55,
            wind: 8,
            dir: 270,
            precip: 0.0,
            desc: "clear sky",
            icon: "01d",
        },
        hourly: &[
            hs(66, 66, 70, 4, 250, 0, 0.0, "clear sky", "01n"),
            hs(64, 64, 74, 3, 240, 0, 0.0, "clear sky", "01n"),
            hs(68, 68, 66, 5, 260, 0, 0.0, "few clouds", "02d"),
            hs(74, 74, 56, 8, 270, 0, 0.0, "clear sky", "01d"),
            hs(76, 76, 52, 10, 280, 0, 0.0, "clear sky", "01d"),
            hs(70, 70, 62, 6, 270, 0, 0.0, "few clouds", "02n"),
        ],
        daily: &[
            ds(76, 64, 0, 0.0, "clear sky", "01d"),
            ds(77, 65, 0, 0.0, "clear sky", "01d"),
            ds(75, 64, 10, 0.0, "few clouds", "02d"),
            ds(74, 63, 10, 0.0, "scattered clouds", "03d"),
            ds(76, 64, 0, 0.0, "clear sky", "01d"),
            ds(78, 66, 0, 0.0, "clear sky", "01d"),
            ds(77, 65, 0, 0.0, "clear sky", "01d"),
        ],
    },
    ScenarioSeed {
        id: "extreme-heat",
        name: "Extreme Heat",
        description: "Desert heat wave with triple-digit temperatures",
        place: "Phoenix, AZ",
        lat: 33.4484,
        lng: -112.0740,
        tz_offset: -25_200,
        current: CurrentSeed {
            temp: 118,
            feels: 121,
            humidity: 8,
            wind: 12,
            dir: 230,
            precip: 0.0,
            desc: "clear sky",
            icon: "01d",
        },
        hourly: &[
            hs(96, 94, 12, 6, 200, 0, 0.0, "clear sky", "01n"),
            hs(93, 91, 14, 5, 190, 0, 0.0, "clear sky", "01n"),
            hs(104, 103, 10, 8, 210, 0, 0.0, "clear sky", "01d"),
            hs(114, 116, 8, 11, 230, 0, 0.0, "clear sky", "01d"),
            hs(118, 121, 7, 13, 240, 0, 0.0, "clear sky", "01d"),
            hs(108, 108, 9, 9, 220, 0, 0.0, "haze", "50n"),
        ],
        daily: &[
            ds(118, 94, 0, 0.0, "clear sky", "01d"),
            ds(119, 95, 0, 0.0, "clear sky", "01d"),
            ds(117, 93, 0, 0.0, "haze", "50d"),
            ds(116, 92, 0, 0.0, "clear sky", "01d"),
            ds(115, 91, 5, 0.0, "few clouds", "02d"),
            ds(113, 90, 10, 0.0, "few clouds", "02d"),
            ds(114, 90, 0, 0.0, "clear sky", "01d"),
        ],
    },
    ScenarioSeed {
        id: "blizzard",
        name: "Blizzard",
        description: "Lake-effect snow with gale-force wind and sub-zero wind chill",
        place: "Buffalo, NY",
        lat: 42.8864,
        lng: -78.8784,
        tz_offset: -18_000,
        current: CurrentSeed {
            temp: 12,
            feels: -9,
            humidity: 88,
            wind: 38,
            dir: 300,
            precip: 4.2,
            desc: "heavy snow",
            icon: "13d",
        },
        hourly: &[
            hs(10, -12, 90, 36, 300, 100, 4.5, "heavy snow", "13n"),
            hs(9, -13, 91, 40, 310, 100, 5.1, "heavy snow", "13n"),
            hs(11, -10, 89, 38, 300, 100, 4.2, "heavy snow", "13d"),
            hs(13, -7, 86, 34, 290, 95, 3.0, "snow", "13d"),
            hs(14, -5, 84, 30, 290, 90, 2.2, "snow", "13d"),
            hs(12, -8, 88, 35, 300, 100, 3.8, "heavy snow", "13n"),
        ],
        daily: &[
            ds(15, 6, 100, 48.0, "heavy snow", "13d"),
            ds(18, 8, 90, 22.0, "snow", "13d"),
            ds(22, 11, 60, 6.0, "light snow", "13d"),
            ds(25, 14, 30, 1.0, "overcast clouds", "04d"),
            ds(28, 17, 20, 0.0, "broken clouds", "04d"),
            ds(30, 19, 40, 2.0, "light snow", "13d"),
            ds(27, 16, 50, 4.0, "light snow", "13d"),
        ],
    },
    ScenarioSeed {
        id: "thunderstorm",
        name: "Severe Thunderstorm",
        description: "Humid afternoon with training thunderstorms and heavy rain",
        place: "Chicago, IL",
        lat: 41.8781,
        lng: -87.6298,
        tz_offset: -18_000,
        current: CurrentSeed {
            temp: 78,
            feels: 82,
            humidity: 85,
            wind: 22,
            dir: 200,
            precip: 12.5,
            desc: "thunderstorm with heavy rain",
            icon: "11d",
        },
        hourly: &[
            hs(72, 74, 88, 10, 190, 40, 0.0, "overcast clouds", "04n"),
            hs(71, 73, 90, 9, 180, 55, 0.6, "light rain", "10n"),
            hs(76, 79, 84, 14, 200, 70, 2.4, "thunderstorm", "11d"),
            hs(79, 83, 85, 24, 210, 95, 12.5, "thunderstorm with heavy rain", "11d"),
            hs(77, 80, 88, 20, 220, 90, 8.0, "thunderstorm with rain", "11d"),
            hs(73, 75, 90, 12, 230, 60, 1.2, "moderate rain", "10n"),
        ],
        daily: &[
            ds(81, 68, 95, 38.0, "thunderstorm with heavy rain", "11d"),
            ds(79, 66, 70, 12.0, "thunderstorm", "11d"),
            ds(77, 64, 40, 3.0, "light rain", "10d"),
            ds(80, 65, 20, 0.0, "scattered clouds", "03d"),
            ds(83, 67, 10, 0.0, "few clouds", "02d"),
            ds(85, 69, 30, 1.0, "light rain", "10d"),
            ds(82, 68, 50, 6.0, "thunderstorm", "11d"),
        ],
    },
    ScenarioSeed {
        id: "tropical-storm",
        name: "Tropical Storm",
        description: "Landfalling tropical system with damaging wind and flooding rain",
        place: "Miami, FL",
        lat: 25.7617,
        lng: -80.1918,
        tz_offset: -14_400,
        current: CurrentSeed {
            temp: 84,
            feels: 92,
            humidity: 94,
            wind: 55,
            dir: 110,
            precip: 28.0,
            desc: "very heavy rain",
            icon: "10d",
        },
        hourly: &[
            hs(82, 89, 95, 48, 100, 100, 22.0, "very heavy rain", "10n"),
            hs(81, 88, 96, 52, 105, 100, 30.0, "extreme rain", "10n"),
            hs(83, 91, 95, 58, 110, 100, 34.0, "extreme rain", "10d"),
            hs(84, 92, 94, 55, 115, 100, 28.0, "very heavy rain", "10d"),
            hs(85, 93, 92, 46, 120, 95, 16.0, "heavy intensity rain", "10d"),
            hs(83, 90, 94, 40, 125, 90, 10.0, "heavy intensity rain", "10n"),
        ],
        daily: &[
            ds(86, 80, 100, 180.0, "extreme rain", "10d"),
            ds(87, 79, 90, 75.0, "very heavy rain", "10d"),
            ds(88, 79, 60, 20.0, "moderate rain", "10d"),
            ds(89, 80, 40, 5.0, "light rain", "10d"),
            ds(90, 80, 30, 2.0, "scattered clouds", "03d"),
            ds(90, 81, 30, 1.0, "few clouds", "02d"),
            ds(89, 80, 40, 4.0, "light rain", "10d"),
        ],
    },
];

// ---------------------------------------------------------------------------
// Scenario values
// ---------------------------------------------------------------------------

/// What the dashboard lists before a scenario is activated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioSummary {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// A fully-populated fixture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MockScenario {
    pub id: String,
    pub name: String,
    pub description: String,
    pub location: Location,
    pub timezone_offset: i32,
    pub current_weather: CurrentWeather,
    pub hourly_forecast: Vec<HourlyForecast>,
    pub daily_forecast: Vec<DailyForecast>,
}

impl MockScenario {
    fn from_seed(seed: &ScenarioSeed) -> Self {
        let offset = fixed_offset(seed.tz_offset);
        let (year, month, day) = FIXTURE_DATE;
        let fixture_day = NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default();
        let (midnight, _) = local_day_bounds(fixture_day, seed.tz_offset);

        let c = &seed.current;
        let current_weather = CurrentWeather {
            temperature: c.temp,
            feels_like: c.feels,
            humidity: c.humidity,
            wind_speed: c.wind,
            wind_direction: c.dir,
            precipitation: c.precip,
            description: c.desc.to_string(),
            icon: c.icon.to_string(),
            observed_at: local_time(midnight + 14 * 3600, offset),
        };

        // Template hours are spaced four hours apart across the fixture day.
        let hourly_forecast = seed
            .hourly
            .iter()
            .enumerate()
            .map(|(i, h)| hour_from_seed(h, local_time(midnight + (i as i64) * 4 * 3600, offset)))
            .collect();

        let daily_forecast = seed
            .daily
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let date = fixture_day + Duration::days(i as i64);
                let (day_start, _) = local_day_bounds(date, seed.tz_offset);
                DailyForecast {
                    date,
                    high: d.high,
                    low: d.low,
                    humidity: c.humidity,
                    wind_speed: c.wind,
                    wind_direction: c.dir,
                    precipitation_chance: d.chance,
                    precipitation: d.precip,
                    description: d.desc.to_string(),
                    icon: d.icon.to_string(),
                    sunrise: Some(local_time(day_start + 6 * 3600, offset)),
                    sunset: Some(local_time(day_start + 20 * 3600, offset)),
                }
            })
            .collect();

        Self {
            id: seed.id.to_string(),
            name: seed.name.to_string(),
            description: seed.description.to_string(),
            location: Location::new(seed.lat, seed.lng, seed.place),
            timezone_offset: seed.tz_offset,
            current_weather,
            hourly_forecast,
            daily_forecast,
        }
    }

    pub fn summary(&self) -> ScenarioSummary {
        ScenarioSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }

    /// 24 hourly records for `date`, starting at local midnight and cycling
    /// through the hourly template.
    pub fn hourly_for_date(&self, date: NaiveDate) -> Vec<HourlyForecast> {
        let offset = fixed_offset(self.timezone_offset);
        let (midnight, _) = local_day_bounds(date, self.timezone_offset);
        if self.hourly_forecast.is_empty() {
            return Vec::new();
        }
        (0..HOURS_PER_DAY)
            .map(|i| {
                let template = &self.hourly_forecast[i % self.hourly_forecast.len()];
                HourlyForecast {
                    time: local_time(midnight + (i as i64) * 3600, offset),
                    ..template.clone()
                }
            })
            .collect()
    }
}

fn hour_from_seed(h: &HourSeed, time: chrono::DateTime<chrono::FixedOffset>) -> HourlyForecast {
    HourlyForecast {
        time,
        temperature: h.temp,
        feels_like: h.feels,
        humidity: h.humidity,
        wind_speed: h.wind,
        wind_direction: h.dir,
        precipitation_chance: h.chance,
        precipitation: h.precip,
        description: h.desc.to_string(),
        icon: h.icon.to_string(),
    }
}

pub fn find(id: &str) -> Option<MockScenario> {
    SCENARIOS
        .iter()
        .find(|seed| seed.id == id)
        .map(MockScenario::from_seed)
}

pub fn summaries() -> Vec<ScenarioSummary> {
    SCENARIOS
        .iter()
        .map(|seed| ScenarioSummary {
            id: seed.id.to_string(),
            name: seed.name.to_string(),
            description: seed.description.to_string(),
        })
        .collect()
}

pub fn exists(id: &str) -> bool {
    SCENARIOS.iter().any(|seed| seed.id == id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
