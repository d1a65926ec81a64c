//! Radar overlay tile URLs.
//!
//! Pure formatting of OpenWeather map-tile URLs for the slippy-map layer
//! the dashboard animates over the base map.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{WeatherError, WeatherResult};

pub const TILE_HOST: &str = "https://tile.openweathermap.org/map";

/// Deepest zoom level the tile service renders.
pub const MAX_ZOOM: u8 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RadarLayer {
    Precipitation,
    Clouds,
    Temperature,
    Wind,
    Pressure,
}

impl RadarLayer {
    pub fn tile_name(&self) -> &'static str {
        match self {
            RadarLayer::Precipitation => "precipitation_new",
            RadarLayer::Clouds => "clouds_new",
            RadarLayer::Temperature => "temp_new",
            RadarLayer::Wind => "wind_new",
            RadarLayer::Pressure => "pressure_new",
        }
    }
}

impl fmt::Display for RadarLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tile_name())
    }
}

impl FromStr for RadarLayer {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "precipitation" | "precipitation_new" | "rain" => Ok(RadarLayer::Precipitation),
            "clouds" | "clouds_new" => Ok(RadarLayer::Clouds),
            "temperature" | "temp" | "temp_new" => Ok(RadarLayer::Temperature),
            "wind" | "wind_new" => Ok(RadarLayer::Wind),
            "pressure" | "pressure_new" => Ok(RadarLayer::Pressure),
            other => Err(WeatherError::InvalidInput(format!("unknown radar layer {other:?}"))),
        }
    }
}

/// URL of tile `(z, x, y)` for `layer`.
pub fn tile_url(layer: RadarLayer, z: u8, x: u32, y: u32, appid: &str) -> WeatherResult<String> {
    if z > MAX_ZOOM {
        return Err(WeatherError::InvalidInput(format!(
            "zoom {z} exceeds maximum {MAX_ZOOM}"
        )));
    }
    let span = 1u32 << z;
    if x >= span || y >= span {
        return Err(WeatherError::InvalidInput(format!(
            "tile ({x}, {y}) outside the {span}x{span} grid at zoom {z}"
        )));
    }
    Ok(format!(
        "{TILE_HOST}/{}/{z}/{x}/{y}.png?appid={}",
        layer.tile_name(),
        urlencoding::encode(appid)
    ))
}
