use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::StaticMapError;

pub const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/staticmap";

const MAX_ZOOM: u8 = 21;
const MAX_SIDE: u32 = 640;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSize {
    pub width: u32,
    pub height: u32,
}

impl MapSize {
    pub fn new(width: u32, height: u32) -> Result<Self, StaticMapError> {
        let in_range = |v: u32| (1..=MAX_SIDE).contains(&v);
        if !in_range(width) || !in_range(height) {
            return Err(StaticMapError::SizeOutOfRange(width, height));
        }
        Ok(Self { width, height })
    }
}

impl FromStr for MapSize {
    type Err = StaticMapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || StaticMapError::MalformedSize(s.to_string());
        let (w, h) = s.split_once(['x', 'X']).ok_or_else(malformed)?;
        let width = w.trim().parse().map_err(|_| malformed())?;
        let height = h.trim().parse().map_err(|_| malformed())?;
        Self::new(width, height)
    }
}

impl fmt::Display for MapSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapType {
    #[default]
    Roadmap,
    Satellite,
    Terrain,
    Hybrid,
}

impl MapType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MapType::Roadmap => "roadmap",
            MapType::Satellite => "satellite",
            MapType::Terrain => "terrain",
            MapType::Hybrid => "hybrid",
        }
    }
}

impl FromStr for MapType {
    type Err = StaticMapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "roadmap" => Ok(MapType::Roadmap),
            "satellite" => Ok(MapType::Satellite),
            "terrain" => Ok(MapType::Terrain),
            "hybrid" => Ok(MapType::Hybrid),
            _ => Err(StaticMapError::UnknownMapType(s.to_string())),
        }
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unsigned static map image request.
///
/// Query parameters are always emitted in the same order (center, zoom,
/// size, scale, maptype, markers, key) so identical requests serialize to
/// identical URLs and therefore identical signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticMapRequest {
    endpoint: String,
    center: String,
    zoom: u8,
    size: MapSize,
    scale: Option<u8>,
    maptype: Option<MapType>,
    markers: Vec<String>,
    key: Option<String>,
}

impl StaticMapRequest {
    /// `center` is either `"lat,lng"` or a free-form address.
    pub fn new(center: impl Into<String>, zoom: u8, size: MapSize) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            center: center.into(),
            zoom,
            size,
            scale: None,
            maptype: None,
            markers: Vec::new(),
            key: None,
        }
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn scale(mut self, scale: u8) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn maptype(mut self, maptype: MapType) -> Self {
        self.maptype = Some(maptype);
        self
    }

    /// Add a `markers` parameter, e.g. `"color:red|40.7,-74.0"`.
    pub fn marker(mut self, spec: impl Into<String>) -> Self {
        self.markers.push(spec.into());
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn to_url(&self) -> Result<Url, StaticMapError> {
        if self.center.trim().is_empty() {
            return Err(StaticMapError::EmptyCenter);
        }
        if self.zoom > MAX_ZOOM {
            return Err(StaticMapError::ZoomOutOfRange(self.zoom));
        }
        if let Some(scale) = self.scale {
            if scale != 1 && scale != 2 {
                return Err(StaticMapError::InvalidScale(scale));
            }
        }

        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| StaticMapError::InvalidEndpoint(format!("{}: {e}", self.endpoint)))?;
        if url.cannot_be_a_base() || url.query().is_some() || url.fragment().is_some() {
            return Err(StaticMapError::InvalidEndpoint(self.endpoint.clone()));
        }

        {
            let mut q = url.query_pairs_mut();
            q.append_pair("center", self.center.trim());
            q.append_pair("zoom", &self.zoom.to_string());
            q.append_pair("size", &self.size.to_string());
            if let Some(scale) = self.scale {
                q.append_pair("scale", &scale.to_string());
            }
            if let Some(maptype) = self.maptype {
                q.append_pair("maptype", maptype.as_str());
            }
            for marker in &self.markers {
                q.append_pair("markers", marker);
            }
            if let Some(key) = &self.key {
                q.append_pair("key", key);
            }
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size() -> MapSize {
        MapSize::new(600, 300).unwrap()
    }

    #[test]
    fn parses_size() {
        assert_eq!("640x320".parse::<MapSize>().unwrap(), MapSize::new(640, 320).unwrap());
        assert_eq!("10X20".parse::<MapSize>().unwrap().to_string(), "10x20");
        assert!(matches!(
            "640".parse::<MapSize>(),
            Err(StaticMapError::MalformedSize(_))
        ));
        assert_eq!(
            "641x10".parse::<MapSize>(),
            Err(StaticMapError::SizeOutOfRange(641, 10))
        );
        assert_eq!(
            MapSize::new(0, 10),
            Err(StaticMapError::SizeOutOfRange(0, 10))
        );
    }

    #[test]
    fn builds_query_in_fixed_order() {
        let url = StaticMapRequest::new("40.714728,-73.998672", 12, size())
            .maptype(MapType::Terrain)
            .marker("color:red|40.714728,-73.998672")
            .key("KEY")
            .to_url()
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://maps.googleapis.com/maps/api/staticmap?center=40.714728%2C-73.998672\
             &zoom=12&size=600x300&maptype=terrain\
             &markers=color%3Ared%7C40.714728%2C-73.998672&key=KEY"
        );
    }

    #[test]
    fn encodes_address_centers() {
        let url = StaticMapRequest::new("Zürich", 10, size()).to_url().unwrap();
        assert_eq!(url.query(), Some("center=Z%C3%BCrich&zoom=10&size=600x300"));
    }

    #[test]
    fn custom_endpoint() {
        let url = StaticMapRequest::new("1,2", 3, size())
            .endpoint("http://localhost:8080/staticmap")
            .scale(2)
            .to_url()
            .unwrap();
        assert_eq!(url.path(), "/staticmap");
        assert_eq!(url.query(), Some("center=1%2C2&zoom=3&size=600x300&scale=2"));
    }

    #[test]
    fn rejects_invalid_values() {
        assert_eq!(
            StaticMapRequest::new(" ", 3, size()).to_url(),
            Err(StaticMapError::EmptyCenter)
        );
        assert_eq!(
            StaticMapRequest::new("1,2", 22, size()).to_url(),
            Err(StaticMapError::ZoomOutOfRange(22))
        );
        assert_eq!(
            StaticMapRequest::new("1,2", 3, size()).scale(4).to_url(),
            Err(StaticMapError::InvalidScale(4))
        );
        assert!(matches!(
            StaticMapRequest::new("1,2", 3, size())
                .endpoint("https://example.com/map?x=1")
                .to_url(),
            Err(StaticMapError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn maptype_parses_case_insensitively() {
        assert_eq!("Hybrid".parse::<MapType>().unwrap(), MapType::Hybrid);
        assert!("moon".parse::<MapType>().is_err());
    }
}
