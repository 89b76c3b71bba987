use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
}

impl Place {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lat: 0.0,
            lng: 0.0,
        }
    }
}

/// Undirected for layout and rendering purposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Road {
    pub from: String,
    pub to: String,
    pub cost: f64,
}

impl Road {
    pub fn new(from: impl Into<String>, to: impl Into<String>, cost: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            cost,
        }
    }
}

// Coordinates and costs compare bitwise so a NaN read from the wire equals
// itself and an unchanged snapshot is recognised as unchanged.
impl PartialEq for Place {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.lat.to_bits() == other.lat.to_bits()
            && self.lng.to_bits() == other.lng.to_bits()
    }
}

impl PartialEq for Road {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to && self.cost.to_bits() == other.cost.to_bits()
    }
}

/// Places and roads as served by the graph endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub places: Vec<Place>,
    #[serde(default)]
    pub roads: Vec<Road>,
}

impl GraphSnapshot {
    /// Builds a snapshot with name-unique places. The first place of a given
    /// name wins.
    pub fn new(places: Vec<Place>, roads: Vec<Road>) -> Self {
        let mut seen = HashSet::with_capacity(places.len());
        let mut unique = Vec::with_capacity(places.len());
        for place in places {
            if seen.contains(&place.name) {
                tracing::warn!(name = %place.name, "dropping duplicate place");
                continue;
            }
            seen.insert(place.name.clone());
            unique.push(place);
        }
        for road in &roads {
            if !road.cost.is_finite() || road.cost <= 0.0 {
                tracing::warn!(from = %road.from, to = %road.to, cost = road.cost, "road cost is not a positive number");
            }
        }
        Self {
            places: unique,
            roads,
        }
    }

    pub fn from_json(input: &str) -> Result<Self> {
        let raw: GraphSnapshot = serde_json::from_str(input)?;
        Ok(Self::new(raw.places, raw.roads))
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn place(&self, name: &str) -> Option<&Place> {
        self.places.iter().find(|p| p.name == name)
    }
}

/// Response of the route-query endpoint. An empty `path` means no route was found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    #[serde(default)]
    pub path: Vec<String>,
    #[serde(default)]
    pub total_cost: f64,
}

/// Ordered place names to highlight. May be empty, may repeat names, and may
/// name places or hops that do not exist in the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutePath(pub Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RouteInput {
    Response(RouteResponse),
    Names(Vec<String>),
}

impl RoutePath {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// Accepts either a route response object or a bare array of names.
    pub fn from_json(input: &str) -> Result<Self> {
        let parsed: RouteInput = serde_json::from_str(input)?;
        Ok(match parsed {
            RouteInput::Response(response) => Self::from(response),
            RouteInput::Names(names) => Self(names),
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consecutive pairs of route entries.
    pub fn hops(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .windows(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
    }
}

impl From<RouteResponse> for RoutePath {
    fn from(response: RouteResponse) -> Self {
        Self(response.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_graph_response() {
        let input = r#"{
            "places": [
                {"name": "Airport", "lat": 1.5, "lng": 2.5},
                {"name": "Campus", "lat": 0, "lng": 0}
            ],
            "roads": [{"from": "Airport", "to": "Campus", "cost": 7}]
        }"#;
        let graph = GraphSnapshot::from_json(input).unwrap();
        assert_eq!(graph.places.len(), 2);
        assert_eq!(graph.roads[0].cost, 7.0);
        assert_eq!(graph.place("Airport").unwrap().lat, 1.5);
    }

    #[test]
    fn duplicate_places_keep_first() {
        let mut second = Place::new("A");
        second.lat = 9.0;
        let graph = GraphSnapshot::new(vec![Place::new("A"), Place::new("B"), second], vec![]);
        assert_eq!(graph.places.len(), 2);
        assert_eq!(graph.place("A").unwrap().lat, 0.0);
    }

    #[test]
    fn route_accepts_response_and_bare_array() {
        let route = RoutePath::from_json(r#"{"path": ["A", "B"], "totalCost": 3}"#).unwrap();
        assert_eq!(route, RoutePath::new(["A", "B"]));
        let route = RoutePath::from_json(r#"["X", "Y", "Z"]"#).unwrap();
        assert_eq!(route.len(), 3);
        let hops: Vec<_> = route.hops().collect();
        assert_eq!(hops, vec![("X", "Y"), ("Y", "Z")]);
    }

    #[test]
    fn empty_route_response_means_no_route() {
        let route = RoutePath::from_json(r#"{"path": [], "totalCost": 0}"#).unwrap();
        assert!(route.is_empty());
        assert_eq!(route.hops().count(), 0);
    }

    #[test]
    fn nan_costs_compare_equal_to_themselves() {
        let graph = GraphSnapshot::new(
            vec![Place::new("A"), Place::new("B")],
            vec![Road::new("A", "B", f64::NAN)],
        );
        assert_eq!(graph, graph.clone());
        assert_ne!(graph.roads[0], Road::new("A", "B", 1.0));
        assert!(!graph.is_empty());
        assert!(GraphSnapshot::default().is_empty());
    }

    #[test]
    fn malformed_graph_is_an_error() {
        assert!(GraphSnapshot::from_json("{\"places\": 3}").is_err());
    }
}
