//! Kitchen stations and the keyword router that assigns dishes to them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Preparation area of the kitchen. `All` is both the supervisor role and the
/// catch-all bucket for dishes the router cannot classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Station {
    Fry,
    Curry,
    Rice,
    Starter,
    Dessert,
    Prep,
    All,
}

impl Station {
    /// Whether bulk and single-item actions issued as `self` may touch an item
    /// tagged with `item_station`.
    pub fn acts_on(&self, item_station: Station) -> bool {
        *self == Station::All || *self == item_station
    }

    /// Whether a display bound to `self` shows an item tagged with `item_station`.
    pub fn sees(&self, item_station: Station) -> bool {
        self.acts_on(item_station) || item_station == Station::All
    }

    pub fn is_supervisor(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl Default for Station {
    fn default() -> Self {
        Self::All
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fry => write!(f, "FRY"),
            Self::Curry => write!(f, "CURRY"),
            Self::Rice => write!(f, "RICE"),
            Self::Starter => write!(f, "STARTER"),
            Self::Dessert => write!(f, "DESSERT"),
            Self::Prep => write!(f, "PREP"),
            Self::All => write!(f, "ALL"),
        }
    }
}

impl std::str::FromStr for Station {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FRY" => Ok(Self::Fry),
            "CURRY" => Ok(Self::Curry),
            "RICE" => Ok(Self::Rice),
            "STARTER" => Ok(Self::Starter),
            "DESSERT" => Ok(Self::Dessert),
            "PREP" => Ok(Self::Prep),
            "ALL" => Ok(Self::All),
            _ => Err(format!("Invalid station: {s}")),
        }
    }
}

/// One row of the routing table: any keyword contained in a dish name sends it to `station`.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct RouteRule {
    pub station: Station,
    pub keywords: Vec<String>,
}

impl RouteRule {
    pub fn new<I, S>(station: Station, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            station,
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
        }
    }

    fn matches(&self, lowered_name: &str) -> bool {
        self.keywords.iter().any(|k| lowered_name.contains(k.as_str()))
    }
}

/// Parses `STATION:keyword,keyword`, e.g. `PREP:naan,roti`.
impl std::str::FromStr for RouteRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (station, keywords) = s
            .split_once(':')
            .ok_or_else(|| format!("Invalid route {s}, expected STATION:keyword,..."))?;
        let keywords: Vec<&str> = keywords
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            return Err(format!("Route {s} has no keywords"));
        }
        Ok(Self::new(station.parse()?, keywords))
    }
}

/// Ordered keyword table; the first matching rule wins.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct StationRouter {
    rules: Vec<RouteRule>,
}

impl Default for StationRouter {
    fn default() -> Self {
        Self {
            rules: vec![
                RouteRule::new(Station::Curry, ["curry", "paneer", "dal"]),
                RouteRule::new(Station::Rice, ["rice", "biryani"]),
                RouteRule::new(Station::Fry, ["fry", "65", "manchurian"]),
                RouteRule::new(Station::Starter, ["starter", "soup"]),
                RouteRule::new(Station::Dessert, ["dessert", "sweet", "jamun", "cake"]),
            ],
        }
    }
}

impl StationRouter {
    /// Appends a rule after the existing ones, so it only applies to names
    /// nothing earlier claimed.
    pub fn push_rule(&mut self, rule: RouteRule) {
        self.rules.push(rule);
    }

    pub fn route(&self, item_name: &str) -> Station {
        let lowered = item_name.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.station)
            .unwrap_or(Station::All)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_routes_known_dishes() {
        let router = StationRouter::default();
        assert_eq!(router.route("Butter Chicken Curry"), Station::Curry);
        assert_eq!(router.route("Dal Makhani"), Station::Curry);
        assert_eq!(router.route("Veg Biryani"), Station::Rice);
        assert_eq!(router.route("Chicken 65"), Station::Fry);
        assert_eq!(router.route("Gobi Manchurian"), Station::Fry);
        assert_eq!(router.route("Tomato Soup"), Station::Starter);
        assert_eq!(router.route("Gulab Jamun"), Station::Dessert);
    }

    #[test]
    fn test_routing_is_case_insensitive() {
        let router = StationRouter::default();
        assert_eq!(router.route("PANEER TIKKA"), Station::Curry);
        assert_eq!(router.route("chocolate CAKE"), Station::Dessert);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let router = StationRouter::default();
        // "paneer" (CURRY) precedes "rice" and "fry" in the table
        assert_eq!(router.route("Paneer Fried Rice"), Station::Curry);
        // "rice" precedes "fry"
        assert_eq!(router.route("Egg Fried Rice"), Station::Rice);
    }

    #[test]
    fn test_unmatched_names_fall_back_to_all() {
        let router = StationRouter::default();
        assert_eq!(router.route("Naan"), Station::All);
        assert_eq!(router.route(""), Station::All);
    }

    #[test]
    fn test_pushed_rules_extend_the_table() {
        let mut router = StationRouter::default();
        router.push_rule(RouteRule::new(Station::Prep, ["Naan", "roti"]));
        assert_eq!(router.route("Garlic Naan"), Station::Prep);
        assert_eq!(router.route("Dal Roti Combo"), Station::Curry);
    }

    #[test]
    fn test_route_rule_parsing() {
        let rule: RouteRule = " prep : Naan, roti ,".parse().unwrap();
        assert_eq!(rule, RouteRule::new(Station::Prep, ["naan", "roti"]));

        assert!("naan,roti".parse::<RouteRule>().is_err());
        assert!("PREP:".parse::<RouteRule>().is_err());
        assert!("GRILL:naan".parse::<RouteRule>().is_err());
    }

    #[test]
    fn test_station_visibility() {
        assert!(Station::All.acts_on(Station::Fry));
        assert!(Station::Fry.acts_on(Station::Fry));
        assert!(!Station::Fry.acts_on(Station::Curry));
        assert!(!Station::Fry.acts_on(Station::All));
        assert!(Station::Fry.sees(Station::All));
        assert!(!Station::Fry.sees(Station::Rice));
    }

    #[test]
    fn test_station_string_conversion() {
        assert_eq!(Station::Dessert.to_string(), "DESSERT");
        assert_eq!("prep".parse::<Station>().unwrap(), Station::Prep);
        assert!("grill".parse::<Station>().is_err());
        assert_eq!(serde_json::to_string(&Station::Fry).unwrap(), "\"FRY\"");
    }
}
