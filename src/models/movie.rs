use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::seat::Tier;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub user_id: String,
    pub rating: f32,
    pub comment: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub description: String,
    pub language: String,
    pub duration_minutes: u32,
    // 0.0 to 5.0, unrated releases carry 0.0
    pub rating: f32,
    pub category: String,
    pub cast: Vec<String>,
    pub director: String,
    pub release_date: NaiveDate,
    pub poster_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailer: Option<String>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Movie {
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.release_date > today
    }

    // "3h 2m" style label for listings
    pub fn duration_label(&self) -> String {
        let hours = self.duration_minutes / 60;
        let minutes = self.duration_minutes % 60;
        match (hours, minutes) {
            (0, m) => format!("{}m", m),
            (h, 0) => format!("{}h", h),
            (h, m) => format!("{}h {}m", h, m),
        }
    }
}

// Tier prices for one showing, in the base currency unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTable {
    pub standard: Decimal,
    pub vip: Decimal,
    pub premium: Decimal,
}

impl PriceTable {
    pub fn price_for(&self, tier: Tier) -> Decimal {
        match tier {
            Tier::Standard => self.standard,
            Tier::Vip => self.vip,
            Tier::Premium => self.premium,
        }
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        PriceTable {
            standard: Decimal::from(150),
            vip: Decimal::from(250),
            premium: Decimal::from(350),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieShowtime {
    pub movie_id: String,
    pub show_times: Vec<String>,
    // Halls without their own pricing fall back to PriceTable::default()
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceTable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CinemaHall {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub features: Vec<String>,
    pub movies: Vec<MovieShowtime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: String,
    pub name: String,
    pub cinema_halls: Vec<CinemaHall>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub id: String,
    pub name: String,
    pub cities: Vec<City>,
}

// On-disk catalog document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFixture {
    pub version: u32,
    pub movies: Vec<Movie>,
    pub states: Vec<State>,
}

// Movie listing filter, a None field means "All"
#[derive(Debug, Clone, Default)]
pub struct MovieFilter {
    pub state_id: Option<String>,
    pub city_id: Option<String>,
    pub hall_id: Option<String>,
    pub search: Option<String>,
    pub language: Option<String>,
    pub category: Option<String>,
}

// A hall screening a particular movie, with where it sits in the location tree
#[derive(Debug, Clone, Copy)]
pub struct Showing<'a> {
    pub state: &'a State,
    pub city: &'a City,
    pub hall: &'a CinemaHall,
    pub showtime: &'a MovieShowtime,
}
