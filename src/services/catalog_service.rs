use chrono::NaiveDate;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::models::movie::{
    CatalogFixture, CinemaHall, City, Movie, MovieFilter, MovieShowtime, Showing, State,
};
use crate::utils::error::{AppError, AppResult};

pub const SUPPORTED_FIXTURE_VERSION: u32 = 1;

// Read-only movie and location catalog
pub struct CatalogService {
    version: u32,
    movies: Vec<Movie>,
    states: Vec<State>,
}

impl CatalogService {
    pub fn new(fixture: CatalogFixture) -> AppResult<Self> {
        if fixture.version != SUPPORTED_FIXTURE_VERSION {
            return Err(AppError::ValidationError(format!(
                "Unsupported catalog version {} (expected {})",
                fixture.version, SUPPORTED_FIXTURE_VERSION
            )));
        }

        let mut seen = HashSet::new();
        for movie in &fixture.movies {
            if !seen.insert(movie.id.as_str()) {
                return Err(AppError::ValidationError(format!(
                    "Duplicate movie id {}",
                    movie.id
                )));
            }
        }

        // Hall ids are unique, and every showtime must point at a movie we can show
        let mut hall_ids = HashSet::new();
        for state in &fixture.states {
            for city in &state.cities {
                for hall in &city.cinema_halls {
                    if !hall_ids.insert(hall.id.as_str()) {
                        return Err(AppError::ValidationError(format!(
                            "Duplicate hall id {}",
                            hall.id
                        )));
                    }
                    if let Some(showtime) =
                        hall.movies.iter().find(|m| !seen.contains(m.movie_id.as_str()))
                    {
                        return Err(AppError::ValidationError(format!(
                            "Hall {} lists unknown movie {}",
                            hall.id, showtime.movie_id
                        )));
                    }
                }
            }
        }

        info!(
            version = fixture.version,
            movies = fixture.movies.len(),
            states = fixture.states.len(),
            "catalog loaded"
        );

        Ok(CatalogService {
            version: fixture.version,
            movies: fixture.movies,
            states: fixture.states,
        })
    }

    pub fn from_json(raw: &str) -> AppResult<Self> {
        let fixture: CatalogFixture = serde_json::from_str(raw)
            .map_err(|e| AppError::ValidationError(format!("Invalid catalog fixture: {}", e)))?;
        Self::new(fixture)
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AppError::NotFound(format!("Catalog fixture {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn get_all_movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn get_movie_by_id(&self, movie_id: &str) -> Option<&Movie> {
        self.movies.iter().find(|movie| movie.id == movie_id)
    }

    pub fn require_movie(&self, movie_id: &str) -> AppResult<&Movie> {
        self.get_movie_by_id(movie_id)
            .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", movie_id)))
    }

    pub fn get_movies_by_category(&self, category: &str) -> Vec<&Movie> {
        self.movies
            .iter()
            .filter(|movie| movie.category == category)
            .collect()
    }

    // Distinct categories in catalog order
    pub fn get_all_categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.movies
            .iter()
            .map(|movie| movie.category.as_str())
            .filter(|category| seen.insert(*category))
            .collect()
    }

    pub fn get_languages(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.movies
            .iter()
            .map(|movie| movie.language.as_str())
            .filter(|language| seen.insert(*language))
            .collect()
    }

    // Movies screened anywhere in the state, in catalog order
    pub fn get_movies_by_state(&self, state_id: &str) -> Vec<&Movie> {
        match self.find_state(state_id) {
            Some(state) => {
                let ids: HashSet<&str> = state
                    .cities
                    .iter()
                    .flat_map(|city| city.cinema_halls.iter())
                    .flat_map(|hall| hall.movies.iter())
                    .map(|showtime| showtime.movie_id.as_str())
                    .collect();
                self.movies_with_ids(&ids)
            }
            None => Vec::new(),
        }
    }

    pub fn find_state(&self, state_id: &str) -> Option<&State> {
        self.states.iter().find(|state| state.id == state_id)
    }

    pub fn find_city(&self, state_id: &str, city_id: &str) -> Option<&City> {
        self.find_state(state_id)?
            .cities
            .iter()
            .find(|city| city.id == city_id)
    }

    pub fn find_hall(&self, state_id: &str, city_id: &str, hall_id: &str) -> Option<&CinemaHall> {
        self.find_city(state_id, city_id)?
            .cinema_halls
            .iter()
            .find(|hall| hall.id == hall_id)
    }

    // Hall ids are unique across the catalog, so the booking flow only carries the hall id
    pub fn find_showtime(&self, hall_id: &str, movie_id: &str) -> Option<(&CinemaHall, &MovieShowtime)> {
        self.halls()
            .find(|hall| hall.id == hall_id)
            .and_then(|hall| {
                hall.movies
                    .iter()
                    .find(|showtime| showtime.movie_id == movie_id)
                    .map(|showtime| (hall, showtime))
            })
    }

    pub fn showings_for_movie(&self, movie_id: &str) -> Vec<Showing<'_>> {
        let mut showings = Vec::new();
        for state in &self.states {
            for city in &state.cities {
                for hall in &city.cinema_halls {
                    for showtime in hall.movies.iter().filter(|s| s.movie_id == movie_id) {
                        showings.push(Showing {
                            state,
                            city,
                            hall,
                            showtime,
                        });
                    }
                }
            }
        }
        showings
    }

    pub fn filter_movies(&self, filter: &MovieFilter) -> Vec<&Movie> {
        let mut movies: Vec<&Movie> = match self.location_movie_ids(filter) {
            Some(ids) => self.movies_with_ids(&ids),
            None => self.movies.iter().collect(),
        };

        if let Some(query) = filter.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let query = query.to_lowercase();
            movies.retain(|movie| {
                movie.title.to_lowercase().contains(&query)
                    || movie.description.to_lowercase().contains(&query)
            });
        }

        if let Some(language) = &filter.language {
            movies.retain(|movie| &movie.language == language);
        }

        if let Some(category) = &filter.category {
            movies.retain(|movie| &movie.category == category);
        }

        movies
    }

    pub fn featured(&self, count: usize) -> Vec<&Movie> {
        self.movies.iter().take(count).collect()
    }

    // Highest rated first, ties keep catalog order
    pub fn trending(&self, count: usize) -> Vec<&Movie> {
        let mut movies: Vec<&Movie> = self.movies.iter().collect();
        movies.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        movies.truncate(count);
        movies
    }

    pub fn upcoming(&self, today: NaiveDate, count: usize) -> Vec<&Movie> {
        self.movies
            .iter()
            .filter(|movie| movie.is_upcoming(today))
            .take(count)
            .collect()
    }

    fn halls(&self) -> impl Iterator<Item = &CinemaHall> {
        self.states
            .iter()
            .flat_map(|state| state.cities.iter())
            .flat_map(|city| city.cinema_halls.iter())
    }

    fn movies_with_ids(&self, ids: &HashSet<&str>) -> Vec<&Movie> {
        self.movies
            .iter()
            .filter(|movie| ids.contains(movie.id.as_str()))
            .collect()
    }

    // None when the filter has no location, otherwise the movie ids screened there
    fn location_movie_ids(&self, filter: &MovieFilter) -> Option<HashSet<&str>> {
        let state_id = filter.state_id.as_deref()?;

        let halls: Vec<&CinemaHall> = match (filter.city_id.as_deref(), filter.hall_id.as_deref()) {
            (Some(city_id), Some(hall_id)) => {
                self.find_hall(state_id, city_id, hall_id).into_iter().collect()
            }
            (Some(city_id), None) => self
                .find_city(state_id, city_id)
                .map(|city| city.cinema_halls.iter().collect())
                .unwrap_or_default(),
            (None, _) => self
                .find_state(state_id)
                .map(|state| {
                    state
                        .cities
                        .iter()
                        .flat_map(|city| city.cinema_halls.iter())
                        .collect()
                })
                .unwrap_or_default(),
        };

        Some(
            halls
                .into_iter()
                .flat_map(|hall| hall.movies.iter())
                .map(|showtime| showtime.movie_id.as_str())
                .collect(),
        )
    }
}
