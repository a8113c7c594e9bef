use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::models::booking::{BookingRecord, BookingRequest, BookingStep, PaymentDetails, PaymentInfo};
use crate::models::movie::MovieShowtime;
use crate::models::seat::{BookedSeat, Seat};
use crate::services::catalog_service::CatalogService;
use crate::services::seat_service::{generate_seats, SeatSelection};
use crate::services::user_service::{Session, UserService};
use crate::store::StorageBackend;
use crate::utils::error::{AppError, AppResult, Redirect};

/// One pass through SelectShowtime -> ChooseSeats -> Payment -> Confirmed.
///
/// The wizard only moves one step at a time. `Confirmed` is reached through
/// [`BookingWizard::confirm_payment`] and nothing can be changed after it.
#[derive(Debug)]
pub struct BookingWizard {
    movie_id: String,
    movie_title: String,
    hall_name: String,
    showtime: MovieShowtime,
    step: BookingStep,
    selected_time: Option<String>,
    seats: Vec<Seat>,
    selection: SeatSelection,
    booking: Option<BookingRecord>,
}

impl BookingWizard {
    pub fn start(session: &Session, catalog: &CatalogService, request: BookingRequest) -> AppResult<Self> {
        if !session.is_authenticated() {
            return Err(Redirect::Login.into());
        }

        let movie = catalog.require_movie(&request.movie_id)?;

        let back_to_movie = || AppError::Redirect(Redirect::MovieDetails(movie.id.clone()));
        let hall_id = request.hall_id.as_deref().ok_or_else(back_to_movie)?;
        let (hall, showtime) = catalog
            .find_showtime(hall_id, &movie.id)
            .ok_or_else(back_to_movie)?;

        let selected_time = match request.show_time {
            Some(time) if showtime.show_times.contains(&time) => Some(time),
            Some(_) => return Err(back_to_movie()),
            None => showtime.show_times.first().cloned(),
        };

        debug!(movie_id = %movie.id, hall_id = %hall.id, "booking started");

        Ok(BookingWizard {
            movie_id: movie.id.clone(),
            movie_title: movie.title.clone(),
            hall_name: hall.name.clone(),
            seats: generate_seats(showtime.price.as_ref()),
            showtime: showtime.clone(),
            step: BookingStep::SelectShowtime,
            selected_time,
            selection: SeatSelection::new(),
            booking: None,
        })
    }

    pub fn step(&self) -> BookingStep {
        self.step
    }

    pub fn movie_title(&self) -> &str {
        &self.movie_title
    }

    pub fn hall_name(&self) -> &str {
        &self.hall_name
    }

    pub fn show_times(&self) -> &[String] {
        &self.showtime.show_times
    }

    pub fn selected_time(&self) -> Option<&str> {
        self.selected_time.as_deref()
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn selection(&self) -> &SeatSelection {
        &self.selection
    }

    pub fn total(&self) -> Decimal {
        self.selection.total()
    }

    pub fn booking(&self) -> Option<&BookingRecord> {
        self.booking.as_ref()
    }

    pub fn select_showtime(&mut self, time: &str) -> AppResult<()> {
        self.expect_step(BookingStep::SelectShowtime)?;

        if !self.showtime.show_times.iter().any(|t| t == time) {
            return Err(AppError::ValidationError(format!(
                "{} is not a show time for this hall",
                time
            )));
        }
        self.selected_time = Some(time.to_string());
        Ok(())
    }

    // Returns whether the seat is selected afterwards; booked seats stay unselected
    pub fn toggle_seat(&mut self, seat_id: &str) -> AppResult<bool> {
        self.expect_step(BookingStep::ChooseSeats)?;

        let seat = self
            .seats
            .iter()
            .find(|seat| seat.id == seat_id)
            .ok_or_else(|| AppError::NotFound(format!("Seat {} not found", seat_id)))?;
        Ok(self.selection.toggle(seat))
    }

    pub fn next(&mut self) -> AppResult<BookingStep> {
        self.step = match self.step {
            BookingStep::SelectShowtime => {
                if self.selected_time.is_none() {
                    return Err(AppError::BadRequest("Select a show time first".into()));
                }
                BookingStep::ChooseSeats
            }
            BookingStep::ChooseSeats => {
                if self.selection.is_empty() {
                    return Err(AppError::BadRequest("Select at least one seat".into()));
                }
                BookingStep::Payment
            }
            BookingStep::Payment => {
                return Err(AppError::BadRequest(
                    "Confirm the payment to finish the booking".into(),
                ))
            }
            BookingStep::Confirmed => {
                return Err(AppError::BadRequest("Booking is already confirmed".into()))
            }
        };
        Ok(self.step)
    }

    pub fn back(&mut self) -> AppResult<BookingStep> {
        self.step = match self.step {
            BookingStep::ChooseSeats => BookingStep::SelectShowtime,
            BookingStep::Payment => BookingStep::ChooseSeats,
            BookingStep::SelectShowtime => {
                return Err(AppError::BadRequest("Already at the first step".into()))
            }
            BookingStep::Confirmed => {
                return Err(AppError::BadRequest("Booking is already confirmed".into()))
            }
        };
        Ok(self.step)
    }

    /// Take payment, write the booking to the user's history and close the wizard.
    ///
    /// Nothing is recorded unless the session has a profile and the card form
    /// is valid. A phone number that differs from the profile's is saved to it.
    pub fn confirm_payment<S: StorageBackend>(
        &mut self,
        users: &mut UserService<S>,
        session: &mut Session,
        payment: PaymentDetails,
    ) -> AppResult<BookingRecord> {
        self.expect_step(BookingStep::Payment)?;

        let profile_phone = match session.profile() {
            Some(profile) => profile.phone.clone(),
            None => return Err(Redirect::Login.into()),
        };
        payment.check()?;

        let showtime = self
            .selected_time
            .clone()
            .ok_or_else(|| AppError::BadRequest("Select a show time first".into()))?;

        let phone = payment.phone.trim();
        let new_phone = (!phone.is_empty() && phone != profile_phone).then_some(phone);

        let seats: Vec<BookedSeat> = self.selection.seats().map(BookedSeat::from).collect();
        let payment_info = PaymentInfo::from_details(&payment, self.selection.total());
        let record = BookingRecord::new(
            self.movie_id.as_str(),
            self.movie_title.as_str(),
            self.hall_name.as_str(),
            showtime,
            seats,
            payment_info,
        );

        users.record_booking(session, record.clone(), new_phone)?;

        info!(
            booking_id = %record.booking_id(),
            movie = %record.movie_title(),
            seats = record.selected_seats().len(),
            total = %record.total_amount(),
            "booking confirmed"
        );

        self.selection.clear();
        self.step = BookingStep::Confirmed;
        self.booking = Some(record.clone());
        Ok(record)
    }

    fn expect_step(&self, step: BookingStep) -> AppResult<()> {
        if self.step != step {
            return Err(AppError::BadRequest(format!(
                "Not available during {}",
                self.step
            )));
        }
        Ok(())
    }
}
