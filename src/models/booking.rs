use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use uuid::Uuid;
use validator::Validate;

use crate::models::seat::BookedSeat;
use crate::utils::error::{AppError, AppResult};

// Wizard stages, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
pub enum BookingStep {
    #[strum(serialize = "Select Showtime")]
    SelectShowtime,
    #[strum(serialize = "Choose Seats")]
    ChooseSeats,
    #[strum(serialize = "Payment")]
    Payment,
    #[strum(serialize = "Confirmed")]
    Confirmed,
}

// What the movie page hands to the booking wizard
#[derive(Debug, Clone, Default)]
pub struct BookingRequest {
    pub movie_id: String,
    pub hall_id: Option<String>,
    pub show_time: Option<String>,
}

// Card form as entered on the payment step
#[derive(Debug, Clone, Validate)]
pub struct PaymentDetails {
    #[validate(length(min = 12, max = 23, message = "Card number must have 12 to 19 digits"))]
    pub card_number: String,
    #[validate(length(min = 1, message = "Card holder name is required"))]
    pub card_holder: String,
    #[validate(length(equal = 5, message = "Expiry date must be MM/YY"))]
    pub expiry_date: String,
    #[validate(length(min = 3, max = 4, message = "CVV must be 3 or 4 digits"))]
    pub cvv: String,
    pub phone: String,
    pub payment_method: String,
    pub payment_gateway: String,
}

impl PaymentDetails {
    // Field lengths via validator, then the digit and date shapes it can't express
    pub fn check(&self) -> AppResult<()> {
        self.validate()?;

        let digits = self.card_digits();
        if !(12..=19).contains(&digits.len())
            || self.card_number.chars().any(|c| !c.is_ascii_digit() && c != ' ')
        {
            return Err(AppError::ValidationError(
                "Card number must have 12 to 19 digits".into(),
            ));
        }

        if !self.cvv.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::ValidationError(
                "CVV must be 3 or 4 digits".into(),
            ));
        }

        let month = self
            .expiry_date
            .split_once('/')
            .filter(|(mm, yy)| {
                mm.len() == 2
                    && mm.chars().all(|c| c.is_ascii_digit())
                    && yy.len() == 2
                    && yy.chars().all(|c| c.is_ascii_digit())
            })
            .and_then(|(mm, _)| mm.parse::<u32>().ok());
        match month {
            Some(1..=12) => Ok(()),
            _ => Err(AppError::ValidationError("Expiry date must be MM/YY".into())),
        }
    }

    pub fn card_digits(&self) -> String {
        self.card_number.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    pub fn masked_card_number(&self) -> String {
        let digits = self.card_digits();
        let last_four = &digits[digits.len().saturating_sub(4)..];
        format!("**** **** **** {}", last_four)
    }
}

impl Default for PaymentDetails {
    fn default() -> Self {
        PaymentDetails {
            card_number: String::new(),
            card_holder: String::new(),
            expiry_date: String::new(),
            cvv: String::new(),
            phone: String::new(),
            payment_method: "card".to_string(),
            payment_gateway: "mock".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub payment_id: String,
    pub timestamp: DateTime<Utc>,
    pub card_number: String,
    pub card_holder: String,
    pub phone: String,
    pub amount: Decimal,
    pub payment_method: String,
    pub payment_gateway: String,
}

impl PaymentInfo {
    pub fn from_details(details: &PaymentDetails, amount: Decimal) -> Self {
        PaymentInfo {
            payment_id: format!("PAY{}", Uuid::new_v4().simple()),
            timestamp: Utc::now(),
            card_number: details.masked_card_number(),
            card_holder: details.card_holder.trim().to_string(),
            phone: details.phone.trim().to_string(),
            amount,
            payment_method: details.payment_method.clone(),
            payment_gateway: details.payment_gateway.clone(),
        }
    }
}

/// Receipt of a completed purchase.
///
/// Fields are only reachable through getters, and the total is derived from
/// the seats at construction, so a record can't drift from what was paid for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRecord {
    booking_id: String,
    movie_id: String,
    movie_title: String,
    hall_name: String,
    showtime: String,
    selected_seats: Vec<BookedSeat>,
    total_amount: Decimal,
    payment_info: PaymentInfo,
    booking_date: DateTime<Utc>,
}

impl BookingRecord {
    pub fn new(
        movie_id: impl Into<String>,
        movie_title: impl Into<String>,
        hall_name: impl Into<String>,
        showtime: impl Into<String>,
        selected_seats: Vec<BookedSeat>,
        payment_info: PaymentInfo,
    ) -> Self {
        let total_amount = selected_seats.iter().map(|seat| seat.price).sum();
        BookingRecord {
            booking_id: format!("BK{}", Uuid::new_v4().simple()),
            movie_id: movie_id.into(),
            movie_title: movie_title.into(),
            hall_name: hall_name.into(),
            showtime: showtime.into(),
            selected_seats,
            total_amount,
            payment_info,
            booking_date: Utc::now(),
        }
    }

    pub fn booking_id(&self) -> &str {
        &self.booking_id
    }

    pub fn movie_id(&self) -> &str {
        &self.movie_id
    }

    pub fn movie_title(&self) -> &str {
        &self.movie_title
    }

    pub fn hall_name(&self) -> &str {
        &self.hall_name
    }

    pub fn showtime(&self) -> &str {
        &self.showtime
    }

    pub fn selected_seats(&self) -> &[BookedSeat] {
        &self.selected_seats
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn payment_info(&self) -> &PaymentInfo {
        &self.payment_info
    }

    pub fn booking_date(&self) -> DateTime<Utc> {
        self.booking_date
    }
}
