use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use validator::Validate;

use crate::models::booking::BookingRecord;

// A registered user as persisted by the storage backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub booking_history: Vec<BookingRecord>,
    #[serde(default)]
    pub wishlist: Vec<String>,
    #[serde(default)]
    pub reminders: Vec<Reminder>,
}

impl UserRecord {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            email: self.email.clone(),
            name: self.name.clone(),
            phone: self.phone.clone(),
            booking_history: self.booking_history.clone(),
            wishlist: self.wishlist.clone(),
            reminders: self.reminders.clone(),
        }
    }
}

// The signed-in user's view of their account, without credentials
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub booking_history: Vec<BookingRecord>,
    pub wishlist: Vec<String>,
    pub reminders: Vec<Reminder>,
}

impl UserProfile {
    pub fn is_in_wishlist(&self, movie_id: &str) -> bool {
        self.wishlist.iter().any(|id| id == movie_id)
    }
}

#[derive(Debug, Clone, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// Partial profile update, None leaves the field as it is
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReminderLead {
    OneDay,
    ThreeDays,
    OneWeek,
}

impl ReminderLead {
    pub fn days(&self) -> i64 {
        match self {
            ReminderLead::OneDay => 1,
            ReminderLead::ThreeDays => 3,
            ReminderLead::OneWeek => 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub movie_id: String,
    pub movie_title: String,
    pub release_date: NaiveDate,
    pub lead: ReminderLead,
    pub notification_time: DateTime<Utc>,
}
