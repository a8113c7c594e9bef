use bcrypt::{hash, verify};
use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing::{debug, info, warn};
use validator::Validate;

use crate::models::booking::BookingRecord;
use crate::models::movie::Movie;
use crate::models::user::{
    LoginRequest, ProfileUpdate, Reminder, ReminderLead, SignupRequest, UserProfile, UserRecord,
};
use crate::store::{StorageBackend, StoreData};
use crate::utils::error::{AppError, AppResult};

// Who is signed in for this storefront run
#[derive(Debug, Clone, Default)]
pub struct Session {
    profile: Option<UserProfile>,
}

impl Session {
    pub fn anonymous() -> Self {
        Session::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.profile.is_some()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn email(&self) -> Option<&str> {
        self.profile.as_ref().map(|profile| profile.email.as_str())
    }
}

/// Accounts, sign-in and everything stored against a user profile.
///
/// Profile operations take the caller's [`Session`]; without a signed-in
/// profile they change nothing and return `Ok`.
pub struct UserService<S: StorageBackend> {
    storage: S,
    bcrypt_cost: u32,
}

impl<S: StorageBackend> UserService<S> {
    pub fn new(storage: S, bcrypt_cost: u32) -> Self {
        UserService {
            storage,
            bcrypt_cost,
        }
    }

    // Register a new user and sign them in
    pub fn signup(&mut self, session: &mut Session, request: SignupRequest) -> AppResult<UserProfile> {
        let request = SignupRequest {
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            ..request
        };
        request.validate()?;

        let mut data = self.storage.load()?;
        if data.find_user(&request.email).is_some() {
            return Err(AppError::Conflict("User already exists".into()));
        }

        let password_hash = hash(request.password.as_bytes(), self.bcrypt_cost)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        data.users.push(UserRecord {
            email: request.email.clone(),
            password_hash,
            name: request.name,
            phone: String::new(),
            booking_history: Vec::new(),
            wishlist: Vec::new(),
            reminders: Vec::new(),
        });
        self.storage.save(&data)?;
        info!(email = %request.email, "user registered");

        self.login(
            session,
            LoginRequest {
                email: request.email,
                password: request.password,
            },
        )
    }

    pub fn login(&mut self, session: &mut Session, request: LoginRequest) -> AppResult<UserProfile> {
        let mut data = self.storage.load()?;

        let invalid = || {
            AppError::AuthError("Invalid credentials or user not found. Please sign up first.".into())
        };
        let user = data.find_user(request.email.trim()).ok_or_else(invalid)?;

        let password_matches = verify(request.password.as_bytes(), &user.password_hash)
            .map_err(|e| AppError::AuthError(e.to_string()))?;
        if !password_matches {
            return Err(invalid());
        }

        let profile = user.profile();
        data.session = Some(profile.email.clone());
        self.storage.save(&data)?;

        info!(email = %profile.email, "user signed in");
        session.profile = Some(profile.clone());
        Ok(profile)
    }

    pub fn logout(&mut self, session: &mut Session) -> AppResult<()> {
        if let Some(email) = session.email() {
            info!(email = %email, "user signed out");
        }
        session.profile = None;

        let mut data = self.storage.load()?;
        data.session = None;
        self.storage.save(&data)
    }

    // Rebuild the session left behind by a previous run
    pub fn restore_session(&self) -> AppResult<Session> {
        let data = self.storage.load()?;
        let profile = match data.session.as_deref() {
            Some(email) => match data.find_user(email) {
                Some(user) => Some(user.profile()),
                None => {
                    warn!(email = %email, "stored session points at an unknown user");
                    None
                }
            },
            None => None,
        };
        Ok(Session { profile })
    }

    pub fn update_profile(&mut self, session: &mut Session, update: ProfileUpdate) -> AppResult<()> {
        if !session.is_authenticated() {
            return Ok(());
        }
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(AppError::ValidationError("Name is required".into()));
            }
        }

        self.update_user(session, |user| {
            if let Some(name) = &update.name {
                user.name = name.trim().to_string();
            }
            if let Some(phone) = &update.phone {
                user.phone = phone.trim().to_string();
            }
        })
    }

    // Newest bookings come first in the history
    pub fn add_booking(&mut self, session: &mut Session, booking: BookingRecord) -> AppResult<()> {
        self.record_booking(session, booking, None)
    }

    // Store a booking and, when given, the phone entered at checkout in a single write
    pub fn record_booking(
        &mut self,
        session: &mut Session,
        booking: BookingRecord,
        phone: Option<&str>,
    ) -> AppResult<()> {
        let booking_id = booking.booking_id().to_string();
        self.update_user(session, move |user| {
            if let Some(phone) = phone {
                user.phone = phone.trim().to_string();
            }
            user.booking_history.insert(0, booking);
        })?;
        debug!(booking_id = %booking_id, "booking stored");
        Ok(())
    }

    pub fn add_to_wishlist(&mut self, session: &mut Session, movie_id: &str) -> AppResult<()> {
        if session
            .profile()
            .map_or(true, |profile| profile.is_in_wishlist(movie_id))
        {
            return Ok(());
        }

        self.update_user(session, |user| {
            if !user.wishlist.iter().any(|id| id == movie_id) {
                user.wishlist.push(movie_id.to_string());
            }
        })
    }

    pub fn remove_from_wishlist(&mut self, session: &mut Session, movie_id: &str) -> AppResult<()> {
        if !session
            .profile()
            .map_or(false, |profile| profile.is_in_wishlist(movie_id))
        {
            return Ok(());
        }

        self.update_user(session, |user| user.wishlist.retain(|id| id != movie_id))
    }

    // Schedule a reminder ahead of the movie's release, replacing any earlier one for it
    pub fn set_reminder(
        &mut self,
        session: &mut Session,
        movie: &Movie,
        lead: ReminderLead,
    ) -> AppResult<Option<Reminder>> {
        if !session.is_authenticated() {
            return Ok(None);
        }

        let release = movie
            .release_date
            .and_hms_opt(0, 0, 0)
            .map(|midnight| Utc.from_utc_datetime(&midnight))
            .ok_or_else(|| AppError::ValidationError("Invalid release date".into()))?;
        let reminder = Reminder {
            movie_id: movie.id.clone(),
            movie_title: movie.title.clone(),
            release_date: movie.release_date,
            lead,
            notification_time: release - Duration::days(lead.days()),
        };

        let stored = reminder.clone();
        self.update_user(session, move |user| {
            user.reminders.retain(|r| r.movie_id != stored.movie_id);
            user.reminders.push(stored);
        })?;
        Ok(Some(reminder))
    }

    pub fn due_reminders(&self, session: &Session, now: DateTime<Utc>) -> Vec<Reminder> {
        session
            .profile()
            .map(|profile| {
                profile
                    .reminders
                    .iter()
                    .filter(|reminder| reminder.notification_time <= now)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    // Apply a change to the signed-in user's stored record and refresh the session copy
    fn update_user<F>(&mut self, session: &mut Session, change: F) -> AppResult<()>
    where
        F: FnOnce(&mut UserRecord),
    {
        let email = match session.email() {
            Some(email) => email.to_string(),
            None => return Ok(()),
        };

        let mut data: StoreData = self.storage.load()?;
        let user = data
            .find_user_mut(&email)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", email)))?;
        change(user);
        let profile = user.profile();

        self.storage.save(&data)?;
        session.profile = Some(profile);
        Ok(())
    }
}
