use cinema_booking::{
    models::booking::{BookingRequest, BookingStep, PaymentDetails},
    models::seat::Tier,
    services::booking_service::BookingWizard,
    services::catalog_service::CatalogService,
    services::user_service::{Session, UserService},
    store::{MemoryStorage, StorageBackend, StoreData},
    utils::error::{AppError, AppResult, Redirect},
};
use std::cell::Cell;
use std::rc::Rc;
use rust_decimal::Decimal;
use test_context::{test_context, TestContext};

mod common {
    pub mod test_utils;
}
use common::test_utils::{
    catalog, memory_user_service, signed_in, signup_request, valid_payment, TEST_BCRYPT_COST,
};

struct BookingContext {
    catalog: CatalogService,
    user_service: UserService<MemoryStorage>,
    storage: MemoryStorage,
    session: Session,
}

impl TestContext for BookingContext {
    fn setup() -> Self {
        let (mut user_service, storage) = memory_user_service();
        let session =
            signed_in(&mut user_service, "booker@example.com").expect("test user signs up");

        BookingContext {
            catalog: catalog(),
            user_service,
            storage,
            session,
        }
    }
}

// Hall without its own prices, so seats use 150 / 250 / 350
fn default_priced_request() -> BookingRequest {
    BookingRequest {
        movie_id: "action-3".to_string(),
        hall_id: Some("INOX_MALAD_1".to_string()),
        show_time: None,
    }
}

fn to_payment_step(wizard: &mut BookingWizard, seats: &[&str]) -> Result<(), AppError> {
    wizard.next()?;
    for seat in seats {
        wizard.toggle_seat(seat)?;
    }
    wizard.next()?;
    Ok(())
}

#[test_context(BookingContext)]
#[test]
fn test_booking_a1_b5_totals_400(ctx: &mut BookingContext) -> Result<(), AppError> {
    let mut wizard = BookingWizard::start(&ctx.session, &ctx.catalog, default_priced_request())?;
    assert_eq!(wizard.step(), BookingStep::SelectShowtime);
    assert_eq!(wizard.selected_time(), Some("11:00 AM"));

    to_payment_step(&mut wizard, &["A1", "B5"])?;
    assert_eq!(wizard.step(), BookingStep::Payment);
    assert_eq!(wizard.total(), Decimal::from(400));

    let record = wizard.confirm_payment(&mut ctx.user_service, &mut ctx.session, valid_payment())?;

    assert_eq!(record.total_amount(), Decimal::from(400));
    assert_eq!(record.movie_title(), "RRR");
    assert_eq!(record.hall_name(), "INOX Malad");
    assert_eq!(record.showtime(), "11:00 AM");
    let seat_ids: Vec<&str> = record.selected_seats().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(seat_ids, vec!["A1", "B5"]);
    assert_eq!(record.selected_seats()[1].tier, Tier::Vip);
    assert!(record.booking_id().starts_with("BK"));
    assert!(record.payment_info().payment_id.starts_with("PAY"));
    assert_eq!(record.payment_info().card_number, "**** **** **** 1111");
    assert_eq!(record.payment_info().amount, Decimal::from(400));

    assert_eq!(wizard.step(), BookingStep::Confirmed);
    assert!(wizard.selection().is_empty());
    assert_eq!(wizard.booking(), Some(&record));
    Ok(())
}

#[test_context(BookingContext)]
#[test]
fn test_confirmed_booking_is_stored_newest_first(ctx: &mut BookingContext) -> Result<(), AppError> {
    let mut first = BookingWizard::start(&ctx.session, &ctx.catalog, default_priced_request())?;
    to_payment_step(&mut first, &["C1"])?;
    let first = first.confirm_payment(&mut ctx.user_service, &mut ctx.session, valid_payment())?;

    let request = BookingRequest {
        movie_id: "action-1".to_string(),
        hall_id: Some("PVR_MUMBAI_1".to_string()),
        show_time: Some("6:00 PM".to_string()),
    };
    let mut second = BookingWizard::start(&ctx.session, &ctx.catalog, request)?;
    to_payment_step(&mut second, &["H9", "H10"])?;
    let second = second.confirm_payment(&mut ctx.user_service, &mut ctx.session, valid_payment())?;
    // Hall prices premium at 450
    assert_eq!(second.total_amount(), Decimal::from(900));

    let history = &ctx.session.profile().expect("signed in").booking_history;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0], second);
    assert_eq!(history[1], first);

    let saved = ctx.storage.snapshot();
    assert_eq!(saved.users[0].booking_history, *history);
    Ok(())
}

#[test_context(BookingContext)]
#[test]
fn test_start_requires_sign_in(ctx: &mut BookingContext) {
    let result = BookingWizard::start(&Session::anonymous(), &ctx.catalog, default_priced_request());
    assert!(matches!(result, Err(AppError::Redirect(Redirect::Login))));
}

#[test_context(BookingContext)]
#[test]
fn test_start_without_hall_redirects_to_movie(ctx: &mut BookingContext) {
    let no_hall = BookingRequest {
        hall_id: None,
        ..default_priced_request()
    };
    let wrong_hall = BookingRequest {
        hall_id: Some("INOX_BANGALORE_1".to_string()),
        ..default_priced_request()
    };
    let wrong_time = BookingRequest {
        show_time: Some("3:15 AM".to_string()),
        ..default_priced_request()
    };

    for request in [no_hall, wrong_hall, wrong_time] {
        match BookingWizard::start(&ctx.session, &ctx.catalog, request) {
            Err(AppError::Redirect(Redirect::MovieDetails(movie_id))) => {
                assert_eq!(movie_id, "action-3")
            }
            other => panic!("expected redirect to movie details, got {:?}", other),
        }
    }

    let unknown_movie = BookingRequest {
        movie_id: "missing".to_string(),
        ..default_priced_request()
    };
    assert!(matches!(
        BookingWizard::start(&ctx.session, &ctx.catalog, unknown_movie),
        Err(AppError::NotFound(_))
    ));
}

#[test_context(BookingContext)]
#[test]
fn test_finalize_without_profile_creates_nothing(ctx: &mut BookingContext) -> Result<(), AppError> {
    let mut wizard = BookingWizard::start(&ctx.session, &ctx.catalog, default_priced_request())?;
    to_payment_step(&mut wizard, &["A1", "B5"])?;

    // Signed out in another part of the app before paying
    ctx.user_service.logout(&mut ctx.session)?;
    let result = wizard.confirm_payment(&mut ctx.user_service, &mut ctx.session, valid_payment());

    assert!(matches!(result, Err(AppError::Redirect(Redirect::Login))));
    assert_eq!(wizard.step(), BookingStep::Payment);
    assert!(wizard.booking().is_none());
    assert_eq!(wizard.selection().len(), 2);
    assert!(ctx.storage.snapshot().users[0].booking_history.is_empty());
    Ok(())
}

#[test_context(BookingContext)]
#[test]
fn test_step_guards(ctx: &mut BookingContext) -> Result<(), AppError> {
    let mut wizard = BookingWizard::start(&ctx.session, &ctx.catalog, default_priced_request())?;

    // Seats can't be picked before the showtime step is done
    assert!(matches!(wizard.toggle_seat("A1"), Err(AppError::BadRequest(_))));
    assert!(matches!(wizard.back(), Err(AppError::BadRequest(_))));
    assert!(matches!(
        wizard.select_showtime("1:00 AM"),
        Err(AppError::ValidationError(_))
    ));
    wizard.select_showtime("9:30 PM")?;

    assert_eq!(wizard.next()?, BookingStep::ChooseSeats);
    assert!(matches!(wizard.next(), Err(AppError::BadRequest(_))));
    assert!(matches!(wizard.toggle_seat("Z99"), Err(AppError::NotFound(_))));
    assert!(matches!(
        wizard.select_showtime("11:00 AM"),
        Err(AppError::BadRequest(_))
    ));

    assert!(wizard.toggle_seat("D4")?);
    assert!(!wizard.toggle_seat("D4")?);
    assert!(wizard.toggle_seat("D4")?);
    assert_eq!(wizard.next()?, BookingStep::Payment);

    assert!(matches!(wizard.next(), Err(AppError::BadRequest(_))));
    assert!(matches!(wizard.toggle_seat("D5"), Err(AppError::BadRequest(_))));

    // Going back keeps the selection
    assert_eq!(wizard.back()?, BookingStep::ChooseSeats);
    assert!(wizard.selection().is_selected("D4"));
    assert_eq!(wizard.back()?, BookingStep::SelectShowtime);
    assert_eq!(wizard.selected_time(), Some("9:30 PM"));
    Ok(())
}

#[test_context(BookingContext)]
#[test]
fn test_confirmed_is_terminal(ctx: &mut BookingContext) -> Result<(), AppError> {
    let mut wizard = BookingWizard::start(&ctx.session, &ctx.catalog, default_priced_request())?;
    to_payment_step(&mut wizard, &["G2"])?;
    wizard.confirm_payment(&mut ctx.user_service, &mut ctx.session, valid_payment())?;

    assert!(matches!(wizard.next(), Err(AppError::BadRequest(_))));
    assert!(matches!(wizard.back(), Err(AppError::BadRequest(_))));
    assert!(matches!(wizard.toggle_seat("G3"), Err(AppError::BadRequest(_))));
    let again = wizard.confirm_payment(&mut ctx.user_service, &mut ctx.session, valid_payment());
    assert!(matches!(again, Err(AppError::BadRequest(_))));

    assert_eq!(ctx.storage.snapshot().users[0].booking_history.len(), 1);
    Ok(())
}

#[test_context(BookingContext)]
#[test]
fn test_invalid_payment_is_rejected(ctx: &mut BookingContext) -> Result<(), AppError> {
    let mut wizard = BookingWizard::start(&ctx.session, &ctx.catalog, default_priced_request())?;
    to_payment_step(&mut wizard, &["A1"])?;

    let bad_forms = [
        PaymentDetails {
            card_number: "4111".to_string(),
            ..valid_payment()
        },
        PaymentDetails {
            card_number: "4111-1111-1111-1111".to_string(),
            ..valid_payment()
        },
        PaymentDetails {
            card_holder: String::new(),
            ..valid_payment()
        },
        PaymentDetails {
            expiry_date: "13/29".to_string(),
            ..valid_payment()
        },
        PaymentDetails {
            expiry_date: "+1/29".to_string(),
            ..valid_payment()
        },
        PaymentDetails {
            cvv: "12a".to_string(),
            ..valid_payment()
        },
    ];

    for form in bad_forms {
        let result = wizard.confirm_payment(&mut ctx.user_service, &mut ctx.session, form);
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    assert_eq!(wizard.step(), BookingStep::Payment);
    assert!(ctx.storage.snapshot().users[0].booking_history.is_empty());
    Ok(())
}

#[test_context(BookingContext)]
#[test]
fn test_new_phone_at_payment_updates_profile(ctx: &mut BookingContext) -> Result<(), AppError> {
    let mut wizard = BookingWizard::start(&ctx.session, &ctx.catalog, default_priced_request())?;
    to_payment_step(&mut wizard, &["E5"])?;

    let payment = PaymentDetails {
        phone: "9123456780".to_string(),
        ..valid_payment()
    };
    let record = wizard.confirm_payment(&mut ctx.user_service, &mut ctx.session, payment)?;

    assert_eq!(record.payment_info().phone, "9123456780");
    assert_eq!(ctx.session.profile().map(|p| p.phone.as_str()), Some("9123456780"));
    assert_eq!(ctx.storage.snapshot().users[0].phone, "9123456780");
    Ok(())
}

#[test_context(BookingContext)]
#[test]
fn test_seat_map_uses_hall_prices(ctx: &mut BookingContext) -> Result<(), AppError> {
    let request = BookingRequest {
        movie_id: "action-2".to_string(),
        hall_id: Some("INOX_BANGALORE_1".to_string()),
        show_time: None,
    };
    let wizard = BookingWizard::start(&ctx.session, &ctx.catalog, request)?;

    assert_eq!(wizard.seats().len(), 80);
    assert_eq!(wizard.hall_name(), "INOX Forum Mall");
    assert_eq!(wizard.show_times().len(), 4);
    let price_of = |id: &str| wizard.seats().iter().find(|s| s.id == id).map(|s| s.price);
    assert_eq!(price_of("A1"), Some(Decimal::from(180)));
    assert_eq!(price_of("A5"), Some(Decimal::from(350)));
    assert_eq!(price_of("A10"), Some(Decimal::from(500)));
    Ok(())
}

// Memory storage whose writes can be switched off mid-test
#[derive(Clone)]
struct ReadOnlyAfterSwitch {
    inner: MemoryStorage,
    read_only: Rc<Cell<bool>>,
}

impl StorageBackend for ReadOnlyAfterSwitch {
    fn load(&self) -> AppResult<StoreData> {
        self.inner.load()
    }

    fn save(&mut self, data: &StoreData) -> AppResult<()> {
        if self.read_only.get() {
            return Err(AppError::StorageError("disk full".into()));
        }
        self.inner.save(data)
    }
}

#[test]
fn test_failed_save_keeps_phone_and_history_together() -> Result<(), AppError> {
    let storage = ReadOnlyAfterSwitch {
        inner: MemoryStorage::new(),
        read_only: Rc::new(Cell::new(false)),
    };
    let mut users = UserService::new(storage.clone(), TEST_BCRYPT_COST);
    let mut session = Session::anonymous();
    users.signup(&mut session, signup_request("atomic@example.com"))?;

    let mut wizard = BookingWizard::start(&session, &catalog(), default_priced_request())?;
    to_payment_step(&mut wizard, &["C3"])?;

    storage.read_only.set(true);
    let payment = PaymentDetails {
        phone: "9000000001".to_string(),
        ..valid_payment()
    };
    let result = wizard.confirm_payment(&mut users, &mut session, payment);
    assert!(matches!(result, Err(AppError::StorageError(_))));

    let saved = storage.inner.snapshot();
    assert_eq!(saved.users[0].phone, "");
    assert!(saved.users[0].booking_history.is_empty());
    assert_eq!(session.profile().map(|p| p.phone.as_str()), Some(""));
    assert_eq!(wizard.step(), BookingStep::Payment);
    Ok(())
}
