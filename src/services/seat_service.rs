use indexmap::IndexMap;
use rust_decimal::Decimal;

use crate::models::movie::PriceTable;
use crate::models::seat::{Seat, Tier, SEATS_PER_ROW, SEAT_ROWS};

/// Build the hall's seat map: rows A-H, seats 1-10, tier by position.
///
/// Without a price table the default tier prices apply. Every seat starts
/// unbooked; the result depends only on `prices`.
pub fn generate_seats(prices: Option<&PriceTable>) -> Vec<Seat> {
    let prices = prices.copied().unwrap_or_default();

    SEAT_ROWS
        .iter()
        .enumerate()
        .flat_map(|(row_index, row_letter)| {
            (1..=SEATS_PER_ROW).map(move |number| {
                let tier = Tier::for_seat_number(number);
                Seat {
                    id: format!("{}{}", row_letter, number),
                    row: row_index as u8 + 1,
                    number,
                    tier,
                    is_booked: false,
                    price: prices.price_for(tier),
                }
            })
        })
        .collect()
}

// Seats picked during one booking, in the order they were picked
#[derive(Debug, Clone, Default)]
pub struct SeatSelection {
    seats: IndexMap<String, Seat>,
}

impl SeatSelection {
    pub fn new() -> Self {
        SeatSelection::default()
    }

    // Add or remove the seat, returns whether it is selected afterwards. Booked seats are ignored.
    pub fn toggle(&mut self, seat: &Seat) -> bool {
        if seat.is_booked {
            return false;
        }

        if self.seats.shift_remove(&seat.id).is_some() {
            false
        } else {
            self.seats.insert(seat.id.clone(), seat.clone());
            true
        }
    }

    pub fn is_selected(&self, seat_id: &str) -> bool {
        self.seats.contains_key(seat_id)
    }

    pub fn total(&self) -> Decimal {
        self.seats.values().map(|seat| seat.price).sum()
    }

    pub fn seats(&self) -> impl Iterator<Item = &Seat> {
        self.seats.values()
    }

    pub fn seat_ids(&self) -> Vec<&str> {
        self.seats.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn clear(&mut self) {
        self.seats.clear();
    }
}
