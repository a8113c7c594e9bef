use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

pub const SEAT_ROWS: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];
pub const SEATS_PER_ROW: u8 = 10;

// Seat price class
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Tier {
    Standard,
    Vip,
    Premium,
}

impl Tier {
    // Seats 1-3 are standard, 4-7 vip, 8-10 premium
    pub fn for_seat_number(number: u8) -> Self {
        match number {
            0..=3 => Tier::Standard,
            4..=7 => Tier::Vip,
            _ => Tier::Premium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    pub id: String,
    // 1-based, row A is 1
    pub row: u8,
    pub number: u8,
    pub tier: Tier,
    pub is_booked: bool,
    pub price: Decimal,
}

// Seat as it is kept on a booking record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookedSeat {
    pub id: String,
    pub row: u8,
    pub number: u8,
    pub tier: Tier,
    pub price: Decimal,
}

impl From<&Seat> for BookedSeat {
    fn from(seat: &Seat) -> Self {
        BookedSeat {
            id: seat.id.clone(),
            row: seat.row,
            number: seat.number,
            tier: seat.tier,
            price: seat.price,
        }
    }
}
