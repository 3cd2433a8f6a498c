pub mod form;
pub mod hotel;
pub mod slug;

pub use form::{HotelForm, NewHotel};
pub use hotel::{Hotel, HotelPatch, Room, RoomInput};
