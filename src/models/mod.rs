pub mod category;
pub mod couple;
pub mod rsvp;
