//! Page state machines.
//!
//! Each page owns its state behind a mutex that is never held across an
//! await. Requests are tagged with a [`Ticket`](crate::ticket::Ticket) and
//! their responses are dropped if a newer request has been issued.

mod detail;
mod listing;

pub use detail::{DetailState, LoadedProduct, ProductDetail, RelatedState};
pub use listing::{ListingState, ProductListing};
