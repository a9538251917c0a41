//! Service layer for notification routing.

mod router;

pub use router::{BroadcastReport, DeliveryFailure, NotificationRouter};
