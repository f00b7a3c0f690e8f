//! Admin dashboard statistics.

pub mod router;
mod summary;
pub mod views;

pub use router::{dashboard_router, DashboardService};
pub use summary::DashboardReport;
pub use views::DashboardSummary;
