//! The five section providers.
//!
//! Each provider exposes a `gather` function matching
//! [`crate::briefing::Provider`] and keeps its parsing in pure helpers.
pub mod calendar;
pub mod git;
pub mod kubernetes;
pub mod system;
pub mod weather;

pub use calendar::CalendarAgenda;
pub use git::{GitSummary, RepoStatus};
pub use kubernetes::ClusterHealth;
pub use system::SystemHealth;
pub use weather::WeatherReport;
