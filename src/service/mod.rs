//! Service layer: the dashboard and its render model.
//!
//! [`Dashboard`] coordinates the two feed sessions and the wallet gate;
//! [`view`] and [`page`] turn its state into JSON and HTML.

pub mod dashboard;
pub mod page;
pub mod view;

pub use dashboard::{Dashboard, FeedSources};
pub use view::DashboardView;
