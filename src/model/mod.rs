pub mod app_state;
pub mod dashboard;
pub mod pricing;
pub mod resources;
pub mod session;

pub use app_state::{AppState, LoginStatus, Route};
pub use dashboard::{DashboardState, Phase};
pub use pricing::{PricingInfo, format_price, format_rate};
pub use resources::{
    Image, Instance, InstancePricing, Keypair, Network, ResourceCard, ResourceSnapshot, Section,
    StatusBadge, StatusTone, Volume,
};
pub use session::Session;
