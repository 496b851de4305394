//! Domain models.

pub mod app_setting;
pub mod banner;
pub mod cart;
pub mod category;
pub mod dashboard;
pub mod driver_schedule;
pub mod order;
pub mod product;
pub mod restaurant;
pub mod team_member;
pub mod user;

pub use app_setting::AppSetting;
pub use banner::Banner;
pub use cart::{Cart, CartLine};
pub use category::Category;
pub use dashboard::{DriverDashboard, ManagerDashboard};
pub use driver_schedule::{DriverSchedule, Weekday};
pub use order::{Order, OrderItem, OrderStatus};
pub use product::Product;
pub use restaurant::Restaurant;
pub use team_member::{TeamMember, TeamMemberStatus};
pub use user::{Role, User};

/// Joins a stored media path onto the public media base URL.
pub fn media_url(base_url: &str, path: Option<&str>) -> Option<String> {
    let path = path.filter(|p| !p.is_empty())?;
    if path.starts_with("http://") || path.starts_with("https://") {
        return Some(path.to_string());
    }
    Some(format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}

/// Response of admin bulk actions.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BulkUpdateResponse {
    pub updated: u64,
}
