//! Repository implementations for database operations.

pub mod app_setting;
pub mod banner;
pub mod cart;
pub mod category;
pub mod dashboard;
pub mod driver_schedule;
pub mod order;
pub mod product;
pub mod restaurant;
pub mod session;
pub mod team_member;
pub mod user;

pub use app_setting::AppSettingRepository;
pub use banner::BannerRepository;
pub use cart::CartRepository;
pub use category::CategoryRepository;
pub use dashboard::DashboardRepository;
pub use driver_schedule::DriverScheduleRepository;
pub use order::{CheckoutFailure, OrderRepository};
pub use product::ProductRepository;
pub use restaurant::RestaurantRepository;
pub use session::SessionRepository;
pub use team_member::TeamMemberRepository;
pub use user::{AccountConflict, UserRepository};
