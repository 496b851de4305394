//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod app_setting;
pub mod banner;
pub mod cart;
pub mod category;
pub mod driver_schedule;
pub mod order;
pub mod product;
pub mod restaurant;
pub mod team_member;
pub mod user;

pub use app_setting::AppSettingEntity;
pub use banner::BannerEntity;
pub use cart::{CartEntity, CartLineEntity};
pub use category::{CategoryEntity, RestaurantCategoryEntity};
pub use driver_schedule::DriverScheduleEntity;
pub use order::{CheckoutLineEntity, OrderEntity, OrderItemEntity};
pub use product::ProductEntity;
pub use restaurant::RestaurantEntity;
pub use team_member::TeamMemberEntity;
pub use user::{UserEntity, UserSessionEntity};
