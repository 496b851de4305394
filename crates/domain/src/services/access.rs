//! Role-based access decisions.
//!
//! Every handler asks [`authorize`] (catalog and back-office records) or
//! [`resolve_order_change`] (order updates) instead of branching on roles
//! itself. Listing queries are narrowed with [`OrderScope`] and
//! [`CatalogScope`].

use thiserror::Error;
use uuid::Uuid;

use crate::models::order::{Order, OrderStatus, UpdateOrderStatusRequest};
use crate::models::user::{Role, User};

/// The authenticated user behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    fn manages(&self, manager_id: Option<Uuid>) -> bool {
        self.role == Role::Manager && manager_id == Some(self.user_id)
    }
}

impl From<&User> for Caller {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Category,
    Setting,
    UserAccount,
    Restaurant { manager_id: Option<Uuid> },
    /// Product, banner or team member, identified by its restaurant's manager.
    RestaurantRecord { manager_id: Option<Uuid> },
    ManagerArea,
    DriverArea,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    NotFound(&'static str),
}

const NOT_AUTHORIZED: &str = "Not authorized";

pub fn authorize(
    caller: Option<&Caller>,
    action: Action,
    resource: Resource,
) -> Result<(), AccessError> {
    let public_read = matches!(
        resource,
        Resource::Category
            | Resource::Setting
            | Resource::Restaurant { .. }
            | Resource::RestaurantRecord { .. }
    );
    if action == Action::View && public_read {
        return Ok(());
    }

    let caller = caller.ok_or(AccessError::Unauthenticated)?;
    if caller.is_admin() {
        return Ok(());
    }

    let allowed = match resource {
        Resource::Category | Resource::Setting | Resource::UserAccount => false,
        Resource::Restaurant { manager_id } => {
            action == Action::Update && caller.manages(manager_id)
        }
        Resource::RestaurantRecord { manager_id } => caller.manages(manager_id),
        Resource::ManagerArea => caller.role == Role::Manager,
        Resource::DriverArea => caller.role == Role::Driver,
    };

    if allowed {
        Ok(())
    } else {
        Err(AccessError::Forbidden(match resource {
            Resource::ManagerArea => "Only managers can access this resource",
            Resource::DriverArea => "Only drivers can access this resource",
            _ => NOT_AUTHORIZED,
        }))
    }
}

/// Which orders a caller may list or open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    All,
    /// Orders of restaurants managed by this user
    ManagedBy(Uuid),
    /// Orders assigned to this driver
    AssignedTo(Uuid),
    /// Orders placed by this customer
    PlacedBy(Uuid),
}

impl OrderScope {
    pub fn for_caller(caller: &Caller) -> Self {
        match caller.role {
            Role::Admin => OrderScope::All,
            Role::Manager => OrderScope::ManagedBy(caller.user_id),
            Role::Driver => OrderScope::AssignedTo(caller.user_id),
            Role::Client => OrderScope::PlacedBy(caller.user_id),
        }
    }

    pub fn contains(&self, order: &Order) -> bool {
        match *self {
            OrderScope::All => true,
            OrderScope::ManagedBy(id) => order.restaurant_manager_id == Some(id),
            OrderScope::AssignedTo(id) => order.driver_id == Some(id),
            OrderScope::PlacedBy(id) => order.user_id == id,
        }
    }
}

/// Ready and not yet taken by any driver.
pub fn order_claimable(order: &Order) -> bool {
    order.driver_id.is_none() && order.status == OrderStatus::Ready
}

/// The values an order update will actually store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderChange {
    pub status: OrderStatus,
    pub driver_id: Option<Uuid>,
}

/// Decides whether `caller` may apply `request` to `order` and what gets stored.
///
/// Orders outside the caller's scope are reported as not found, except that a
/// driver may claim a ready, unassigned order (which assigns it to them).
pub fn resolve_order_change(
    caller: &Caller,
    order: &Order,
    request: &UpdateOrderStatusRequest,
) -> Result<OrderChange, AccessError> {
    let visible = OrderScope::for_caller(caller).contains(order);
    let claim = caller.role == Role::Driver && !visible && order_claimable(order);
    if !visible && !claim {
        return Err(AccessError::NotFound("Order not found"));
    }

    let status = request.effective_status().unwrap_or(order.status);
    let driver_id = request.driver_id.or(order.driver_id);

    match caller.role {
        Role::Admin | Role::Manager => Ok(OrderChange { status, driver_id }),
        Role::Driver => {
            if request.driver_id.is_some_and(|id| id != caller.user_id) {
                return Err(AccessError::Forbidden("Drivers can only assign themselves"));
            }
            if claim {
                Ok(OrderChange {
                    status: request.status.unwrap_or(OrderStatus::Assigned),
                    driver_id: Some(caller.user_id),
                })
            } else {
                Ok(OrderChange { status, driver_id })
            }
        }
        Role::Client => {
            if request.driver_id.is_some() || request.status != Some(OrderStatus::Cancelled) {
                return Err(AccessError::Forbidden("Customers can only cancel their orders"));
            }
            Ok(OrderChange {
                status: OrderStatus::Cancelled,
                driver_id: order.driver_id,
            })
        }
    }
}

/// Which products and banners a caller sees in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogScope {
    /// Available products and active banners only
    Public,
    /// Everything belonging to restaurants managed by this user
    ManagedBy(Uuid),
    Everything,
}

impl CatalogScope {
    pub fn for_caller(caller: Option<&Caller>) -> Self {
        match caller {
            Some(c) if c.is_admin() => CatalogScope::Everything,
            Some(c) if c.role == Role::Manager => CatalogScope::ManagedBy(c.user_id),
            _ => CatalogScope::Public,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn caller(role: Role) -> Caller {
        Caller::new(Uuid::new_v4(), role)
    }

    fn order(customer: Uuid, manager: Option<Uuid>, driver: Option<Uuid>, status: OrderStatus) -> Order {
        Order {
            id: 1,
            user_id: customer,
            restaurant_id: 1,
            restaurant_name: "Maquis".into(),
            restaurant_image: None,
            restaurant_manager_id: manager,
            driver_id: driver,
            driver_name: None,
            status,
            total: 3000,
            delivery_fee: 500,
            delivery_address: "Rue 12".into(),
            customer_name: "Ama".into(),
            customer_phone: "97000000".into(),
            notes: String::new(),
            items: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn request(status: Option<OrderStatus>, driver_id: Option<Uuid>) -> UpdateOrderStatusRequest {
        UpdateOrderStatusRequest { status, driver_id }
    }

    #[test]
    fn test_catalog_reads_are_public() {
        assert!(authorize(None, Action::View, Resource::Category).is_ok());
        assert!(authorize(None, Action::View, Resource::Restaurant { manager_id: None }).is_ok());
        assert!(authorize(None, Action::View, Resource::Setting).is_ok());
    }

    #[test]
    fn test_mutations_require_authentication() {
        assert_eq!(
            authorize(None, Action::Create, Resource::Category),
            Err(AccessError::Unauthenticated)
        );
        assert_eq!(
            authorize(None, Action::View, Resource::DriverArea),
            Err(AccessError::Unauthenticated)
        );
    }

    #[test]
    fn test_admin_only_resources() {
        let admin = caller(Role::Admin);
        for role in [Role::Client, Role::Driver, Role::Manager] {
            let c = caller(role);
            assert!(authorize(Some(&c), Action::Create, Resource::Category).is_err());
            assert!(authorize(Some(&c), Action::Update, Resource::Setting).is_err());
            assert!(authorize(Some(&c), Action::View, Resource::UserAccount).is_err());
        }
        assert!(authorize(Some(&admin), Action::Delete, Resource::Category).is_ok());
        assert!(authorize(Some(&admin), Action::View, Resource::UserAccount).is_ok());
    }

    #[test]
    fn test_restaurant_update_by_own_manager_only() {
        let manager = caller(Role::Manager);
        let own = Resource::Restaurant { manager_id: Some(manager.user_id) };
        let other = Resource::Restaurant { manager_id: Some(Uuid::new_v4()) };

        assert!(authorize(Some(&manager), Action::Update, own).is_ok());
        assert_eq!(
            authorize(Some(&manager), Action::Update, other),
            Err(AccessError::Forbidden("Not authorized"))
        );
        assert!(authorize(Some(&manager), Action::Create, own).is_err());
        assert!(authorize(Some(&manager), Action::Delete, own).is_err());
    }

    #[test]
    fn test_restaurant_records_never_mutable_by_clients_or_drivers() {
        for role in [Role::Client, Role::Driver] {
            let c = caller(role);
            let record = Resource::RestaurantRecord { manager_id: Some(c.user_id) };
            for action in [Action::Create, Action::Update, Action::Delete] {
                assert!(authorize(Some(&c), action, record).is_err());
            }
        }
    }

    #[test]
    fn test_manager_cannot_touch_other_restaurants_records() {
        let manager = caller(Role::Manager);
        let foreign = Resource::RestaurantRecord { manager_id: Some(Uuid::new_v4()) };
        let orphan = Resource::RestaurantRecord { manager_id: None };
        let own = Resource::RestaurantRecord { manager_id: Some(manager.user_id) };

        assert!(authorize(Some(&manager), Action::Update, foreign).is_err());
        assert!(authorize(Some(&manager), Action::Update, orphan).is_err());
        assert!(authorize(Some(&manager), Action::Delete, own).is_ok());
    }

    #[test]
    fn test_role_areas() {
        let admin = caller(Role::Admin);
        let driver = caller(Role::Driver);
        let manager = caller(Role::Manager);

        assert!(authorize(Some(&manager), Action::View, Resource::ManagerArea).is_ok());
        assert!(authorize(Some(&admin), Action::View, Resource::ManagerArea).is_ok());
        assert!(authorize(Some(&driver), Action::View, Resource::ManagerArea).is_err());
        assert!(authorize(Some(&driver), Action::View, Resource::DriverArea).is_ok());
        assert_eq!(
            authorize(Some(&manager), Action::View, Resource::DriverArea),
            Err(AccessError::Forbidden("Only drivers can access this resource"))
        );
    }

    #[test]
    fn test_order_scope_per_role() {
        let client = caller(Role::Client);
        let manager = caller(Role::Manager);
        let driver = caller(Role::Driver);
        let o = order(client.user_id, Some(manager.user_id), None, OrderStatus::Pending);

        assert!(OrderScope::for_caller(&client).contains(&o));
        assert!(OrderScope::for_caller(&manager).contains(&o));
        assert!(!OrderScope::for_caller(&driver).contains(&o));
        assert!(OrderScope::for_caller(&caller(Role::Admin)).contains(&o));
        assert!(!OrderScope::for_caller(&caller(Role::Client)).contains(&o));
    }

    #[test]
    fn test_driver_claims_ready_order() {
        let driver = caller(Role::Driver);
        let o = order(Uuid::new_v4(), None, None, OrderStatus::Ready);

        let change = resolve_order_change(&driver, &o, &request(None, None)).unwrap();
        assert_eq!(change.driver_id, Some(driver.user_id));
        assert_eq!(change.status, OrderStatus::Assigned);

        let picked = resolve_order_change(&driver, &o, &request(Some(OrderStatus::PickedUp), None)).unwrap();
        assert_eq!(picked.status, OrderStatus::PickedUp);
        assert_eq!(picked.driver_id, Some(driver.user_id));
    }

    #[test]
    fn test_driver_cannot_touch_unclaimable_foreign_order() {
        let driver = caller(Role::Driver);
        let preparing = order(Uuid::new_v4(), None, None, OrderStatus::Preparing);
        let taken = order(Uuid::new_v4(), None, Some(Uuid::new_v4()), OrderStatus::Ready);

        assert_eq!(
            resolve_order_change(&driver, &preparing, &request(Some(OrderStatus::Assigned), None)),
            Err(AccessError::NotFound("Order not found"))
        );
        assert!(resolve_order_change(&driver, &taken, &request(Some(OrderStatus::Assigned), None)).is_err());
    }

    #[test]
    fn test_driver_cannot_assign_someone_else() {
        let driver = caller(Role::Driver);
        let o = order(Uuid::new_v4(), None, Some(driver.user_id), OrderStatus::Assigned);

        assert!(matches!(
            resolve_order_change(&driver, &o, &request(None, Some(Uuid::new_v4()))),
            Err(AccessError::Forbidden(_))
        ));
        let ok = resolve_order_change(&driver, &o, &request(Some(OrderStatus::Delivered), None)).unwrap();
        assert_eq!(ok.status, OrderStatus::Delivered);
        assert_eq!(ok.driver_id, Some(driver.user_id));
    }

    #[test]
    fn test_client_may_only_cancel_own_order() {
        let client = caller(Role::Client);
        let own = order(client.user_id, None, None, OrderStatus::Pending);
        let foreign = order(Uuid::new_v4(), None, None, OrderStatus::Pending);

        let change = resolve_order_change(&client, &own, &request(Some(OrderStatus::Cancelled), None)).unwrap();
        assert_eq!(change.status, OrderStatus::Cancelled);
        assert!(matches!(
            resolve_order_change(&client, &own, &request(Some(OrderStatus::Delivered), None)),
            Err(AccessError::Forbidden(_))
        ));
        assert!(matches!(
            resolve_order_change(&client, &foreign, &request(Some(OrderStatus::Cancelled), None)),
            Err(AccessError::NotFound(_))
        ));
    }

    #[test]
    fn test_manager_sets_any_status_including_backwards() {
        let manager = caller(Role::Manager);
        let delivered = order(Uuid::new_v4(), Some(manager.user_id), None, OrderStatus::Delivered);

        let change = resolve_order_change(&manager, &delivered, &request(Some(OrderStatus::Pending), None)).unwrap();
        assert_eq!(change.status, OrderStatus::Pending);
    }

    #[test]
    fn test_assigning_driver_without_status_marks_assigned() {
        let admin = caller(Role::Admin);
        let driver_id = Uuid::new_v4();
        let o = order(Uuid::new_v4(), None, None, OrderStatus::Ready);

        let change = resolve_order_change(&admin, &o, &request(None, Some(driver_id))).unwrap();
        assert_eq!(change.status, OrderStatus::Assigned);
        assert_eq!(change.driver_id, Some(driver_id));
    }

    #[test]
    fn test_catalog_scope() {
        let manager = caller(Role::Manager);
        assert_eq!(CatalogScope::for_caller(None), CatalogScope::Public);
        assert_eq!(CatalogScope::for_caller(Some(&caller(Role::Client))), CatalogScope::Public);
        assert_eq!(
            CatalogScope::for_caller(Some(&manager)),
            CatalogScope::ManagedBy(manager.user_id)
        );
        assert_eq!(
            CatalogScope::for_caller(Some(&caller(Role::Admin))),
            CatalogScope::Everything
        );
    }
}
