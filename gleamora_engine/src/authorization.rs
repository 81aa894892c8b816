//! The authorization resolver.
//!
//! Every order read and every status mutation funnels through [`permissions_for`], a pure
//! function from `(actor, order)` to the pair of rights the caller holds. Keeping this out of the
//! HTTP layer means the policy is tested once, here, instead of being repeated inline in each
//! route handler.
//!
//! The resolver is evaluated on every request. Vendor ownership of a line item is frozen at
//! order-creation time, but an actor's role can change between requests (suspension, promotion),
//! so results must never be cached across requests.

use crate::db_types::{Order, Role};

/// The authenticated identity attempting an operation. A suspended actor never reaches this type;
/// the authentication layer rejects suspended sessions as unauthenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self { id: id.into(), role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// The rights an actor holds over one specific order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderPermissions {
    pub can_view: bool,
    pub can_update_status: bool,
}

impl OrderPermissions {
    pub const NONE: OrderPermissions = OrderPermissions { can_view: false, can_update_status: false };
}

/// Computes view/mutate rights for `actor` on `order`.
///
/// * Admins may always view and update.
/// * The customer who placed the order may view it, but never drive its status.
/// * A vendor may view and update iff at least one line item is theirs.
/// * Anonymous callers get nothing.
pub fn permissions_for(actor: Option<&Actor>, order: &Order) -> OrderPermissions {
    let Some(actor) = actor else {
        return OrderPermissions::NONE;
    };
    match actor.role {
        Role::Admin => OrderPermissions { can_view: true, can_update_status: true },
        Role::Customer => {
            OrderPermissions { can_view: order.customer_id == actor.id, can_update_status: false }
        },
        Role::Vendor => {
            let owns_item = order.has_vendor(&actor.id);
            OrderPermissions { can_view: owns_item, can_update_status: owns_item }
        },
    }
}
