use super::{Order, OrderId, OrderStatus, NewOrder};

/// What happened to an order.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationKind {
    OrderPlaced,
    StatusChanged(OrderStatus),
}

/// A user-visible alert handed to the platform notification service.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// `None` when the backend did not report an id for a freshly placed order.
    pub order_id: Option<OrderId>,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn order_placed(order: &NewOrder, name: &str) -> Self {
        Self {
            order_id: None,
            kind: NotificationKind::OrderPlaced,
            title: "Order Placed".to_string(),
            body: format!("Your order for {} (recipe #{}) has been sent to the kitchen.", name, order.recipe_id),
        }
    }

    pub fn status_changed(order: &Order) -> Self {
        let name = order.display_name();
        let (title, body) = match &order.status {
            OrderStatus::Processing => ("Order In Progress", format!("{name} is being prepared.")),
            OrderStatus::Completed => ("Order Completed", format!("{name} is ready. Enjoy your meal!")),
            OrderStatus::Cancelled => ("Order Canceled", format!("{name} has been canceled.")),
            OrderStatus::Pending => ("Order Received", format!("{name} is waiting in the queue.")),
            OrderStatus::Other(raw) => ("Order Updated", format!("{name} is now {raw}.")),
        };
        Self {
            order_id: Some(order.order_id),
            kind: NotificationKind::StatusChanged(order.status.clone()),
            title: title.to_string(),
            body,
        }
    }

    /// Confirmation after the user cancels a pending order.
    pub fn cancelled_by_user(order_id: OrderId) -> Self {
        Self {
            order_id: Some(order_id),
            kind: NotificationKind::StatusChanged(OrderStatus::Cancelled),
            title: "Order Canceled".to_string(),
            body: "Your order has been successfully canceled.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_change_carries_order_id_and_status() {
        let mut order = Order::new(9, 2, OrderStatus::Completed);
        order.recipe_name = Some("Banh Canh".to_string());
        let n = Notification::status_changed(&order);
        assert_eq!(n.order_id, Some(9));
        assert_eq!(n.kind, NotificationKind::StatusChanged(OrderStatus::Completed));
        assert_eq!(n.title, "Order Completed");
        assert!(n.body.starts_with("Banh Canh"));
    }
}
