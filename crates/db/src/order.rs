use std::cmp::Reverse;

use common::types::UserId;

use crate::{
    models::{Order, OrderStatus},
    table::Rows,
};

use super::{Result, DB};

impl DB {
    /// Store a new order. If its id is already taken, the numeric part is
    /// bumped until free. Returns the order as saved
    pub async fn add_order(&self, mut order: Order) -> Result<Order> {
        self.tables
            .orders
            .update(|orders| {
                let id = free_order_id(orders, order.order_id());
                order.set_order_id(id.clone());
                orders.insert(id, order.clone());
                (order, true)
            })
            .await
            .inspect(|o| log::debug!("order {} saved", o.order_id()))
    }
    pub async fn get_order(&self, order_id: &str) -> Option<Order> {
        self.tables.orders.get(order_id).await
    }
    /// Insert or replace order under its id
    pub async fn put_order(&self, order: Order) -> Result<()> {
        log::debug!("saving order {} as {}", order.order_id(), order.status());
        self.tables
            .orders
            .update(|orders| {
                orders.insert(order.order_id().to_owned(), order);
                ((), true)
            })
            .await
    }
    /// Orders with `status`, oldest first
    pub async fn orders_by_status(&self, status: OrderStatus) -> Vec<Order> {
        let mut orders = self
            .tables
            .orders
            .read(|orders| {
                orders
                    .values()
                    .filter(|o| o.status() == status)
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await;
        orders.sort_by_key(Order::created_at);
        orders
    }
    /// Latest pending or awaiting-approval order of the user
    pub async fn find_open_order(&self, user_id: UserId) -> Option<Order> {
        self.tables
            .orders
            .read(|orders| {
                orders
                    .values()
                    .filter(|o| o.user_id() == user_id && o.status().is_open())
                    .max_by_key(|o| o.created_at())
                    .cloned()
            })
            .await
    }
    /// Newest first
    pub async fn recent_orders(&self, limit: usize) -> Vec<Order> {
        let mut orders = self.all_orders().await;
        orders.sort_by_key(|o| Reverse(o.created_at()));
        orders.truncate(limit);
        orders
    }
    pub async fn all_orders(&self) -> Vec<Order> {
        self.tables
            .orders
            .read(|orders| orders.values().cloned().collect())
            .await
    }
}

fn free_order_id(orders: &Rows<Order>, wanted: &str) -> String {
    if !orders.contains_key(wanted) {
        return wanted.to_owned();
    }
    let (prefix, num) = split_id(wanted);
    (num + 1..)
        .map(|n| format!("{prefix}{n}"))
        .find(|id| !orders.contains_key(id))
        .unwrap_or_else(|| wanted.to_owned())
}

/// `ORD1000` -> (`ORD`, 1000). Ids without a numeric tail count from 0
fn split_id(id: &str) -> (&str, u64) {
    let digits = id.len() - id.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    let (prefix, num) = id.split_at(id.len() - digits);
    (prefix, num.parse().unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_id() {
        let table = [
            ("ORD1000", ("ORD", 1000)),
            ("ORD", ("ORD", 0)),
            ("1", ("", 1)),
        ];
        for (i, (input, expected)) in table.into_iter().enumerate() {
            assert_eq!(split_id(input), expected, "test table[{i}]");
        }
    }
}
