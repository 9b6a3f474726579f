//! Sales analytics computed from stored orders.
//!
//! Every call reads all orders, cancelled ones included. Nothing is cached.

use crate::CafeError;
use cafe_storage::StorageService;
use cafe_types::{parse_clock_time, EntityId, Order, PopularItem, TimeSlotCount};
use chrono::{NaiveTime, Timelike};
use std::collections::HashMap;
use std::sync::Arc;

/// Read-only aggregations for the dashboard.
pub struct AnalyticsAggregator {
	storage: Arc<StorageService>,
	opening: NaiveTime,
	closing: NaiveTime,
}

impl AnalyticsAggregator {
	pub fn new(storage: Arc<StorageService>, opening: NaiveTime, closing: NaiveTime) -> Self {
		Self {
			storage,
			opening,
			closing,
		}
	}

	/// Total ordered quantity per menu item, highest first, ties by ID.
	pub async fn popular_items(&self) -> Result<Vec<PopularItem>, CafeError> {
		let orders = self.storage.list::<Order>().await?;

		let mut totals: HashMap<EntityId, u64> = HashMap::new();
		for line in orders.iter().flat_map(|order| order.items.iter()) {
			*totals.entry(line.menu_item_id).or_default() += u64::from(line.quantity);
		}

		let mut items: Vec<PopularItem> = totals
			.into_iter()
			.map(|(menu_item_id, total_quantity)| PopularItem {
				menu_item_id,
				total_quantity,
			})
			.collect();
		items.sort_by(|a, b| {
			b.total_quantity
				.cmp(&a.total_quantity)
				.then(a.menu_item_id.cmp(&b.menu_item_id))
		});
		Ok(items)
	}

	/// Order counts per opening hour, keyed by pickup time.
	///
	/// Every hour from opening up to closing gets a slot, empty or not. A
	/// pickup exactly at closing time lands in the last slot. Pickups outside
	/// business hours are not counted.
	pub async fn orders_by_time_slot(&self) -> Result<Vec<TimeSlotCount>, CafeError> {
		let first_hour = self.opening.hour();
		let last_hour = if self.closing.minute() == 0 {
			self.closing.hour().saturating_sub(1).max(first_hour)
		} else {
			self.closing.hour()
		};

		let mut counts = vec![0u64; (last_hour - first_hour + 1) as usize];
		for order in self.storage.list::<Order>().await? {
			let Some(pickup) = parse_clock_time(&order.pickup_time) else {
				tracing::warn!(order_id = order.id, "Skipping order with unreadable pickup time");
				continue;
			};
			if pickup < self.opening || pickup > self.closing {
				continue;
			}
			let hour = pickup.hour().min(last_hour);
			counts[(hour - first_hour) as usize] += 1;
		}

		Ok(counts
			.into_iter()
			.enumerate()
			.map(|(offset, count)| TimeSlotCount {
				slot: format!("{:02}:00", first_hour + offset as u32),
				count,
			})
			.collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use cafe_storage::implementations::memory::MemoryStorage;
	use cafe_types::{OrderItem, OrderStatus, PaymentStatus};

	fn time(s: &str) -> NaiveTime {
		parse_clock_time(s).unwrap()
	}

	async fn aggregator_with(
		orders: Vec<(Vec<(EntityId, u32)>, &str, OrderStatus)>,
		opening: &str,
		closing: &str,
	) -> AnalyticsAggregator {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		for (lines, pickup, status) in orders {
			storage
				.insert(|id| Order {
					id,
					user_id: None,
					status,
					items: lines
						.into_iter()
						.map(|(menu_item_id, quantity)| OrderItem {
							menu_item_id,
							quantity,
							notes: String::new(),
						})
						.collect(),
					total: 0,
					pickup_time: pickup.to_string(),
					special_instructions: None,
					payment_status: PaymentStatus::Pending,
					created_at: Default::default(),
				})
				.await
				.unwrap();
		}
		AnalyticsAggregator::new(storage, time(opening), time(closing))
	}

	#[tokio::test]
	async fn test_popular_items_sorted_with_id_tiebreak() {
		let analytics = aggregator_with(
			vec![
				(vec![(2, 2), (3, 1)], "12:00", OrderStatus::Pending),
				(vec![(1, 2)], "12:30", OrderStatus::Completed),
				(vec![(3, 1)], "13:00", OrderStatus::Cancelled),
			],
			"10:00",
			"22:00",
		)
		.await;

		let items = analytics.popular_items().await.unwrap();
		assert_eq!(
			items,
			vec![
				PopularItem {
					menu_item_id: 1,
					total_quantity: 2
				},
				PopularItem {
					menu_item_id: 2,
					total_quantity: 2
				},
				PopularItem {
					menu_item_id: 3,
					total_quantity: 2
				},
			]
		);
	}

	#[tokio::test]
	async fn test_popular_items_empty_store() {
		let analytics = aggregator_with(vec![], "10:00", "22:00").await;
		assert!(analytics.popular_items().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_time_slots_cover_business_hours() {
		let analytics = aggregator_with(vec![], "10:00", "22:00").await;
		let slots = analytics.orders_by_time_slot().await.unwrap();
		assert_eq!(slots.len(), 12);
		assert_eq!(slots[0].slot, "10:00");
		assert_eq!(slots[11].slot, "21:00");
		assert!(slots.iter().all(|s| s.count == 0));
	}

	#[tokio::test]
	async fn test_time_slot_bucketing() {
		let analytics = aggregator_with(
			vec![
				(vec![(1, 1)], "10:00", OrderStatus::Pending),
				(vec![(1, 1)], "10:59", OrderStatus::Pending),
				(vec![(1, 1)], "14:15", OrderStatus::Cancelled),
				(vec![(1, 1)], "22:00", OrderStatus::Completed),
				(vec![(1, 1)], "09:30", OrderStatus::Pending),
				(vec![(1, 1)], "22:30", OrderStatus::Pending),
			],
			"10:00",
			"22:00",
		)
		.await;

		let slots = analytics.orders_by_time_slot().await.unwrap();
		let count = |slot: &str| slots.iter().find(|s| s.slot == slot).unwrap().count;
		assert_eq!(count("10:00"), 2);
		assert_eq!(count("14:00"), 1);
		assert_eq!(count("21:00"), 1);
		assert_eq!(slots.iter().map(|s| s.count).sum::<u64>(), 4);
	}

	#[tokio::test]
	async fn test_time_slots_with_partial_closing_hour() {
		let analytics = aggregator_with(
			vec![(vec![(1, 1)], "18:15", OrderStatus::Pending)],
			"07:30",
			"18:30",
		)
		.await;

		let slots = analytics.orders_by_time_slot().await.unwrap();
		assert_eq!(slots.first().unwrap().slot, "07:00");
		assert_eq!(slots.last().unwrap().slot, "18:00");
		assert_eq!(slots.last().unwrap().count, 1);
	}
}
