//! # Repository Module
//!
//! Database repository implementations for Basket.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler / CheckoutProcessor                                      │
//! │       │                                                                 │
//! │       │  db.inventory().find_by_name("Widget")                         │
//! │       ▼                                                                 │
//! │  InventoryRepository                  CartItemRepository               │
//! │  ├── find_by_name / get_by_id         ├── list / list_for_user         │
//! │  ├── list / insert / count            ├── get_by_id / exists           │
//! │  └── persist / persist_all (CAS)      └── insert / update / delete     │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`InventoryRepository`](inventory::InventoryRepository) - Stock records; implements `InventoryStore`
//! - [`CartItemRepository`](cart_item::CartItemRepository) - Persisted cart line CRUD

pub mod cart_item;
pub mod inventory;
