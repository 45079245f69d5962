//! Transient state storage for keyward.
//!
//! This crate provides:
//! - A namespaced key-value capability with per-entry expiry (`TransientStore`)
//! - A Redis backend (`RedisStore`) and an in-process backend (`MemoryStore`),
//!   chosen from the store URL by [`open`]
//! - Narrow capabilities for the two things keyward persists:
//!   CSRF state tokens (`CsrfStateStore`) and sessions (`SessionStore`)
//!
//! # Example
//!
//! ```
//! use keyward_core::{CsrfState, SessionId};
//! use keyward_store::{
//!     CsrfStateStore, MemoryStore, SessionRecord, SessionRepository, SessionStore,
//!     StateRepository, UserInfo,
//! };
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let store = Arc::new(MemoryStore::new());
//! let states = StateRepository::new(store.clone(), Duration::from_secs(120));
//! let sessions = SessionRepository::new(store, Duration::from_secs(3600));
//!
//! let state = CsrfState::generate().unwrap();
//! states.put_state(&state).await.unwrap();
//! assert_eq!(states.get_state(state.as_str()).await.unwrap().as_deref(), Some(state.as_str()));
//!
//! let id = SessionId::generate().unwrap();
//! let record = SessionRecord::new(
//!     "access-token".to_string(),
//!     UserInfo::new("alice".to_string(), "alice@example.com".to_string()),
//! );
//! sessions.put_session(&id, &record).await.unwrap();
//! assert_eq!(sessions.get_session(&id).await.unwrap(), Some(record));
//! # });
//! ```

pub mod backend;
pub mod config;
pub mod csrf;
pub mod error;
pub mod memory;
pub mod redis_store;
pub mod session;
pub mod store;

pub use backend::open;
pub use config::StoreConfig;
pub use csrf::{CsrfStateStore, StateRepository};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use session::{SessionRecord, SessionRepository, SessionStore, UserInfo};
pub use store::{Namespace, TransientStore};
