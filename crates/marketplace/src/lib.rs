//! Negotiation core for the Threadswap clothing-swap marketplace.
//!
//! This crate owns the business rules over the `database` crate: the trade
//! lifecycle (`Pending → Accepted → Completed`, with `Cancelled` as a
//! defined terminal state), the chat audit trail paired 1:1 with every
//! trade, the post-completion review ledger, and the experience/level
//! progression both of them feed.
//!
//! Every mutating operation runs as one SQLite transaction, so a trade
//! change and the chat message that records it are never observable apart.
//! There is no in-process locking: concurrent counter-offers on the same
//! trade race and the last write wins, which is harmless because every
//! offer change resets both acceptance flags.
//!
//! # Example
//!
//! ```no_run
//! use database::Database;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("sqlite::memory:").await?;
//! db.migrate().await?;
//!
//! let alice = marketplace::users::register(db.pool(), "Alice", None).await?;
//! let bob = marketplace::users::register(db.pool(), "Bob", None).await?;
//!
//! let jacket = marketplace::listings::create(
//!     db.pool(),
//!     &alice.id,
//!     &marketplace::listings::NewListing {
//!         title: "Denim jacket".into(),
//!         description: "Lightly worn".into(),
//!         category: "tops".into(),
//!         size: "M".into(),
//!         condition: "good".into(),
//!     },
//! )
//! .await?;
//!
//! let trade = marketplace::trades::propose(
//!     db.pool(), &alice.id, &bob.id, &[jacket.id], &[],
//! )
//! .await?;
//!
//! marketplace::trades::accept(db.pool(), &trade.trade.id, &alice.id).await?;
//! marketplace::trades::accept(db.pool(), &trade.trade.id, &bob.id).await?;
//! marketplace::trades::complete(db.pool(), &trade.trade.id, &bob.id).await?;
//! # Ok(())
//! # }
//! ```

pub mod chats;
pub mod error;
pub mod listings;
pub mod progression;
pub mod reviews;
pub mod trades;
pub mod users;

pub use chats::ChatOverview;
pub use error::{MarketError, Result};
pub use trades::{MeetingInput, TradeDetails};
pub use users::UserProfile;
