//! Listing CRUD and browse queries.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::Listing;

/// Filters for browsing available listings. `None` fields are not applied.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub category: Option<String>,
    pub size: Option<String>,
    pub condition: Option<String>,
}

const LISTING_COLUMNS: &str =
    "id, owner_id, title, description, category, size, condition, status, created_at, updated_at";

/// Create a new listing.
pub async fn create_listing(pool: &SqlitePool, listing: &Listing) -> Result<Listing> {
    sqlx::query(
        r#"
        INSERT INTO listings (id, owner_id, title, description, category, size, condition, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&listing.id)
    .bind(&listing.owner_id)
    .bind(&listing.title)
    .bind(&listing.description)
    .bind(&listing.category)
    .bind(&listing.size)
    .bind(&listing.condition)
    .bind(&listing.status)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Listing",
                    id: listing.id.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    get_listing(pool, &listing.id).await
}

/// Get a listing by ID.
pub async fn get_listing(pool: &SqlitePool, id: &str) -> Result<Listing> {
    sqlx::query_as::<_, Listing>(&format!(
        "SELECT {LISTING_COLUMNS} FROM listings WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Listing",
        id: id.to_string(),
    })
}

/// Get a listing by ID within a transaction. Returns `None` when absent so
/// the caller can report a validation failure instead of a lookup failure.
pub async fn find_listing_tx(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<Listing>> {
    let listing = sqlx::query_as::<_, Listing>(&format!(
        "SELECT {LISTING_COLUMNS} FROM listings WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(listing)
}

/// Browse available listings, newest first, with optional filters.
pub async fn list_available(pool: &SqlitePool, filter: &ListingFilter) -> Result<Vec<Listing>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT {LISTING_COLUMNS} FROM listings WHERE status = 'available'"
    ));

    if let Some(category) = &filter.category {
        qb.push(" AND category = ");
        qb.push_bind(category);
    }
    if let Some(size) = &filter.size {
        qb.push(" AND size = ");
        qb.push_bind(size);
    }
    if let Some(condition) = &filter.condition {
        qb.push(" AND condition = ");
        qb.push_bind(condition);
    }
    qb.push(" ORDER BY created_at DESC, id DESC");

    let listings = qb.build_query_as::<Listing>().fetch_all(pool).await?;
    Ok(listings)
}
