//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic migration execution on startup
//! - Optional serializable transactions for guarded booking writes
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//!
//! Store failures are surfaced to the caller on first occurrence; there is
//! no retry loop anywhere in this module.

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;

use crate::db::repository::{
    BookingRepository, BuildingRepository, GuardedWrite, RepositoryError, RepositoryResult,
    RoomRepository, StoreLifecycle,
};
use crate::models::{
    room_eligibility, Booking, BookingDetail, Building, BuildingDetail, ConflictReason, Room,
    RoomDetail, RoomStatus, TimeSlot,
};

mod models;
mod schema;

use models::{BookingRow, BuildingRow, RoomRow};
use schema::{bookings, buildings, rooms};

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let max_pool_size = std::env::var("PG_POOL_MAX")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let min_pool_size = std::env::var("PG_POOL_MIN")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);

        let connection_timeout_sec = std::env::var("PG_CONN_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_sec = std::env::var("PG_IDLE_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(600);

        Ok(Self {
            database_url,
            max_pool_size,
            min_pool_size,
            connection_timeout_sec,
            idle_timeout_sec,
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self { database_url: database_url.into(), ..Default::default() }
    }
}

/// Diesel-backed repository for Postgres.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| RepositoryError::ConnectionError(e.to_string()))?;

        {
            let mut conn = pool.get()?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self { pool, config })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| RepositoryError::InternalError(format!("Migration failed: {}", e)))?;
        Ok(())
    }

    /// Run a blocking Diesel operation on the blocking thread pool.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await
        .map_err(|e| RepositoryError::InternalError(format!("Task join error: {}", e)))?
    }
}

// ==================== Query helpers ====================

fn load_building(conn: &mut PgConnection, building_id: &str) -> RepositoryResult<Building> {
    let row: BuildingRow = buildings::table
        .find(building_id)
        .first(conn)
        .optional()?
        .ok_or_else(|| RepositoryError::NotFound(format!("Building '{}'", building_id)))?;
    Ok(row.into())
}

fn load_rooms_of(conn: &mut PgConnection, building_id: &str) -> RepositoryResult<Vec<Room>> {
    rooms::table
        .filter(rooms::building_id.eq(building_id))
        .order(rooms::room_id.asc())
        .load::<RoomRow>(conn)?
        .into_iter()
        .map(Room::try_from)
        .collect()
}

fn load_bookings_of(conn: &mut PgConnection, building_id: &str) -> RepositoryResult<Vec<Booking>> {
    bookings::table
        .filter(bookings::building_id.eq(building_id))
        .order(bookings::booking_id.asc())
        .load::<BookingRow>(conn)?
        .into_iter()
        .map(Booking::try_from)
        .collect()
}

fn first_room_of(conn: &mut PgConnection, building_id: &str) -> RepositoryResult<Option<Room>> {
    let row: Option<RoomRow> = rooms::table
        .filter(rooms::building_id.eq(building_id))
        .order(rooms::room_id.asc())
        .first(conn)
        .optional()?;
    row.map(Room::try_from).transpose()
}

/// Closed-interval conflict query: `start <= slot.end AND end >= slot.start`.
fn conflicting_booking_of(
    conn: &mut PgConnection,
    building_id: &str,
    slot: TimeSlot,
    exclude: Option<&str>,
) -> RepositoryResult<Option<Booking>> {
    let mut query = bookings::table
        .filter(bookings::building_id.eq(building_id))
        .filter(bookings::start_time.le(slot.end))
        .filter(bookings::end_time.ge(slot.start))
        .order(bookings::booking_id.asc())
        .into_boxed();
    if let Some(exclude) = exclude {
        query = query.filter(bookings::booking_id.ne(exclude.to_string()));
    }
    let row: Option<BookingRow> = query.first(conn).optional()?;
    row.map(Booking::try_from).transpose()
}

/// The availability rule inside an open connection (and, for guarded
/// writes, inside its transaction).
fn availability_rule(
    conn: &mut PgConnection,
    building_id: &str,
    slot: TimeSlot,
    exclude: Option<&str>,
) -> RepositoryResult<Option<ConflictReason>> {
    let room = first_room_of(conn, building_id)?;
    if let Err(reason) = room_eligibility(room.as_ref()) {
        return Ok(Some(reason));
    }
    if conflicting_booking_of(conn, building_id, slot, exclude)?.is_some() {
        return Ok(Some(ConflictReason::SlotTaken));
    }
    Ok(None)
}

// ==================== Trait implementations ====================

#[async_trait]
impl StoreLifecycle for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1").execute(conn)?;
            Ok(true)
        })
        .await
    }

    async fn close(&self) -> RepositoryResult<()> {
        // r2d2 closes connections when the pool drops; report the final
        // state so shutdowns are visible in the logs.
        let state = self.pool.state();
        log::info!(
            "closing postgres repository (pool: {} connections, {} idle, max {})",
            state.connections,
            state.idle_connections,
            self.config.max_pool_size
        );
        Ok(())
    }
}

#[async_trait]
impl BuildingRepository for PostgresRepository {
    async fn list_buildings(&self) -> RepositoryResult<Vec<BuildingDetail>> {
        self.with_conn(|conn| {
            let rows: Vec<BuildingRow> = buildings::table
                .order(buildings::building_id.asc())
                .load(conn)?;
            rows.into_iter()
                .map(|row| {
                    let building: Building = row.into();
                    let rooms = load_rooms_of(conn, &building.building_id)?;
                    let bookings = load_bookings_of(conn, &building.building_id)?;
                    Ok(BuildingDetail { building, rooms, bookings })
                })
                .collect()
        })
        .await
    }

    async fn get_building(&self, building_id: &str) -> RepositoryResult<BuildingDetail> {
        let building_id = building_id.to_string();
        self.with_conn(move |conn| {
            let building = load_building(conn, &building_id)?;
            let rooms = load_rooms_of(conn, &building_id)?;
            let bookings = load_bookings_of(conn, &building_id)?;
            Ok(BuildingDetail { building, rooms, bookings })
        })
        .await
    }

    async fn insert_building(&self, building: Building) -> RepositoryResult<Building> {
        self.with_conn(move |conn| {
            let row: BuildingRow = diesel::insert_into(buildings::table)
                .values(BuildingRow::from(building))
                .get_result(conn)?;
            Ok(row.into())
        })
        .await
    }

    async fn update_building(&self, building: Building) -> RepositoryResult<Building> {
        self.with_conn(move |conn| {
            let row: Option<BuildingRow> =
                diesel::update(buildings::table.find(building.building_id.as_str()))
                    .set(buildings::floor.eq(building.floor))
                    .get_result(conn)
                    .optional()?;
            row.map(Into::into).ok_or_else(|| {
                RepositoryError::NotFound(format!("Building '{}'", building.building_id))
            })
        })
        .await
    }

    async fn delete_building(&self, building_id: &str) -> RepositoryResult<()> {
        let building_id = building_id.to_string();
        self.with_conn(move |conn| {
            let deleted =
                diesel::delete(buildings::table.find(building_id.as_str())).execute(conn)?;
            if deleted == 0 {
                return Err(RepositoryError::NotFound(format!("Building '{}'", building_id)));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl RoomRepository for PostgresRepository {
    async fn list_rooms(&self) -> RepositoryResult<Vec<RoomDetail>> {
        self.with_conn(|conn| {
            let rows: Vec<(RoomRow, BuildingRow)> = rooms::table
                .inner_join(buildings::table)
                .order(rooms::room_id.asc())
                .load(conn)?;
            rows.into_iter()
                .map(|(room, building)| {
                    Ok(RoomDetail { room: room.try_into()?, building: building.into() })
                })
                .collect()
        })
        .await
    }

    async fn get_room(&self, room_id: &str) -> RepositoryResult<RoomDetail> {
        let room_id = room_id.to_string();
        self.with_conn(move |conn| {
            let row: Option<(RoomRow, BuildingRow)> = rooms::table
                .inner_join(buildings::table)
                .filter(rooms::room_id.eq(room_id.as_str()))
                .first(conn)
                .optional()?;
            let (room, building) =
                row.ok_or_else(|| RepositoryError::NotFound(format!("Room '{}'", room_id)))?;
            Ok(RoomDetail { room: room.try_into()?, building: building.into() })
        })
        .await
    }

    async fn insert_room(&self, room: Room) -> RepositoryResult<Room> {
        self.with_conn(move |conn| {
            let row: RoomRow = diesel::insert_into(rooms::table)
                .values(RoomRow::from(room))
                .get_result(conn)?;
            row.try_into()
        })
        .await
    }

    async fn update_room(&self, room: Room) -> RepositoryResult<Room> {
        self.with_conn(move |conn| {
            let row: Option<RoomRow> = diesel::update(rooms::table.find(room.room_id.as_str()))
                .set((
                    rooms::building_id.eq(room.building_id.clone()),
                    rooms::room_status.eq(room.room_status.as_str()),
                ))
                .get_result(conn)
                .optional()?;
            row.ok_or_else(|| RepositoryError::NotFound(format!("Room '{}'", room.room_id)))?
                .try_into()
        })
        .await
    }

    async fn update_room_status(
        &self,
        room_id: &str,
        status: RoomStatus,
    ) -> RepositoryResult<Room> {
        let room_id = room_id.to_string();
        self.with_conn(move |conn| {
            let row: Option<RoomRow> = diesel::update(rooms::table.find(room_id.as_str()))
                .set(rooms::room_status.eq(status.as_str()))
                .get_result(conn)
                .optional()?;
            row.ok_or_else(|| RepositoryError::NotFound(format!("Room '{}'", room_id)))?
                .try_into()
        })
        .await
    }

    async fn delete_room(&self, room_id: &str) -> RepositoryResult<()> {
        let room_id = room_id.to_string();
        self.with_conn(move |conn| {
            let deleted = diesel::delete(rooms::table.find(room_id.as_str())).execute(conn)?;
            if deleted == 0 {
                return Err(RepositoryError::NotFound(format!("Room '{}'", room_id)));
            }
            Ok(())
        })
        .await
    }

    async fn first_room_in_building(&self, building_id: &str) -> RepositoryResult<Option<Room>> {
        let building_id = building_id.to_string();
        self.with_conn(move |conn| first_room_of(conn, &building_id)).await
    }
}

#[async_trait]
impl BookingRepository for PostgresRepository {
    async fn list_bookings(&self) -> RepositoryResult<Vec<BookingDetail>> {
        self.with_conn(|conn| {
            let rows: Vec<(BookingRow, BuildingRow)> = bookings::table
                .inner_join(buildings::table)
                .order(bookings::booking_id.asc())
                .load(conn)?;
            rows.into_iter()
                .map(|(booking, building)| {
                    Ok(BookingDetail { booking: booking.try_into()?, building: building.into() })
                })
                .collect()
        })
        .await
    }

    async fn get_booking(&self, booking_id: &str) -> RepositoryResult<BookingDetail> {
        let booking_id = booking_id.to_string();
        self.with_conn(move |conn| {
            let row: Option<(BookingRow, BuildingRow)> = bookings::table
                .inner_join(buildings::table)
                .filter(bookings::booking_id.eq(booking_id.as_str()))
                .first(conn)
                .optional()?;
            let (booking, building) =
                row.ok_or_else(|| RepositoryError::NotFound(format!("Booking '{}'", booking_id)))?;
            Ok(BookingDetail { booking: booking.try_into()?, building: building.into() })
        })
        .await
    }

    async fn insert_booking(&self, booking: Booking) -> RepositoryResult<Booking> {
        self.with_conn(move |conn| {
            let row: BookingRow = diesel::insert_into(bookings::table)
                .values(BookingRow::from(booking))
                .get_result(conn)?;
            row.try_into()
        })
        .await
    }

    async fn update_booking(&self, booking: Booking) -> RepositoryResult<Booking> {
        self.with_conn(move |conn| update_booking_row(conn, booking)).await
    }

    async fn delete_booking(&self, booking_id: &str) -> RepositoryResult<()> {
        let booking_id = booking_id.to_string();
        self.with_conn(move |conn| {
            let deleted =
                diesel::delete(bookings::table.find(booking_id.as_str())).execute(conn)?;
            if deleted == 0 {
                return Err(RepositoryError::NotFound(format!("Booking '{}'", booking_id)));
            }
            Ok(())
        })
        .await
    }

    async fn find_conflicting_booking(
        &self,
        building_id: &str,
        slot: TimeSlot,
        exclude: Option<&str>,
    ) -> RepositoryResult<Option<Booking>> {
        let building_id = building_id.to_string();
        let exclude = exclude.map(str::to_string);
        self.with_conn(move |conn| {
            conflicting_booking_of(conn, &building_id, slot, exclude.as_deref())
        })
        .await
    }

    async fn insert_booking_guarded(&self, booking: Booking) -> RepositoryResult<GuardedWrite> {
        self.with_conn(move |conn| {
            conn.build_transaction()
                .serializable()
                .run(|conn| -> RepositoryResult<GuardedWrite> {
                    if let Some(reason) =
                        availability_rule(conn, &booking.building_id, booking.slot(), None)?
                    {
                        return Ok(GuardedWrite::Rejected(reason));
                    }
                    let row: BookingRow = diesel::insert_into(bookings::table)
                        .values(BookingRow::from(booking))
                        .get_result(conn)?;
                    Ok(GuardedWrite::Written(row.try_into()?))
                })
        })
        .await
    }

    async fn update_booking_guarded(&self, booking: Booking) -> RepositoryResult<GuardedWrite> {
        self.with_conn(move |conn| {
            conn.build_transaction()
                .serializable()
                .run(|conn| -> RepositoryResult<GuardedWrite> {
                    if let Some(reason) = availability_rule(
                        conn,
                        &booking.building_id,
                        booking.slot(),
                        Some(booking.booking_id.as_str()),
                    )? {
                        return Ok(GuardedWrite::Rejected(reason));
                    }
                    Ok(GuardedWrite::Written(update_booking_row(conn, booking)?))
                })
        })
        .await
    }
}

fn update_booking_row(conn: &mut PgConnection, booking: Booking) -> RepositoryResult<Booking> {
    let row: Option<BookingRow> = diesel::update(bookings::table.find(booking.booking_id.as_str()))
        .set((
            bookings::building_id.eq(booking.building_id.clone()),
            bookings::name.eq(booking.name.clone()),
            bookings::description.eq(booking.description.clone()),
            bookings::start_time.eq(booking.start_time),
            bookings::end_time.eq(booking.end_time),
            bookings::created_by.eq(booking.created_by.clone()),
            bookings::modified_by.eq(booking.modified_by.clone()),
            bookings::booking_type.eq(booking.booking_type.as_str()),
            bookings::repeat_interval.eq(booking.repeat_interval.as_str()),
            bookings::repeat_day.eq(booking.repeat_day.as_str()),
            bookings::last_update.eq(booking.last_update),
        ))
        .get_result(conn)
        .optional()?;
    row.ok_or_else(|| RepositoryError::NotFound(format!("Booking '{}'", booking.booking_id)))?
        .try_into()
}
