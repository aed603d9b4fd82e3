//! PostgreSQL Repository Implementation

use chrono::{DateTime, NaiveTime, Utc};
use kernel::id::TourId;
use kernel::query::ListQuery;
use kernel::query::sql::{Column, ColumnMap, ColumnType, SearchColumns, push_page};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::entity::tour::Tour;
use crate::domain::repository::TourRepository;
use crate::domain::stats::{DifficultyStats, MONTHLY_PLAN_LIMIT, MonthlyPlan, year_bounds};
use crate::domain::value_object::{difficulty::Difficulty, tour_name::TourName};
use crate::error::{TourError, TourResult};

/// Queryable tour fields. Arrays and `secretTour` are not filterable.
pub const TOUR_COLUMNS: ColumnMap = ColumnMap::new(&[
    Column::new("id", "id", ColumnType::Uuid),
    Column::new("name", "name", ColumnType::Text),
    Column::new("slug", "slug", ColumnType::Text),
    Column::new("duration", "duration", ColumnType::Integer),
    Column::new("maxGroupSize", "max_group_size", ColumnType::Integer),
    Column::new("difficulty", "difficulty", ColumnType::Text),
    Column::new("ratingsAverage", "ratings_average", ColumnType::Float),
    Column::new("ratingsQuantity", "ratings_quantity", ColumnType::Integer),
    Column::new("price", "price", ColumnType::Float),
    Column::new("priceDiscount", "price_discount", ColumnType::Float),
    Column::new("summary", "summary", ColumnType::Text),
    Column::new("description", "description", ColumnType::Text),
    Column::new("imageCover", "image_cover", ColumnType::Text),
    Column::new("createdAt", "created_at", ColumnType::Timestamp),
    Column::new("updatedAt", "updated_at", ColumnType::Timestamp),
])
.with_search(SearchColumns {
    vector: "search_vector",
    text: &["name", "description"],
});

/// Check constraint keeping the discount below the price
const DISCOUNT_CONSTRAINT: &str = "tours_price_discount_below_price";

const SELECT_TOUR: &str = r#"
    SELECT
        id,
        name,
        slug,
        duration,
        max_group_size,
        difficulty,
        ratings_average,
        ratings_quantity,
        price,
        price_discount,
        summary,
        description,
        image_cover,
        images,
        start_dates,
        secret_tour,
        created_at,
        updated_at
    FROM tours
    WHERE secret_tour = FALSE
"#;

const INSERT_TOUR: &str = r#"
    INSERT INTO tours (
        id,
        name,
        slug,
        duration,
        max_group_size,
        difficulty,
        ratings_average,
        ratings_quantity,
        price,
        price_discount,
        summary,
        description,
        image_cover,
        images,
        start_dates,
        secret_tour,
        created_at,
        updated_at
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
"#;

/// PostgreSQL-backed tour repository
#[derive(Clone)]
pub struct PgTourRepository {
    pool: PgPool,
}

impl PgTourRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn insert_query(tour: &Tour) -> sqlx::query::Query<'_, Postgres, sqlx::postgres::PgArguments> {
    sqlx::query(INSERT_TOUR)
        .bind(tour.id.as_uuid())
        .bind(tour.name.as_str())
        .bind(&tour.slug)
        .bind(tour.duration)
        .bind(tour.max_group_size)
        .bind(tour.difficulty.code())
        .bind(tour.ratings_average)
        .bind(tour.ratings_quantity)
        .bind(tour.price)
        .bind(tour.price_discount)
        .bind(&tour.summary)
        .bind(tour.description.as_deref())
        .bind(&tour.image_cover)
        .bind(&tour.images)
        .bind(&tour.start_dates)
        .bind(tour.secret_tour)
        .bind(tour.created_at)
        .bind(tour.updated_at)
}

/// The discount check surfaces as a validation error, everything else
/// goes through the generic database mapping.
fn map_write_error(err: sqlx::Error) -> TourError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.constraint() == Some(DISCOUNT_CONSTRAINT) {
            return TourError::Validation(vec![
                "Discount price should be below regular price".to_string(),
            ]);
        }
    }
    TourError::Database(err)
}

impl TourRepository for PgTourRepository {
    async fn create(&self, tour: &Tour) -> TourResult<()> {
        insert_query(tour)
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(())
    }

    async fn create_many(&self, tours: &[Tour]) -> TourResult<()> {
        let mut tx = self.pool.begin().await?;
        for tour in tours {
            insert_query(tour)
                .execute(&mut *tx)
                .await
                .map_err(map_write_error)?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &TourId) -> TourResult<Option<Tour>> {
        let mut qb = QueryBuilder::new(SELECT_TOUR);
        qb.push(" AND id = ").push_bind(*id.as_uuid());
        let row = qb
            .build_query_as::<TourRow>()
            .fetch_optional(&self.pool)
            .await?;
        row.map(TourRow::into_tour).transpose()
    }

    async fn update(&self, tour: &Tour) -> TourResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE tours SET
                name = $2,
                slug = $3,
                duration = $4,
                max_group_size = $5,
                difficulty = $6,
                ratings_average = $7,
                ratings_quantity = $8,
                price = $9,
                price_discount = $10,
                summary = $11,
                description = $12,
                image_cover = $13,
                images = $14,
                start_dates = $15,
                secret_tour = $16,
                updated_at = $17
            WHERE id = $1 AND secret_tour = FALSE
            "#,
        )
        .bind(tour.id.as_uuid())
        .bind(tour.name.as_str())
        .bind(&tour.slug)
        .bind(tour.duration)
        .bind(tour.max_group_size)
        .bind(tour.difficulty.code())
        .bind(tour.ratings_average)
        .bind(tour.ratings_quantity)
        .bind(tour.price)
        .bind(tour.price_discount)
        .bind(&tour.summary)
        .bind(tour.description.as_deref())
        .bind(&tour.image_cover)
        .bind(&tour.images)
        .bind(&tour.start_dates)
        .bind(tour.secret_tour)
        .bind(tour.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(TourError::TourNotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &TourId) -> TourResult<bool> {
        let result = sqlx::query("DELETE FROM tours WHERE id = $1 AND secret_tour = FALSE")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> TourResult<u64> {
        let result = sqlx::query("DELETE FROM tours").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn find_page(&self, query: &ListQuery) -> TourResult<Vec<Tour>> {
        let mut qb = QueryBuilder::new(SELECT_TOUR);
        TOUR_COLUMNS.push_filter(&mut qb, &query.filter)?;
        TOUR_COLUMNS.push_order_by(&mut qb, &query.sort, query.filter.text_search.as_ref())?;
        push_page(&mut qb, query.page);

        let rows = qb.build_query_as::<TourRow>().fetch_all(&self.pool).await?;
        rows.into_iter().map(TourRow::into_tour).collect()
    }

    async fn count(&self, query: &ListQuery) -> TourResult<u64> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM tours WHERE secret_tour = FALSE");
        TOUR_COLUMNS.push_filter(&mut qb, &query.filter)?;

        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn difficulty_stats(&self, min_rating: f64) -> TourResult<Vec<DifficultyStats>> {
        let rows = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT
                UPPER(difficulty) AS difficulty,
                COUNT(*) AS num_tours,
                COALESCE(SUM(ratings_quantity), 0)::BIGINT AS num_ratings,
                AVG(ratings_average) AS avg_rating,
                AVG(price) AS avg_price,
                MIN(price) AS min_price,
                MAX(price) AS max_price
            FROM tours
            WHERE secret_tour = FALSE AND ratings_average >= $1
            GROUP BY UPPER(difficulty)
            ORDER BY avg_price
            "#,
        )
        .bind(min_rating)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(StatsRow::into_stats).collect())
    }

    async fn monthly_plan(&self, year: i32) -> TourResult<Vec<MonthlyPlan>> {
        let (start, end) =
            year_bounds(year).ok_or_else(|| TourError::InvalidYear(year.to_string()))?;
        let start: DateTime<Utc> = start.and_time(NaiveTime::MIN).and_utc();
        let end: DateTime<Utc> = end.and_time(NaiveTime::MIN).and_utc();

        let rows = sqlx::query_as::<_, MonthlyPlanRow>(
            r#"
            SELECT
                EXTRACT(MONTH FROM start_date AT TIME ZONE 'UTC')::INT AS month,
                COUNT(*) AS num_tour_starts,
                ARRAY_AGG(name ORDER BY name) AS tours
            FROM tours, UNNEST(start_dates) AS start_date
            WHERE secret_tour = FALSE
                AND start_date >= $1
                AND start_date < $2
            GROUP BY month
            ORDER BY num_tour_starts DESC, month
            LIMIT $3
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(MONTHLY_PLAN_LIMIT as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MonthlyPlanRow::into_plan).collect())
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct TourRow {
    id: Uuid,
    name: String,
    slug: String,
    duration: i32,
    max_group_size: i32,
    difficulty: String,
    ratings_average: f64,
    ratings_quantity: i32,
    price: f64,
    price_discount: Option<f64>,
    summary: String,
    description: Option<String>,
    image_cover: String,
    images: Vec<String>,
    start_dates: Vec<DateTime<Utc>>,
    secret_tour: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TourRow {
    fn into_tour(self) -> TourResult<Tour> {
        let difficulty = Difficulty::from_code(&self.difficulty)
            .ok_or_else(|| TourError::Internal(format!("Invalid difficulty: {}", self.difficulty)))?;

        Ok(Tour {
            id: TourId::from_uuid(self.id),
            name: TourName::from_db(self.name),
            slug: self.slug,
            duration: self.duration,
            max_group_size: self.max_group_size,
            difficulty,
            ratings_average: self.ratings_average,
            ratings_quantity: self.ratings_quantity,
            price: self.price,
            price_discount: self.price_discount,
            summary: self.summary,
            description: self.description,
            image_cover: self.image_cover,
            images: self.images,
            start_dates: self.start_dates,
            secret_tour: self.secret_tour,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    difficulty: String,
    num_tours: i64,
    num_ratings: i64,
    avg_rating: f64,
    avg_price: f64,
    min_price: f64,
    max_price: f64,
}

impl StatsRow {
    fn into_stats(self) -> DifficultyStats {
        DifficultyStats {
            difficulty: self.difficulty,
            num_tours: u64::try_from(self.num_tours).unwrap_or_default(),
            num_ratings: self.num_ratings,
            avg_rating: self.avg_rating,
            avg_price: self.avg_price,
            min_price: self.min_price,
            max_price: self.max_price,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MonthlyPlanRow {
    month: i32,
    num_tour_starts: i64,
    tours: Vec<String>,
}

impl MonthlyPlanRow {
    fn into_plan(self) -> MonthlyPlan {
        MonthlyPlan {
            month: u32::try_from(self.month).unwrap_or_default(),
            num_tour_starts: u64::try_from(self.num_tour_starts).unwrap_or_default(),
            tours: self.tours,
        }
    }
}
