//! PostgreSQL Repository Implementation

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use kernel::query::ListQuery;
use kernel::query::sql::{Column, ColumnMap, ColumnType, push_page};
use platform::password::HashedPassword;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email, full_name::FullName, user_name::UserName, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// Queryable user fields
pub const USER_COLUMNS: ColumnMap = ColumnMap::new(&[
    Column::new("id", "id", ColumnType::Uuid),
    Column::new("name", "name", ColumnType::Text),
    Column::new("username", "username", ColumnType::Text),
    Column::new("email", "email", ColumnType::Text),
    Column::new("role", "role", ColumnType::Text),
    Column::new("isEmailVerified", "is_email_verified", ColumnType::Bool),
    Column::new("passwordChangedAt", "password_changed_at", ColumnType::Timestamp),
    Column::new("createdAt", "created_at", ColumnType::Timestamp),
    Column::new("updatedAt", "updated_at", ColumnType::Timestamp),
]);

const SELECT_USER: &str = r#"
    SELECT
        id,
        name,
        username,
        email,
        role,
        password_hash,
        is_email_verified,
        email_verification_otp,
        email_verification_otp_expires,
        password_changed_at,
        password_reset_token,
        password_reset_expires,
        created_at,
        updated_at
    FROM users
"#;

/// PostgreSQL-backed user repository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(
        &self,
        condition: &str,
        binds: impl FnOnce(&mut QueryBuilder<'_, Postgres>),
    ) -> AuthResult<Option<User>> {
        let mut qb = QueryBuilder::new(SELECT_USER);
        qb.push(" WHERE ").push(condition);
        binds(&mut qb);
        let row = qb
            .build_query_as::<UserRow>()
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserRow::into_user).transpose()
    }
}

impl UserRepository for PgUserRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id,
                name,
                username,
                email,
                role,
                password_hash,
                is_email_verified,
                email_verification_otp,
                email_verification_otp_expires,
                password_changed_at,
                password_reset_token,
                password_reset_expires,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(user.name.as_str())
        .bind(user.user_name.as_str())
        .bind(user.email.as_str())
        .bind(user.role.code())
        .bind(user.password_hash.as_phc_string())
        .bind(user.is_email_verified)
        .bind(user.email_verification_otp.as_deref())
        .bind(user.email_verification_otp_expires)
        .bind(user.password_changed_at)
        .bind(user.password_reset_token.as_deref())
        .bind(user.password_reset_expires)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> AuthResult<Option<User>> {
        self.fetch_one_where("id = ", |qb| {
            qb.push_bind(*id.as_uuid());
        })
        .await
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let email = email.as_str().to_string();
        self.fetch_one_where("email = ", |qb| {
            qb.push_bind(email);
        })
        .await
    }

    async fn find_by_verification_otp(
        &self,
        email: &Email,
        otp_hash: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<User>> {
        let email = email.as_str().to_string();
        let otp_hash = otp_hash.to_string();
        self.fetch_one_where("email = ", |qb| {
            qb.push_bind(email);
            qb.push(" AND email_verification_otp = ");
            qb.push_bind(otp_hash);
            qb.push(" AND email_verification_otp_expires > ");
            qb.push_bind(now);
        })
        .await
    }

    async fn find_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<User>> {
        let token_hash = token_hash.to_string();
        self.fetch_one_where("password_reset_token = ", |qb| {
            qb.push_bind(token_hash);
            qb.push(" AND password_reset_expires > ");
            qb.push_bind(now);
        })
        .await
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn exists_by_user_name(&self, user_name: &UserName) -> AuthResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(user_name.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                name = $2,
                username = $3,
                email = $4,
                role = $5,
                password_hash = $6,
                is_email_verified = $7,
                email_verification_otp = $8,
                email_verification_otp_expires = $9,
                password_changed_at = $10,
                password_reset_token = $11,
                password_reset_expires = $12,
                updated_at = $13
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(user.name.as_str())
        .bind(user.user_name.as_str())
        .bind(user.email.as_str())
        .bind(user.role.code())
        .bind(user.password_hash.as_phc_string())
        .bind(user.is_email_verified)
        .bind(user.email_verification_otp.as_deref())
        .bind(user.email_verification_otp_expires)
        .bind(user.password_changed_at)
        .bind(user.password_reset_token.as_deref())
        .bind(user.password_reset_expires)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> AuthResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_page(&self, query: &ListQuery) -> AuthResult<Vec<User>> {
        let mut qb = QueryBuilder::new(SELECT_USER);
        qb.push(" WHERE TRUE");
        USER_COLUMNS.push_filter(&mut qb, &query.filter)?;
        USER_COLUMNS.push_order_by(&mut qb, &query.sort, query.filter.text_search.as_ref())?;
        push_page(&mut qb, query.page);

        let rows = qb.build_query_as::<UserRow>().fetch_all(&self.pool).await?;
        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn count(&self, query: &ListQuery) -> AuthResult<u64> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM users WHERE TRUE");
        USER_COLUMNS.push_filter(&mut qb, &query.filter)?;

        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    username: String,
    email: String,
    role: String,
    password_hash: String,
    is_email_verified: bool,
    email_verification_otp: Option<String>,
    email_verification_otp_expires: Option<DateTime<Utc>>,
    password_changed_at: Option<DateTime<Utc>>,
    password_reset_token: Option<String>,
    password_reset_expires: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let role = UserRole::from_code(&self.role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid role: {}", self.role)))?;
        let password_hash = HashedPassword::from_phc_string(self.password_hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash: {e}")))?;

        Ok(User {
            id: UserId::from_uuid(self.id),
            name: FullName::from_db(self.name),
            user_name: UserName::from_db(self.username),
            email: Email::from_db(self.email),
            role,
            password_hash,
            is_email_verified: self.is_email_verified,
            email_verification_otp: self.email_verification_otp,
            email_verification_otp_expires: self.email_verification_otp_expires,
            password_changed_at: self.password_changed_at,
            password_reset_token: self.password_reset_token,
            password_reset_expires: self.password_reset_expires,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
