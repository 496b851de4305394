//! User repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::restaurant::NewRestaurant;
use domain::models::user::{
    AdminUpdateUserRequest, NewUser, RestaurantSignup, UpdateProfileRequest,
};
use domain::models::Role;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{RestaurantEntity, UserEntity};
use crate::metrics::QueryTimer;
use crate::repositories::restaurant::insert_restaurant;

/// Which unique field an account would collide on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountConflict {
    Username,
    Email,
}

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, username, email, password_hash, first_name, last_name, role, phone, address,
                   avatar, is_available, is_active, created_at, updated_at, last_login_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a user by email (case-insensitive) or exact username.
    ///
    /// An exact username match wins when both could apply.
    pub async fn find_by_login(&self, login: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_login");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, username, email, password_hash, first_name, last_name, role, phone, address,
                   avatar, is_available, is_active, created_at, updated_at, last_login_at
            FROM users
            WHERE LOWER(email) = LOWER($1) OR username = $1
            ORDER BY (username = $1) DESC
            LIMIT 1
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an active driver, used to validate order assignments.
    pub async fn find_active_driver(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_active_driver");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, username, email, password_hash, first_name, last_name, role, phone, address,
                   avatar, is_available, is_active, created_at, updated_at, last_login_at
            FROM users
            WHERE id = $1 AND role = 'driver' AND is_active = true
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Reports whether the username or email is already taken by another account.
    pub async fn find_conflict(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        except: Option<Uuid>,
    ) -> Result<Option<AccountConflict>, sqlx::Error> {
        let timer = QueryTimer::new("find_account_conflict");
        let row: Option<(bool,)> = sqlx::query_as(
            r#"
            SELECT COALESCE(username = $1, false) AS username_taken
            FROM users
            WHERE (username = $1 OR LOWER(email) = LOWER($2))
              AND ($3::UUID IS NULL OR id <> $3)
            ORDER BY (username = $1) DESC
            LIMIT 1
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(except)
        .fetch_optional(&self.pool)
        .await?;
        timer.record();

        Ok(row.map(|(username_taken,)| {
            if username_taken {
                AccountConflict::Username
            } else {
                AccountConflict::Email
            }
        }))
    }

    /// Create an account together with its cart and, for new managers, their restaurant.
    pub async fn create_account(
        &self,
        new_user: &NewUser,
        signup: Option<&RestaurantSignup>,
    ) -> Result<(UserEntity, Option<RestaurantEntity>), sqlx::Error> {
        let timer = QueryTimer::new("create_account");

        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (username, email, password_hash, first_name, last_name, role,
                               phone, address, is_available, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, username, email, password_hash, first_name, last_name, role, phone,
                      address, avatar, is_available, is_active, created_at, updated_at, last_login_at
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(new_user.role.as_str())
        .bind(&new_user.phone)
        .bind(&new_user.address)
        .bind(new_user.is_available)
        .bind(new_user.is_active)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO carts (user_id) VALUES ($1)")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        let restaurant = match signup {
            Some(signup) => {
                let new_restaurant = NewRestaurant::for_manager(
                    &signup.name,
                    signup.address.as_deref(),
                    signup.phone.as_deref(),
                    &new_user.phone,
                    user.id,
                );
                Some(insert_restaurant(&mut *tx, &new_restaurant).await?)
            }
            None => None,
        };

        tx.commit().await?;
        timer.record();
        Ok((user, restaurant))
    }

    /// Update user's last login timestamp.
    pub async fn update_last_login(
        &self,
        user_id: Uuid,
        last_login_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("update_user_last_login");
        sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = $1
            WHERE id = $2
            "#,
        )
        .bind(last_login_at)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(())
    }

    /// Self-service profile update. Unset fields are kept.
    pub async fn update_profile(
        &self,
        id: Uuid,
        request: &UpdateProfileRequest,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_user_profile");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                email = COALESCE(LOWER($3), email),
                first_name = COALESCE($4, first_name),
                last_name = COALESCE($5, last_name),
                phone = COALESCE($6, phone),
                address = COALESCE($7, address),
                is_available = COALESCE($8, is_available),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, email, password_hash, first_name, last_name, role, phone,
                      address, avatar, is_available, is_active, created_at, updated_at, last_login_at
            "#,
        )
        .bind(id)
        .bind(request.username.as_deref())
        .bind(request.email.as_deref().map(str::trim))
        .bind(request.first_name.as_deref())
        .bind(request.last_name.as_deref())
        .bind(request.phone.as_deref())
        .bind(request.address.as_deref())
        .bind(request.is_available)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Administrative update, including role and activation.
    pub async fn admin_update(
        &self,
        id: Uuid,
        request: &AdminUpdateUserRequest,
        password_hash: Option<&str>,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("admin_update_user");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            UPDATE users
            SET username = COALESCE($2, username),
                email = COALESCE(LOWER($3), email),
                first_name = COALESCE($4, first_name),
                last_name = COALESCE($5, last_name),
                role = COALESCE($6, role),
                phone = COALESCE($7, phone),
                address = COALESCE($8, address),
                is_available = COALESCE($9, is_available),
                is_active = COALESCE($10, is_active),
                password_hash = COALESCE($11, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, email, password_hash, first_name, last_name, role, phone,
                      address, avatar, is_available, is_active, created_at, updated_at, last_login_at
            "#,
        )
        .bind(id)
        .bind(request.username.as_deref())
        .bind(request.email.as_deref().map(str::trim))
        .bind(request.first_name.as_deref())
        .bind(request.last_name.as_deref())
        .bind(request.role.map(|r| r.as_str()))
        .bind(request.phone.as_deref())
        .bind(request.address.as_deref())
        .bind(request.is_available)
        .bind(request.is_active)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Store the path of a freshly uploaded avatar.
    pub async fn set_avatar(
        &self,
        id: Uuid,
        path: &str,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("set_user_avatar");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            UPDATE users
            SET avatar = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, email, password_hash, first_name, last_name, role, phone,
                      address, avatar, is_available, is_active, created_at, updated_at, last_login_at
            "#,
        )
        .bind(id)
        .bind(path)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Flip the availability flag, returning the new value.
    pub async fn toggle_availability(&self, id: Uuid) -> Result<Option<bool>, sqlx::Error> {
        let timer = QueryTimer::new("toggle_user_availability");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            UPDATE users
            SET is_available = NOT is_available, updated_at = NOW()
            WHERE id = $1
            RETURNING is_available
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Set availability on many drivers at once. Non-drivers are skipped.
    pub async fn bulk_set_availability(
        &self,
        ids: &[Uuid],
        is_available: bool,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("bulk_set_driver_availability");
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_available = $2, updated_at = NOW()
            WHERE id = ANY($1) AND role = 'driver'
            "#,
        )
        .bind(ids)
        .bind(is_available)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// List accounts, newest first, optionally restricted to one role.
    pub async fn list(&self, role: Option<Role>) -> Result<Vec<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_users");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, username, email, password_hash, first_name, last_name, role, phone, address,
                   avatar, is_available, is_active, created_at, updated_at, last_login_at
            FROM users
            WHERE ($1::TEXT IS NULL OR role = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(role.map(|r| r.as_str()))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete an account. Returns false when it did not exist.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_user");
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }
}
