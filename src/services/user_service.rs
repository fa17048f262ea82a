use crate::dto::user_dto::{CreateUserPayload, UpdateUserPayload, UserListQuery};
use crate::error::{Error, Result};
use crate::models::user::{Role, User};
use crate::utils::crypto::hash_password;
use crate::utils::pagination::{PageMeta, Pagination};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, password_hash, name, role, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

pub struct UserList {
    pub items: Vec<User>,
    pub meta: PageMeta,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_self_update(id: Uuid, acting_user: Uuid, payload: &UpdateUserPayload) -> Result<()> {
    if id != acting_user {
        return Ok(());
    }
    if matches!(payload.role, Some(role) if role != Role::Admin) {
        return Err(Error::BadRequest("You cannot remove your own admin role".into()));
    }
    if payload.is_active == Some(false) {
        return Err(Error::BadRequest("You cannot deactivate your own account".into()));
    }
    Ok(())
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateUserPayload) -> Result<User> {
        let email = normalize_email(&payload.email);
        let password_hash = hash_password(&payload.password)?;
        let role = payload.role.unwrap_or_default();

        let query = format!(
            "INSERT INTO users (id, email, password_hash, name, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(Uuid::new_v4())
            .bind(&email)
            .bind(password_hash)
            .bind(payload.name.trim())
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match Error::from(e) {
                Error::Conflict(_) => Error::Conflict("Email is already registered".into()),
                other => other,
            })?;

        tracing::info!(user_id = %user.id, role = %user.role, "user created");
        Ok(user)
    }

    pub async fn list(&self, query: UserListQuery) -> Result<UserList> {
        let pagination = Pagination::new(query.page, query.limit);
        let role = query.role.map(|r| r.as_str());
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let filter = "WHERE ($1::text IS NULL OR role = $1)
              AND ($2::boolean IS NULL OR is_active = $2)
              AND ($3::text IS NULL OR name ILIKE $3 OR email ILIKE $3)";

        let items_query = format!(
            "SELECT {} FROM users {} ORDER BY created_at DESC, id DESC LIMIT $4 OFFSET $5",
            USER_COLUMNS, filter
        );
        let items = sqlx::query_as::<_, User>(&items_query)
            .bind(role)
            .bind(query.is_active)
            .bind(search.as_deref())
            .bind(pagination.limit)
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM users {}", filter))
            .bind(role)
            .bind(query.is_active)
            .bind(search.as_deref())
            .fetch_one(&self.pool)
            .await?;

        Ok(UserList {
            items,
            meta: pagination.meta(total),
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<User> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".into()))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateUserPayload) -> Result<User> {
        let password_hash = payload
            .password
            .as_deref()
            .map(hash_password)
            .transpose()?;
        let email = payload.email.as_deref().map(normalize_email);
        let name = payload.name.as_deref().map(str::trim);

        let query = format!(
            "UPDATE users SET
                email = COALESCE($2, email),
                password_hash = COALESCE($3, password_hash),
                name = COALESCE($4, name),
                role = COALESCE($5, role),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(email)
            .bind(password_hash)
            .bind(name)
            .bind(payload.role.map(|r| r.as_str()))
            .bind(payload.is_active)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| match Error::from(e) {
                Error::Conflict(_) => Error::Conflict("Email is already registered".into()),
                other => other,
            })?
            .ok_or_else(|| Error::NotFound("User not found".into()))?;

        tracing::info!(user_id = %user.id, "user updated");
        Ok(user)
    }

    /// Admin update of any account. The acting admin cannot demote or
    /// deactivate themselves.
    pub async fn update_as(
        &self,
        id: Uuid,
        acting_user: Uuid,
        payload: UpdateUserPayload,
    ) -> Result<User> {
        check_self_update(id, acting_user, &payload)?;
        self.update(id, payload).await
    }

    /// Deletes a user. `acting_user` may not delete their own account.
    pub async fn delete(&self, id: Uuid, acting_user: Uuid) -> Result<()> {
        if id == acting_user {
            return Err(Error::BadRequest("You cannot delete your own account".into()));
        }
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("User not found".into()));
        }
        tracing::info!(user_id = %id, deleted_by = %acting_user, "user deleted");
        Ok(())
    }

    /// Seeds the administrator account once; an existing email is left alone.
    pub async fn ensure_admin(&self, email: &str, password: &str, name: &str) -> Result<()> {
        if let Some(existing) = self.find_by_email(email).await? {
            if existing.is_admin() {
                tracing::debug!(user_id = %existing.id, "admin account already present");
            } else {
                tracing::warn!(
                    user_id = %existing.id,
                    "admin seed email belongs to a non-admin account, leaving it unchanged"
                );
            }
            return Ok(());
        }
        let user = self
            .create(CreateUserPayload {
                email: email.to_string(),
                password: password.to_string(),
                name: name.to_string(),
                role: Some(Role::Admin),
            })
            .await?;
        tracing::info!(user_id = %user.id, "seeded admin account");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_cannot_lock_themselves_out() {
        let me = Uuid::new_v4();
        let demote = UpdateUserPayload {
            role: Some(Role::User),
            ..Default::default()
        };
        let deactivate = UpdateUserPayload {
            is_active: Some(false),
            ..Default::default()
        };
        assert!(matches!(check_self_update(me, me, &demote), Err(Error::BadRequest(_))));
        assert!(matches!(check_self_update(me, me, &deactivate), Err(Error::BadRequest(_))));

        let rename = UpdateUserPayload {
            name: Some("New Name".into()),
            role: Some(Role::Admin),
            is_active: Some(true),
            ..Default::default()
        };
        assert!(check_self_update(me, me, &rename).is_ok());
        assert!(check_self_update(Uuid::new_v4(), me, &demote).is_ok());
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Ana.Souza@Example.COM "), "ana.souza@example.com");
    }
}
