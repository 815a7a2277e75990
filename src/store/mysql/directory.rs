use async_trait::async_trait;
use sqlx::FromRow;
use tracing::warn;

use super::MySqlStore;
use crate::model::{Department, Profile, Role};
use crate::store::{Directory, StoreError};

#[derive(FromRow)]
struct ProfileRow {
    id: u64,
    full_name: String,
    role_id: u8,
    department_id: Option<u64>,
}

impl MySqlStore {
    async fn first_with_role(
        &self,
        role: Role,
        department_id: Option<u64>,
    ) -> Result<Option<u64>, StoreError> {
        let id = match department_id {
            Some(department_id) => {
                sqlx::query_scalar::<_, u64>(
                    r#"
                    SELECT id FROM users
                    WHERE role_id = ? AND department_id = ? AND is_active = TRUE
                    ORDER BY id
                    LIMIT 1
                    "#,
                )
                .bind(role.id())
                .bind(department_id)
                .fetch_optional(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar::<_, u64>(
                    r#"
                    SELECT id FROM users
                    WHERE role_id = ? AND is_active = TRUE
                    ORDER BY id
                    LIMIT 1
                    "#,
                )
                .bind(role.id())
                .fetch_optional(&self.pool)
                .await?
            }
        };
        Ok(id)
    }
}

#[async_trait]
impl Directory for MySqlStore {
    async fn profile(&self, user_id: u64) -> Result<Option<Profile>, StoreError> {
        if let Some(profile) = self.profiles.get(&user_id).await {
            return Ok(Some(profile));
        }

        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, full_name, role_id, department_id
            FROM users
            WHERE id = ? AND is_active = TRUE
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let Some(role) = Role::from_id(row.role_id) else {
            warn!(user_id, role_id = row.role_id, "User has an unknown role id");
            return Err(StoreError::Corrupt(format!(
                "users.role_id has unexpected value {}",
                row.role_id
            )));
        };

        let profile = Profile {
            user_id: row.id,
            full_name: row.full_name,
            role,
            department_id: row.department_id,
        };
        self.profiles.insert(user_id, profile.clone()).await;
        Ok(Some(profile))
    }

    async fn department(&self, department_id: u64) -> Result<Option<Department>, StoreError> {
        Ok(
            sqlx::query_as::<_, Department>("SELECT id, name FROM departments WHERE id = ?")
                .bind(department_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn department_head(&self, department_id: u64) -> Result<Option<u64>, StoreError> {
        self.first_with_role(Role::Hod, Some(department_id)).await
    }

    async fn principal(&self) -> Result<Option<u64>, StoreError> {
        self.first_with_role(Role::Principal, None).await
    }
}
