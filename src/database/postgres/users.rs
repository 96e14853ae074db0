use async_trait::async_trait;
use uuid::Uuid;

use super::{username_conflict, PgStore, USER_COLUMNS};
use crate::database::models::{NewUser, User, UserChanges};
use crate::database::{DatabaseError, UserStore};

#[async_trait]
impl UserStore for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (id, username, password, role) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(username_conflict)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users ORDER BY created ASC", USER_COLUMNS);
        let users = sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?;
        Ok(users)
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE users SET
                username      = COALESCE($2, username),
                password      = COALESCE($3, password),
                role          = COALESCE($4, role),
                profile_photo = CASE WHEN $5 THEN $6 ELSE profile_photo END
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.username)
            .bind(changes.password_hash)
            .bind(changes.role.map(|r| r.as_str()))
            .bind(changes.profile_photo.is_some())
            .bind(changes.profile_photo.flatten())
            .fetch_optional(&self.pool)
            .await
            .map_err(username_conflict)
    }

    async fn delete_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("DELETE FROM users WHERE id = $1 RETURNING {}", USER_COLUMNS);
        let deleted = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        if deleted.is_some() {
            sqlx::query(
                r#"
                UPDATE users SET
                    subscribers      = array_remove(subscribers, $1::uuid),
                    subscribed_users = array_remove(subscribed_users, $1::uuid)
                WHERE $1::uuid = ANY(subscribers) OR $1::uuid = ANY(subscribed_users)
                "#,
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(deleted)
    }

    async fn subscribe(&self, user_id: Uuid, target_id: Uuid) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE users SET subscribed_users = array_append(subscribed_users, $2::uuid)
            WHERE id = $1 AND NOT ($2::uuid = ANY(subscribed_users))
            "#,
        )
        .bind(user_id)
        .bind(target_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE users SET subscribers = array_append(subscribers, $2::uuid)
            WHERE id = $1 AND NOT ($2::uuid = ANY(subscribers))
            "#,
        )
        .bind(target_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn unsubscribe(&self, user_id: Uuid, target_id: Uuid) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE users SET subscribed_users = array_remove(subscribed_users, $2::uuid) WHERE id = $1")
            .bind(user_id)
            .bind(target_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE users SET subscribers = array_remove(subscribers, $2::uuid) WHERE id = $1")
            .bind(target_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
