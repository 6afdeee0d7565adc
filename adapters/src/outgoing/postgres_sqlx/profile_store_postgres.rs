use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use domain::user::UserId;
use storefront_application::{
    contracts::profile::{NewProfile, ProfileChanges, ProfileKey, ProfileRecord},
    error::AppResult,
    ports::outgoing::profile_store::ProfileStorePort,
};

use super::utils::{PostgresExecutor, validate_identifier};

const PROFILE_COLUMNS: &str =
    "id, first_name, last_name, email, phone, date_of_birth::text AS date_of_birth";

#[derive(FromRow)]
struct ProfileRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    date_of_birth: Option<String>,
}

impl From<ProfileRow> for ProfileRecord {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            date_of_birth: row.date_of_birth,
        }
    }
}

/// SQL rendering of a single-row lookup on `column`.
fn select_by(table: &str, column: &str) -> String {
    format!("SELECT {PROFILE_COLUMNS} FROM {table} WHERE {column} = $1 LIMIT 1")
}

/// `UPDATE` touching only the provided columns. `None` when there is nothing
/// to write.
fn update_statement<'a>(
    table: &str,
    id: &UserId,
    changes: &'a ProfileChanges,
) -> Option<QueryBuilder<'a, Postgres>> {
    let columns = changes.columns();
    if columns.is_empty() {
        return None;
    }

    let mut builder = QueryBuilder::new(format!("UPDATE {table} SET "));
    let mut assignments = builder.separated(", ");
    for (column, value) in columns {
        assignments.push(format!("{column} = "));
        assignments.push_bind_unseparated(value);
        if column == "date_of_birth" {
            assignments.push_unseparated("::date");
        }
    }
    builder.push(" WHERE id = ");
    builder.push_bind(*id.as_uuid());

    Some(builder)
}

/// [`ProfileStorePort`] over a Postgres table shaped like
/// `migrations/0001_create_users.sql`.
pub struct PostgresProfileStore {
    pool: PgPool,
    executor: PostgresExecutor,
    table: String,
}

impl PostgresProfileStore {
    pub fn new(pool: PgPool, table: &str, query_timeout_secs: u64) -> AppResult<Self> {
        Ok(Self {
            pool,
            executor: PostgresExecutor::new(query_timeout_secs),
            table: validate_identifier(table)?.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl ProfileStorePort for PostgresProfileStore {
    #[instrument(skip(self), fields(column = key.column()))]
    async fn find_one(&self, key: ProfileKey<'_>) -> AppResult<Option<ProfileRecord>> {
        let sql = select_by(&self.table, key.column());

        let row = self
            .executor
            .execute_with_timeout(
                || {
                    let query = sqlx::query_as::<_, ProfileRow>(&sql);
                    let query = match key {
                        ProfileKey::Id(id) => query.bind(*id.as_uuid()),
                        ProfileKey::Email(value) | ProfileKey::Phone(value) => query.bind(value),
                    };
                    query.fetch_optional(&self.pool)
                },
                &format!("Failed to look up profile by {}", key.column()),
            )
            .await?;

        Ok(row.map(ProfileRecord::from))
    }

    #[instrument(skip(self, profile), fields(user_id = %profile.id))]
    async fn insert(&self, profile: NewProfile) -> AppResult<ProfileRecord> {
        let sql = format!(
            "INSERT INTO {} (id, first_name, last_name, email, phone) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {PROFILE_COLUMNS}",
            self.table
        );

        let row = self
            .executor
            .execute_with_timeout(
                || {
                    sqlx::query_as::<_, ProfileRow>(&sql)
                        .bind(*profile.id.as_uuid())
                        .bind(&profile.first_name)
                        .bind(&profile.last_name)
                        .bind(&profile.email)
                        .bind(profile.phone.as_deref())
                        .fetch_one(&self.pool)
                },
                &format!("Failed to create profile {}", profile.id),
            )
            .await?;

        debug!("Profile row created");
        Ok(row.into())
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: &UserId, changes: &ProfileChanges) -> AppResult<()> {
        let Some(mut builder) = update_statement(&self.table, id, changes) else {
            return Ok(());
        };
        let query = builder.build();

        let result = self
            .executor
            .execute_with_timeout(
                || query.execute(&self.pool),
                &format!("Failed to update profile {}", id),
            )
            .await?;

        if result.rows_affected() == 0 {
            warn!("Profile update matched no rows");
        }
        Ok(())
    }
}
