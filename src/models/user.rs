use crate::schema::users;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use diesel::{
    backend::Backend,
    deserialize::{self, FromSql, FromSqlRow},
    prelude::*,
    serialize::{self, Output, ToSql},
    sql_types::Integer,
    AsExpression,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub name: Option<String>,
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: i32,
    /// CSV, insertion order is the digest section order
    pub topics: String,
    pub is_subscribed: bool,
    pub good_news_only: bool,
    pub welcome_sent: bool,
    pub schedule_kind: ScheduleKind,
    /// CSV of hours 0-23, only meaningful for custom schedules
    pub schedule_hours: String,
    /// zero if never sent
    pub last_digest_sent_at: i32,
}

#[repr(i32)]
#[derive(Debug, Serialize, Deserialize, AsExpression, Clone, Copy, FromSqlRow, PartialEq)]
#[diesel(sql_type=Integer)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleKind {
    Periodic = 0,
    Custom = 1,
}

impl fmt::Display for ScheduleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleKind::Periodic => write!(f, "periodic"),
            ScheduleKind::Custom => write!(f, "custom"),
        }
    }
}

impl<DB> FromSql<Integer, DB> for ScheduleKind
where
    DB: Backend,
    i32: FromSql<Integer, DB>,
{
    fn from_sql(bytes: DB::RawValue<'_>) -> deserialize::Result<Self> {
        match i32::from_sql(bytes)? {
            0 => Ok(ScheduleKind::Periodic),
            1 => Ok(ScheduleKind::Custom),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl<DB> ToSql<Integer, DB> for ScheduleKind
where
    DB: Backend,
    i32: ToSql<Integer, DB>,
{
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, DB>) -> serialize::Result {
        match self {
            ScheduleKind::Periodic => 0.to_sql(out),
            ScheduleKind::Custom => 1.to_sql(out),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Insertable)]
#[diesel(table_name = users)]
pub struct InsertableUser {
    pub email: String,
    pub name: Option<String>,
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: i32,
    pub topics: String,
    pub is_subscribed: bool,
    pub good_news_only: bool,
    pub welcome_sent: bool,
    pub schedule_kind: ScheduleKind,
    pub schedule_hours: String,
    pub last_digest_sent_at: i32,
}

/// Preference updates. Deliberately has no `last_digest_sent_at` and no
/// `welcome_sent` column: those move only through the dedicated markers below.
#[derive(Debug, Default, Serialize, Deserialize, AsChangeset)]
#[diesel(table_name = users)]
pub struct PartialUser {
    pub name: Option<String>,
    pub topics: Option<String>,
    pub is_subscribed: Option<bool>,
    pub good_news_only: Option<bool>,
    pub schedule_kind: Option<ScheduleKind>,
    pub schedule_hours: Option<String>,
}

impl PartialUser {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.topics.is_none()
            && self.is_subscribed.is_none()
            && self.good_news_only.is_none()
            && self.schedule_kind.is_none()
            && self.schedule_hours.is_none()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub enum UserTableError {
    UserNotFound,
    EmailExists,
    PasswordHashError,
    PasswordTooShort,
    DatabaseError,
}

#[derive(Debug)]
pub enum UserQuery<'a> {
    Id(i32),
    Email(&'a str),
}

impl User {
    pub fn create(conn: &mut SqliteConnection, new_user: &NewUser) -> Result<User, UserTableError> {
        use crate::schema::users::dsl::*;

        if Self::exists(conn, &new_user.email) {
            log::warn!("User with email {} already exists", new_user.email);
            return Err(UserTableError::EmailExists);
        }

        let password_hash = match Self::hash_password(&new_user.password) {
            Ok(hash) => hash,
            Err(UserTableError::PasswordTooShort) => {
                log::warn!("Password too short");
                return Err(UserTableError::PasswordTooShort);
            }
            Err(_) => {
                log::error!("Failed to hash password");
                return Err(UserTableError::PasswordHashError);
            }
        };

        let user = InsertableUser {
            email: new_user.email.clone(),
            name: new_user.name.clone(),
            password: password_hash,
            created_at: chrono::Utc::now().timestamp() as i32,
            topics: String::new(),
            is_subscribed: false,
            good_news_only: false,
            welcome_sent: false,
            schedule_kind: ScheduleKind::Periodic,
            schedule_hours: String::new(),
            last_digest_sent_at: 0,
        };

        match diesel::insert_into(users).values(&user).get_result(conn) {
            Ok(in_db) => Ok(in_db),
            Err(err) => {
                log::error!("Failed to insert user into database: {:?}", err);
                Err(UserTableError::DatabaseError)
            }
        }
    }

    pub fn exists(conn: &mut SqliteConnection, user_email: &str) -> bool {
        use crate::schema::users::dsl::*;
        users
            .filter(email.eq(user_email))
            .first::<User>(conn)
            .is_ok()
    }

    pub fn get(conn: &mut SqliteConnection, query: UserQuery) -> Option<User> {
        use crate::schema::users::dsl::*;
        match query {
            UserQuery::Id(user_id) => users.filter(id.eq(user_id)).first::<User>(conn).ok(),
            UserQuery::Email(user_email) => {
                users.filter(email.eq(user_email)).first::<User>(conn).ok()
            }
        }
    }

    /// All subscribed users, in id order. This is the one query a scheduling
    /// run is allowed to fail on.
    pub fn get_all_subscribed(conn: &mut SqliteConnection) -> Result<Vec<User>, UserTableError> {
        use crate::schema::users::dsl::*;
        users
            .filter(is_subscribed.eq(true))
            .order(id.asc())
            .load::<User>(conn)
            .map_err(|err| {
                log::error!("Failed to get subscribed users: {:?}", err);
                UserTableError::DatabaseError
            })
    }

    pub fn update(
        conn: &mut SqliteConnection,
        user_id: i32,
        updates: &PartialUser,
    ) -> Result<User, UserTableError> {
        use crate::schema::users::dsl::*;

        log::info!("Updating user (id={:?})", user_id);

        match diesel::update(users.filter(id.eq(user_id)))
            .set(updates)
            .get_result::<User>(conn)
        {
            Ok(user) => Ok(user),
            Err(diesel::result::Error::NotFound) => Err(UserTableError::UserNotFound),
            Err(err) => {
                log::error!("Failed to update user: {:?}", err);
                Err(UserTableError::DatabaseError)
            }
        }
    }

    /// Record a successful digest dispatch. Only the digest pipeline calls
    /// this; preference updates can never touch the timestamp.
    pub fn mark_digest_sent(
        conn: &mut SqliteConnection,
        user_id: i32,
        sent_at: i32,
    ) -> Result<(), UserTableError> {
        use crate::schema::users::dsl::*;
        diesel::update(users.filter(id.eq(user_id)))
            .set(last_digest_sent_at.eq(sent_at))
            .execute(conn)
            .map(|_| ())
            .map_err(|err| {
                log::error!("Failed to record digest send time: {:?}", err);
                UserTableError::DatabaseError
            })
    }

    /// Record that the welcome email went out, so it is only ever sent once.
    pub fn mark_welcome_sent(conn: &mut SqliteConnection, user_id: i32) -> Result<(), UserTableError> {
        use crate::schema::users::dsl::*;
        diesel::update(users.filter(id.eq(user_id)))
            .set(welcome_sent.eq(true))
            .execute(conn)
            .map(|_| ())
            .map_err(|err| {
                log::error!("Failed to record welcome email: {:?}", err);
                UserTableError::DatabaseError
            })
    }

    pub fn delete(conn: &mut SqliteConnection, user_id: i32) -> Result<(), UserTableError> {
        use crate::schema::users::dsl::*;
        log::info!("Deleting user (id={})", user_id);

        let deleted_rows = diesel::delete(users.filter(id.eq(user_id)))
            .execute(conn)
            .map_err(|err| {
                log::error!("Failed to delete user: {:?}", err);
                UserTableError::DatabaseError
            })?;

        if deleted_rows == 0 {
            log::warn!("User with id {} does not exist", user_id);
            Err(UserTableError::UserNotFound)
        } else {
            Ok(())
        }
    }

    /// Topics in stored order, blanks dropped.
    pub fn topic_list(&self) -> Vec<String> {
        self.topics
            .split(',')
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .collect()
    }

    /// Custom schedule hours. Tokens that do not parse as an hour are
    /// ignored rather than treated as an error.
    pub fn custom_hours(&self) -> Vec<u32> {
        self.schedule_hours
            .split(',')
            .filter_map(|t| t.trim().parse::<u32>().ok())
            .filter(|h| *h < 24)
            .collect()
    }

    fn hash_password(password: &str) -> Result<String, UserTableError> {
        if password.is_empty() {
            return Err(UserTableError::PasswordTooShort);
        }
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| UserTableError::PasswordHashError)
    }

    pub fn check_password(user: &User, password: &str) -> Result<bool, UserTableError> {
        let argon2 = Argon2::default();
        let password_hash = PasswordHash::new(&user.password).map_err(|_| {
            log::error!("Failed to parse password hash");
            UserTableError::PasswordHashError
        })?;
        let result = argon2
            .verify_password(password.as_bytes(), &password_hash)
            .is_ok();
        Ok(result)
    }
}
