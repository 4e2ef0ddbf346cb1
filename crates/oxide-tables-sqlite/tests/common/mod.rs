#![allow(dead_code)]

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use oxide_tables_core::dialect::Dialect;
use oxide_tables_core::schema::{
    boolean, date, datetime, integer, serial, text, time, timestamp_with_time_zone, uuid,
    varchar, Tables,
};
use oxide_tables_derive::Entity;
use oxide_tables_sqlite::SqliteExecutor;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Entity)]
pub struct Role {
    pub id: i32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Entity)]
pub struct User {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub alias: Option<String>,
    pub role_id: i32,
}

#[derive(Debug, Clone, PartialEq, Entity)]
pub struct Event {
    pub id: Option<i32>,
    pub reference: Uuid,
    pub title: String,
    pub notes: Option<String>,
    pub public: bool,
    pub day: NaiveDate,
    pub starts_at: Option<NaiveTime>,
    pub created: NaiveDateTime,
    pub published: Option<DateTime<FixedOffset>>,
}

/// Routes `tracing` output to the test harness; safe to call from every
/// test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn tables() -> Tables {
    Tables::builder(Dialect::Sqlite)
        .table::<Role>("roles", |t| {
            t.column(integer(Role::ID).primary_key())
                .column(varchar(Role::LABEL))
        })
        .table::<User>("users", |t| {
            t.column(varchar(User::ID).primary_key())
                .column(varchar(User::FIRSTNAME).name("fname"))
                .column(varchar(User::LASTNAME).name("lname"))
                .column(varchar(User::ALIAS))
                .column(integer(User::ROLE_ID).foreign_key::<Role>())
        })
        .table::<Event>("events", |t| {
            t.column(serial(Event::ID).primary_key())
                .column(uuid(Event::REFERENCE))
                .column(varchar(Event::TITLE))
                .column(text(Event::NOTES))
                .column(boolean(Event::PUBLIC))
                .column(date(Event::DAY))
                .column(time(Event::STARTS_AT))
                .column(datetime(Event::CREATED))
                .column(timestamp_with_time_zone(Event::PUBLISHED))
        })
        .build()
        .unwrap_or_else(|e| panic!("fixture tables are valid: {e}"))
}

pub fn admin() -> Role {
    Role {
        id: 1,
        label: String::from("admin"),
    }
}

pub fn guest() -> Role {
    Role {
        id: 2,
        label: String::from("guest"),
    }
}

pub fn jdoe() -> User {
    User {
        id: String::from("jdoe"),
        firstname: String::from("John"),
        lastname: String::from("Doe"),
        alias: None,
        role_id: 1,
    }
}

pub fn bboss() -> User {
    User {
        id: String::from("bboss"),
        firstname: String::from("Big"),
        lastname: String::from("Boss"),
        alias: Some(String::from("TheBoss")),
        role_id: 2,
    }
}

pub fn event(reference: u128, title: &str) -> Event {
    Event {
        id: None,
        reference: Uuid::from_u128(reference),
        title: String::from(title),
        notes: None,
        public: true,
        day: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
        starts_at: NaiveTime::from_hms_opt(18, 30, 0),
        created: NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_micro_opt(8, 0, 5, 123_456)
            .unwrap(),
        published: Some(
            DateTime::parse_from_rfc3339("2024-01-16T09:00:00+02:00").unwrap(),
        ),
    }
}

/// An in-memory database with every table created and the roles and users
/// inserted.
pub async fn seeded() -> (Tables, SqliteExecutor) {
    init_tracing();
    let tables = tables();
    let executor = SqliteExecutor::in_memory().await.unwrap();
    tables.create_all_tables().execute(&executor).await.unwrap();
    tables
        .insert(&[admin(), guest()])
        .execute(&executor)
        .await
        .unwrap();
    tables
        .insert(&[jdoe(), bboss()])
        .execute(&executor)
        .await
        .unwrap();
    (tables, executor)
}
