//! Golden SQL output of every statement kind, per dialect.

mod common;

use chrono::{NaiveDate, NaiveTime};
use common::{bboss, jdoe, tables, text, Role, User};
use oxide_tables_core::dialect::Dialect;
use oxide_tables_core::error::Error;
use oxide_tables_core::schema::{date, integer, time, uuid, varchar, Tables};
use oxide_tables_core::value::{ColumnValue, Keyable, SqlValue, StringValue, ValueError};
use oxide_tables_derive::Entity;
use uuid::Uuid;

const USERS_COLUMNS: &str = "users.id, users.fname, users.lname, users.alias, users.role_id";

// =============================================================================
// CREATE TABLE
// =============================================================================

#[test]
fn test_create_table_columns_then_keys() {
    let tables = tables(Dialect::Postgresql);
    let compiled = tables.create_table::<User>().compile().unwrap();
    assert_eq!(
        compiled.sql,
        "CREATE TABLE IF NOT EXISTS users (id VARCHAR NOT NULL, fname VARCHAR NOT NULL, \
         lname VARCHAR NOT NULL, alias VARCHAR, role_id INTEGER NOT NULL, \
         CONSTRAINT PK_users PRIMARY KEY (id), \
         CONSTRAINT FK_users_roles FOREIGN KEY (role_id) REFERENCES roles (id))"
    );
    assert!(compiled.params.is_empty());
}

#[test]
fn test_create_table_is_deterministic() {
    for dialect in [Dialect::H2, Dialect::Postgresql, Dialect::Sqlite] {
        let tables = tables(dialect);
        let first = tables.create_all_tables().compile().unwrap();
        let second = tables.create_all_tables().compile().unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_create_table_of_unmapped_type() {
    let tables = tables(Dialect::H2);
    let result = tables.create_table::<String>().compile();
    assert!(matches!(result, Err(Error::Validation(_))));
}

// =============================================================================
// INSERT
// =============================================================================

#[test]
fn test_insert_several_rows() {
    let tables = tables(Dialect::Sqlite);
    let compiled = tables.insert(&[jdoe(), bboss()]).compile().unwrap();
    assert_eq!(compiled.len(), 1);
    assert_eq!(
        compiled[0].sql,
        "INSERT INTO users (id, fname, lname, alias, role_id) \
         VALUES (?, ?, ?, ?, ?), (?, ?, ?, ?, ?)"
    );
    assert_eq!(
        compiled[0].params,
        vec![
            text("jdoe"),
            text("John"),
            text("Doe"),
            SqlValue::Null,
            SqlValue::Int(1),
            text("bboss"),
            text("Big"),
            text("Boss"),
            text("TheBoss"),
            SqlValue::Int(2),
        ]
    );
}

#[test]
fn test_insert_postgres_numbers_placeholders() {
    let tables = tables(Dialect::Postgresql);
    let compiled = tables
        .insert_one(&Role {
            id: 1,
            label: String::from("admin"),
        })
        .compile()
        .unwrap();
    assert_eq!(compiled[0].sql, "INSERT INTO roles (id, label) VALUES ($1, $2)");
}

/// A code that is absent when empty; maps to a NOT NULL column.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Code(String);

impl ColumnValue for Code {
    type Key = Keyable;
    type Inner = Self;
    const NULLABLE: bool = false;

    fn to_sql_value(&self) -> SqlValue {
        if self.0.is_empty() {
            SqlValue::Null
        } else {
            SqlValue::Text(self.0.clone())
        }
    }

    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        String::from_sql_value(value).map(Code)
    }
}

impl StringValue for Code {}

#[derive(Debug, Clone, Entity)]
struct Product {
    code: Code,
}

#[test]
fn test_insert_rejects_missing_required_value() {
    let tables = Tables::builder(Dialect::H2)
        .table::<Product>("products", |t| t.column(varchar(Product::CODE).primary_key()))
        .build()
        .unwrap();
    let products = [
        Product {
            code: Code(String::from("A-1")),
        },
        Product {
            code: Code(String::new()),
        },
    ];
    let result = tables.insert(&products).compile();
    match result {
        Err(Error::Validation(message)) => {
            assert!(message.contains("row 1"));
            assert!(message.contains("products.code"));
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
}

// =============================================================================
// SELECT
// =============================================================================

#[test]
fn test_select_alias_is_null_per_dialect() {
    for dialect in [Dialect::H2, Dialect::Postgresql, Dialect::Sqlite] {
        let compiled = tables(dialect)
            .select_all::<User>()
            .where_clause(User::ALIAS.eq(None))
            .compile()
            .unwrap();
        assert_eq!(
            compiled.sql,
            format!("SELECT {USERS_COLUMNS} FROM users WHERE users.alias IS NULL")
        );
        assert!(compiled.params.is_empty());
    }
}

#[test]
fn test_select_alias_equals_value() {
    let compiled = tables(Dialect::Postgresql)
        .select_all::<User>()
        .where_clause(User::ALIAS.eq(Some(String::from("TheBoss"))))
        .compile()
        .unwrap();
    assert_eq!(
        compiled.sql,
        format!("SELECT {USERS_COLUMNS} FROM users WHERE users.alias = $1")
    );
    assert_eq!(compiled.params, vec![text("TheBoss")]);
}

#[test]
fn test_select_predicate_chain_keeps_declaration_order() {
    let compiled = tables(Dialect::Postgresql)
        .select::<User>()
        .map(|row| row.get(User::ID))
        .where_clause(User::FIRSTNAME.eq(String::from("John")))
        .or(User::LASTNAME.contains("os"))
        .and(User::ROLE_ID.ge(2))
        .compile()
        .unwrap();
    assert_eq!(
        compiled.sql,
        format!(
            "SELECT {USERS_COLUMNS} FROM users WHERE \
             (users.fname = $1 OR users.lname LIKE $2) AND users.role_id >= $3"
        )
    );
    assert_eq!(
        compiled.params,
        vec![text("John"), text("%os%"), SqlValue::Int(2)]
    );
}

#[test]
fn test_select_with_joins_in_declaration_order() {
    let compiled = tables(Dialect::H2)
        .select::<User>()
        .map(|row| Ok((row.get(User::ID)?, row.get_optional(Role::LABEL)?)))
        .left_join::<Role>()
        .on(User::ROLE_ID)
        .where_clause(User::ALIAS.not_eq(None))
        .compile()
        .unwrap();
    assert_eq!(
        compiled.sql,
        format!(
            "SELECT {USERS_COLUMNS}, roles.id, roles.label FROM users \
             LEFT OUTER JOIN roles ON users.role_id = roles.id \
             WHERE users.alias IS NOT NULL"
        )
    );
}

#[test]
fn test_join_without_foreign_key_is_rejected() {
    let result = tables(Dialect::Postgresql)
        .select_all::<Role>()
        .inner_join::<User>()
        .on(User::ID)
        .compile();
    assert!(matches!(result, Err(Error::Mapping(_))));
}

#[test]
fn test_join_of_unmapped_type_is_rejected() {
    let result = tables(Dialect::Postgresql)
        .select_all::<User>()
        .inner_join::<String>()
        .on(User::ROLE_ID)
        .compile();
    assert!(matches!(result, Err(Error::Validation(_))));
}

// =============================================================================
// UPDATE / DELETE
// =============================================================================

#[test]
fn test_update_lastname_where_firstname() {
    let compiled = tables(Dialect::Postgresql)
        .update::<User>()
        .set(User::LASTNAME, String::from("X"))
        .where_clause(User::FIRSTNAME.eq(String::from("John")))
        .compile()
        .unwrap();
    assert_eq!(
        compiled.sql,
        "UPDATE users SET lname = $1 WHERE users.fname = $2"
    );
    assert_eq!(compiled.params, vec![text("X"), text("John")]);
}

#[test]
fn test_update_nullable_column_to_null() {
    let compiled = tables(Dialect::Sqlite)
        .update::<User>()
        .set(User::ALIAS, None)
        .set(User::ROLE_ID, 3)
        .compile()
        .unwrap();
    assert_eq!(compiled.sql, "UPDATE users SET alias = ?, role_id = ?");
    assert_eq!(compiled.params, vec![SqlValue::Null, SqlValue::Int(3)]);
}

#[test]
fn test_delete_through_join() {
    let compiled = tables(Dialect::H2)
        .delete_from::<User>()
        .inner_join::<Role>()
        .on(User::ROLE_ID)
        .where_clause(Role::LABEL.eq(String::from("guest")))
        .or(Role::LABEL.eq(String::from("banned")))
        .compile()
        .unwrap();
    assert_eq!(
        compiled.sql,
        "DELETE FROM users WHERE EXISTS (SELECT 1 FROM roles \
         WHERE users.role_id = roles.id AND (roles.label = ? OR roles.label = ?))"
    );
    assert_eq!(compiled.params, vec![text("guest"), text("banned")]);
}

#[test]
fn test_delete_join_without_predicate() {
    let compiled = tables(Dialect::Postgresql)
        .delete_from::<Role>()
        .inner_join::<User>()
        .on(User::ROLE_ID)
        .compile()
        .unwrap();
    assert_eq!(
        compiled.sql,
        "DELETE FROM roles WHERE EXISTS (SELECT 1 FROM users WHERE roles.id = users.role_id)"
    );
}

#[test]
fn test_delete_all_is_explicit() {
    let compiled = tables(Dialect::Sqlite)
        .delete_all_from::<User>()
        .compile()
        .unwrap();
    assert_eq!(compiled.sql, "DELETE FROM users");
}

// =============================================================================
// Composite keys
// =============================================================================

#[derive(Debug, Clone, Entity)]
struct Invoice {
    company_id: i32,
    number: String,
    status: String,
}

#[derive(Debug, Clone, Entity)]
struct InvoiceLine {
    id: i32,
    company_id: i32,
    invoice_number: String,
    description: String,
}

/// `invoices` keyed by `(company_id, number)`, and `invoice_lines` referencing
/// them through both columns.
fn invoicing(dialect: Dialect) -> Tables {
    Tables::builder(dialect)
        .table::<Invoice>("invoices", |t| {
            t.column(integer(Invoice::COMPANY_ID))
                .column(varchar(Invoice::NUMBER))
                .column(varchar(Invoice::STATUS))
                .primary_key(&[&Invoice::COMPANY_ID, &Invoice::NUMBER])
        })
        .table::<InvoiceLine>("invoice_lines", |t| {
            t.column(integer(InvoiceLine::ID).primary_key())
                .column(integer(InvoiceLine::COMPANY_ID))
                .column(varchar(InvoiceLine::INVOICE_NUMBER))
                .column(varchar(InvoiceLine::DESCRIPTION))
                .foreign_key::<Invoice>(
                    &[&InvoiceLine::COMPANY_ID, &InvoiceLine::INVOICE_NUMBER],
                    &[&Invoice::COMPANY_ID, &Invoice::NUMBER],
                )
        })
        .build()
        .unwrap()
}

const LINES_COLUMNS: &str = "invoice_lines.id, invoice_lines.company_id, \
                             invoice_lines.invoice_number, invoice_lines.description";
const INVOICES_COLUMNS: &str = "invoices.company_id, invoices.number, invoices.status";

#[test]
fn test_create_table_with_composite_keys() {
    let tables = invoicing(Dialect::Postgresql);
    let invoices = tables.create_table::<Invoice>().compile().unwrap();
    assert_eq!(
        invoices.sql,
        "CREATE TABLE IF NOT EXISTS invoices (company_id INTEGER NOT NULL, \
         number VARCHAR NOT NULL, status VARCHAR NOT NULL, \
         CONSTRAINT PK_invoices PRIMARY KEY (company_id, number))"
    );

    let lines = tables.create_table::<InvoiceLine>().compile().unwrap();
    assert_eq!(
        lines.sql,
        "CREATE TABLE IF NOT EXISTS invoice_lines (id INTEGER NOT NULL, \
         company_id INTEGER NOT NULL, invoice_number VARCHAR NOT NULL, \
         description VARCHAR NOT NULL, \
         CONSTRAINT PK_invoice_lines PRIMARY KEY (id), \
         CONSTRAINT FK_invoice_lines_invoices FOREIGN KEY (company_id, invoice_number) \
         REFERENCES invoices (company_id, number))"
    );
}

#[test]
fn test_join_on_composite_foreign_key() {
    let compiled = invoicing(Dialect::Postgresql)
        .select::<InvoiceLine>()
        .map(|row| row.get(InvoiceLine::DESCRIPTION))
        .inner_join::<Invoice>()
        .on(InvoiceLine::COMPANY_ID)
        .where_clause(Invoice::STATUS.eq(String::from("draft")))
        .compile()
        .unwrap();
    assert_eq!(
        compiled.sql,
        format!(
            "SELECT {LINES_COLUMNS}, {INVOICES_COLUMNS} FROM invoice_lines \
             INNER JOIN invoices ON invoice_lines.company_id = invoices.company_id \
             AND invoice_lines.invoice_number = invoices.number \
             WHERE invoices.status = $1"
        )
    );
    assert_eq!(compiled.params, vec![text("draft")]);
}

#[test]
fn test_reverse_join_on_composite_foreign_key() {
    let compiled = invoicing(Dialect::H2)
        .select::<Invoice>()
        .map(|row| row.get(Invoice::NUMBER))
        .left_join::<InvoiceLine>()
        .on(InvoiceLine::INVOICE_NUMBER)
        .compile()
        .unwrap();
    assert_eq!(
        compiled.sql,
        format!(
            "SELECT {INVOICES_COLUMNS}, {LINES_COLUMNS} FROM invoices \
             LEFT OUTER JOIN invoice_lines ON invoices.company_id = invoice_lines.company_id \
             AND invoices.number = invoice_lines.invoice_number"
        )
    );
}

#[test]
fn test_delete_through_composite_foreign_key() {
    let compiled = invoicing(Dialect::Sqlite)
        .delete_from::<InvoiceLine>()
        .inner_join::<Invoice>()
        .on(InvoiceLine::INVOICE_NUMBER)
        .where_clause(Invoice::STATUS.eq(String::from("draft")))
        .compile()
        .unwrap();
    assert_eq!(
        compiled.sql,
        "DELETE FROM invoice_lines WHERE EXISTS (SELECT 1 FROM invoices \
         WHERE invoice_lines.company_id = invoices.company_id \
         AND invoice_lines.invoice_number = invoices.number AND invoices.status = ?)"
    );
    assert_eq!(compiled.params, vec![text("draft")]);
}

// =============================================================================
// Dialect specifics
// =============================================================================

#[derive(Debug, Clone, Entity)]
struct Purchase {
    id: i32,
    user: String,
}

fn purchases(dialect: Dialect) -> Tables {
    Tables::builder(dialect)
        .table::<Purchase>("order", |t| {
            t.column(integer(Purchase::ID).primary_key())
                .column(varchar(Purchase::USER))
        })
        .build()
        .unwrap()
}

#[test]
fn test_reserved_identifiers_are_quoted_per_dialect() {
    let postgres = purchases(Dialect::Postgresql)
        .select_all::<Purchase>()
        .where_clause(Purchase::USER.eq(String::from("jdoe")))
        .compile()
        .unwrap();
    assert_eq!(
        postgres.sql,
        "SELECT \"order\".id, \"order\".\"user\" FROM \"order\" WHERE \"order\".\"user\" = $1"
    );

    let sqlite = purchases(Dialect::Sqlite)
        .create_table::<Purchase>()
        .compile()
        .unwrap();
    assert_eq!(
        sqlite.sql,
        "CREATE TABLE IF NOT EXISTS \"order\" (id INTEGER NOT NULL, user VARCHAR NOT NULL, \
         CONSTRAINT PK_order PRIMARY KEY (id))"
    );
}

#[derive(Debug, Clone, Entity)]
struct Meeting {
    id: Uuid,
    day: NaiveDate,
    at: Option<NaiveTime>,
}

fn meetings(dialect: Dialect) -> Tables {
    Tables::builder(dialect)
        .table::<Meeting>("meetings", |t| {
            t.column(uuid(Meeting::ID).primary_key())
                .column(date(Meeting::DAY))
                .column(time(Meeting::AT))
        })
        .build()
        .unwrap()
}

#[test]
fn test_temporal_parameters_per_dialect() {
    let meeting = Meeting {
        id: Uuid::from_u128(1),
        day: NaiveDate::from_ymd_opt(2020, 2, 29).unwrap(),
        at: NaiveTime::from_hms_opt(9, 30, 0),
    };

    let sqlite = meetings(Dialect::Sqlite).insert_one(&meeting).compile().unwrap();
    assert_eq!(
        sqlite[0].params,
        vec![
            text("00000000-0000-0000-0000-000000000001"),
            text("2020-02-29"),
            text("09:30:00"),
        ]
    );

    let postgres = meetings(Dialect::Postgresql)
        .insert_one(&meeting)
        .compile()
        .unwrap();
    assert_eq!(
        postgres[0].params,
        vec![
            SqlValue::Uuid(meeting.id),
            SqlValue::Date(meeting.day),
            SqlValue::Time(NaiveTime::from_hms_opt(9, 30, 0).unwrap()),
        ]
    );

    let create = meetings(Dialect::Postgresql)
        .create_table::<Meeting>()
        .compile()
        .unwrap();
    assert_eq!(
        create.sql,
        "CREATE TABLE IF NOT EXISTS meetings (id UUID NOT NULL, day DATE NOT NULL, at TIME, \
         CONSTRAINT PK_meetings PRIMARY KEY (id))"
    );
}
