//! Invoicing System - Table Mapping Example
//!
//! This example maps a small multi-tenant invoicing schema and prints the SQL
//! compiled for every dialect:
//! - Companies own clients and invoices
//! - Invoices are keyed by (company, number)
//! - Invoice lines reference their invoice through a composite foreign key
//!
//! Run with: cargo run --example invoicing

use chrono::NaiveDate;
use oxide_tables_core::dialect::Dialect;
use oxide_tables_core::error::Result;
use oxide_tables_core::generator::CompiledStatement;
use oxide_tables_core::schema::{date, integer, serial, varchar, Tables};
use oxide_tables_derive::Entity;

// =============================================================================
// RECORD TYPES
// =============================================================================

/// Company - the tenant in a multi-tenant invoicing system.
#[allow(dead_code)]
#[derive(Debug, Clone, Entity)]
pub struct Company {
    pub id: i32,
    pub name: String,
    pub tax_id: Option<String>,
}

/// Client - customers who receive invoices.
#[allow(dead_code)]
#[derive(Debug, Clone, Entity)]
pub struct Client {
    pub id: Option<i32>,
    pub company_id: i32,
    pub name: String,
    pub email: Option<String>,
}

/// Invoice - the main billing document.
#[allow(dead_code)]
#[derive(Debug, Clone, Entity)]
pub struct Invoice {
    pub company_id: i32,
    pub number: String,
    pub client_id: i32,
    pub status: String,
    pub issued: NaiveDate,
    pub due: Option<NaiveDate>,
}

/// InvoiceLine - one billed item.
#[allow(dead_code)]
#[derive(Debug, Clone, Entity)]
pub struct InvoiceLine {
    pub id: Option<i32>,
    pub company_id: i32,
    pub invoice_number: String,
    pub description: String,
    pub amount_cents: i32,
}

// =============================================================================
// MAPPING
// =============================================================================

fn invoicing(dialect: Dialect) -> Result<Tables> {
    Tables::builder(dialect)
        .table::<Company>("companies", |t| {
            t.column(integer(Company::ID).primary_key())
                .column(varchar(Company::NAME))
                .column(varchar(Company::TAX_ID))
        })
        .table::<Client>("clients", |t| {
            t.column(serial(Client::ID).primary_key())
                .column(integer(Client::COMPANY_ID).foreign_key::<Company>())
                .column(varchar(Client::NAME))
                .column(varchar(Client::EMAIL))
        })
        .table::<Invoice>("invoices", |t| {
            t.column(integer(Invoice::COMPANY_ID).foreign_key::<Company>())
                .column(varchar(Invoice::NUMBER))
                .column(integer(Invoice::CLIENT_ID).foreign_key::<Client>())
                .column(varchar(Invoice::STATUS))
                .column(date(Invoice::ISSUED).name("issue_date"))
                .column(date(Invoice::DUE).name("due_date"))
                .primary_key(&[&Invoice::COMPANY_ID, &Invoice::NUMBER])
        })
        .table::<InvoiceLine>("invoice_lines", |t| {
            t.column(serial(InvoiceLine::ID).primary_key())
                .column(integer(InvoiceLine::COMPANY_ID))
                .column(varchar(InvoiceLine::INVOICE_NUMBER))
                .column(varchar(InvoiceLine::DESCRIPTION))
                .column(integer(InvoiceLine::AMOUNT_CENTS))
                .foreign_key::<Invoice>(
                    &[&InvoiceLine::COMPANY_ID, &InvoiceLine::INVOICE_NUMBER],
                    &[&Invoice::COMPANY_ID, &Invoice::NUMBER],
                )
        })
        .build()
}

// =============================================================================
// QUERIES
// =============================================================================

fn print_sql(title: &str, statement: &CompiledStatement) {
    println!("-- {title}");
    println!("{};", statement.sql);
    if !statement.params.is_empty() {
        println!("-- params: {:?}", statement.params);
    }
    println!();
}

fn queries(tables: &Tables) -> Result<()> {
    for statement in tables.create_all_tables().compile()? {
        print_sql("Schema", &statement);
    }

    let lines = [
        InvoiceLine {
            id: None,
            company_id: 1,
            invoice_number: String::from("2024-0001"),
            description: String::from("Consulting"),
            amount_cents: 120_000,
        },
        InvoiceLine {
            id: None,
            company_id: 1,
            invoice_number: String::from("2024-0001"),
            description: String::from("Travel"),
            amount_cents: 8_450,
        },
    ];
    for statement in tables.insert(&lines).compile()? {
        print_sql("Bill two lines", &statement);
    }

    let january = tables
        .select_all::<Invoice>()
        .where_clause(Invoice::COMPANY_ID.eq(1))
        .and(Invoice::ISSUED.ge(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()))
        .and(Invoice::ISSUED.le(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap_or_default()))
        .compile()?;
    print_sql("Invoices for January 2024", &january);

    let without_due_date = tables
        .select::<Invoice>()
        .map(|row| Ok((row.get(Invoice::NUMBER)?, row.get(Client::NAME)?)))
        .inner_join::<Client>()
        .on(Invoice::CLIENT_ID)
        .where_clause(Invoice::DUE.eq(None))
        .and(Client::EMAIL.is_not_null())
        .compile()?;
    print_sql("Invoices without due date, with client", &without_due_date);

    let mark_paid = tables
        .update::<Invoice>()
        .set(Invoice::STATUS, String::from("paid"))
        .where_clause(Invoice::COMPANY_ID.eq(1))
        .and(Invoice::NUMBER.eq(String::from("2024-0001")))
        .compile()?;
    print_sql("Mark invoice as paid", &mark_paid);

    let drop_drafts = tables
        .delete_from::<InvoiceLine>()
        .inner_join::<Invoice>()
        .on(InvoiceLine::COMPANY_ID)
        .where_clause(Invoice::STATUS.eq(String::from("draft")))
        .compile()?;
    print_sql("Drop lines of draft invoices", &drop_drafts);

    Ok(())
}

fn main() -> Result<()> {
    for dialect in [Dialect::H2, Dialect::Postgresql, Dialect::Sqlite] {
        println!("-- =============================================================================");
        println!("-- INVOICING SYSTEM - {dialect}");
        println!("-- =============================================================================");
        println!();
        queries(&invoicing(dialect)?)?;
    }
    Ok(())
}
