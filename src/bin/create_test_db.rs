use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, UtcOffset};

use spendlog_rs::{
    PasswordHash, ValidatedPassword,
    category::{CategoryName, create_category},
    direction::Direction,
    initialize_db,
    money::Amount,
    set_password_hash,
    timestamp::{DateRange, Timestamp},
    transaction::{Transaction, create_transaction},
};

/// A utility for creating a test database for the spendlog server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const CATEGORIES: [(&str, Direction); 9] = [
    ("Salary", Direction::Income),
    ("Rent", Direction::Expenditure),
    ("Food", Direction::Expenditure),
    ("Transport", Direction::Expenditure),
    ("Utilities", Direction::Expenditure),
    ("Entertainment", Direction::Expenditure),
    ("Groceries", Direction::Expenditure),
    ("Stocks", Direction::Expenditure),
    ("Dividends", Direction::Income),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Setting the password to \"test\"...");
    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    set_password_hash(&password_hash, &conn)?;

    println!("Creating categories...");
    for (name, default_direction) in CATEGORIES {
        create_category(CategoryName::new(name)?, default_direction, &conn)?;
    }

    println!("Creating transactions for this month...");
    let month = DateRange::current_month(Timestamp::now(), UtcOffset::UTC)?;
    let count = create_month_of_transactions(month, &conn)?;

    println!("Created {count} transactions. Success!");

    Ok(())
}

/// Fill `month` with a regular pattern of income and spending, including one
/// unusually large expense.
fn create_month_of_transactions(
    month: DateRange,
    conn: &Connection,
) -> Result<usize, Box<dyn Error>> {
    let first_day = month.start.as_offset_date_time();
    let mut count = 0;

    for day in 0..28_i64 {
        let date = first_day + Duration::days(day) + Duration::hours(12);
        for (category_name, cents, note) in transactions_for_day(day) {
            let builder = Transaction::build(Amount::from_cents(cents), category_name)
                .note(note)
                .timestamp(Timestamp::new(date)?);
            create_transaction(builder, conn)?;
            count += 1;
        }
    }

    Ok(count)
}

fn transactions_for_day(day: i64) -> Vec<(&'static str, i64, &'static str)> {
    let mut transactions = Vec::new();

    match day {
        0 => {
            transactions.push(("Salary", 500_000, "Monthly pay"));
            transactions.push(("Rent", 180_000, "Rent"));
        }
        4 => transactions.push(("Stocks", 50_000, "Index fund")),
        9 => transactions.push(("Utilities", 18_000, "Power and internet")),
        14 => transactions.push(("Entertainment", 6_000, "Concert")),
        19 => transactions.push(("Entertainment", 45_000, "New headphones")),
        24 => transactions.push(("Dividends", 12_000, "Quarterly dividend")),
        _ => {}
    }

    if day % 2 == 0 {
        transactions.push(("Food", 1_250 + (day % 5) * 300, "Lunch"));
    }

    if day % 3 == 0 {
        transactions.push(("Groceries", 4_500 + (day * 700) % 6_000, "Supermarket"));
    }

    if day % 7 == 0 {
        transactions.push(("Transport", 3_000, "Bus pass top up"));
    }

    transactions
}
