//! Transactions: recording, listing, editing and deleting income and expenditure.

mod bulk;
mod core;
mod endpoints;
mod query;
mod totals;

pub use bulk::{
    BulkDelete, BulkResult, BulkUpdate, bulk_delete_transactions, bulk_update_transactions,
};
pub use core::{
    Transaction, TransactionBuilder, create_transaction, create_transaction_table,
    delete_transaction, get_transaction, get_transactions_in_range, update_transaction,
};
pub use endpoints::{
    bulk_delete_endpoint, bulk_update_endpoint, create_transaction_endpoint,
    delete_transaction_endpoint, get_totals_endpoint, get_transaction_endpoint,
    list_transactions_endpoint, update_transaction_endpoint,
};
pub use query::{SortField, TransactionQuery, get_filtered_transactions};
pub use totals::{Totals, get_totals};
