pub mod customers;

pub use customers::{read_customers, write_predictions, CustomerRecord};
