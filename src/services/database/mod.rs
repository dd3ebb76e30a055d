// Database service module
// SQLite connection and schema for the client's durable storage

mod connection;
mod schema;

pub use connection::Database;
