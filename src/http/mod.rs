//! HTTP/1.0 protocol implementation.
//!
//! One request per connection: no keep-alive, no pipelining, no request bodies.
//!
//! # Architecture
//!
//! - **`connection`**: The per-connection handler implementing the request-response state machine
//! - **`line`**: Length-bounded line reader over the connection's byte stream
//! - **`parser`**: Splits the request line and `Name: Value` header lines
//! - **`request`**: HTTP request representation
//! - **`response`**: Status codes and the ordered response header block
//! - **`writer`**: Writes the header block and streams the body file to the client
//! - **`date`**: HTTP date formatting/parsing and the `If-Modified-Since` check
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌──────────────────┐
//!        │ AwaitRequestLine │ ← Read and split the first line
//!        └──────┬───────────┘
//!               │ method + target      (EOF / < 2 tokens → Closed)
//!               ▼
//!        ┌──────────────────┐
//!        │   ReadHeaders    │ ← Consume header lines up to the blank line
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │    Dispatch      │ ← GET/HEAD × exists/missing, or 400
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │    Sending       │ ← Header block, then body if any
//!        └──────┬───────────┘
//!               ▼
//!            Closed
//! ```

pub mod connection;
pub mod date;
pub mod line;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
