//! Department ticket queue.
//!
//! Tickets are numbered per department and per calendar day in the service
//! offset. Only `waiting` tickets take part in numbering, so a reset that
//! drops today's waiting tickets restarts the queue at 1.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/queue/generate` | Issue a ticket with its wait estimate |
//! | GET | `/queue/estimate` | Wait estimate without issuing |
//! | GET | `/queue/status/{department_id}` | All tickets of a department |
//! | POST | `/queue/complete` | `waiting -> completed` |
//! | POST | `/queue/update-status` | `waiting -> successful/failed` |
//! | POST | `/queue/reset/{department_id}` | Drop today's waiting tickets |
//! | GET | `/queue/history/{department_id}` | Finished tickets, newest first |
//! | GET | `/queue/number/{id}` | One ticket |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod stores;

pub use services::QueueService;
