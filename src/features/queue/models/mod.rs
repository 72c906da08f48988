mod ticket;

pub use ticket::{
    display_code, display_prefix, NewTicket, Ticket, TicketOutcome, TicketSource, TicketStatus,
};
