pub mod sprint;
pub mod ticket;
