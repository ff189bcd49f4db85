//! Database models split into domain-specific modules.

pub mod gym_class;
pub mod habit;
pub mod habit_log;
pub mod reservation;
pub mod time_slot;
pub mod user;

pub use gym_class::*;
pub use habit::*;
pub use habit_log::*;
pub use reservation::*;
pub use time_slot::*;
pub use user::*;
