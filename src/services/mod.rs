pub mod fpl;
pub mod health;
pub mod reminder;
pub mod results;
