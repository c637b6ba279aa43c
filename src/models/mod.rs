pub mod fees;
pub mod pool;
pub mod quote;
pub mod tick;
pub mod token;
