pub mod dispatch;
pub mod parser;
pub mod shell;
pub mod signals;
pub mod utils;
