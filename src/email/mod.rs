pub mod gateway;

pub use gateway::{EmailGateway, SmtpGateway, SmtpSettings};
