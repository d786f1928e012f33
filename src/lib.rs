#[macro_use]
extern crate serde_derive;
#[macro_use(Message, MessageResponse)]
extern crate actix_derive;
extern crate colored;

pub mod driver;
pub mod gatherer;
pub mod integration_test;
pub mod synod;

use synod::{ParticipantId, Value};

#[derive(Debug)]
pub enum Error {
    Actix(actix::MailboxError),
    Config(config::ConfigError),

    // run parameter errors
    InvalidParticipantCount(usize),
    InvalidFaultCount { participants: usize, faulty: usize },
    InvalidCrashProbability(f64),

    // gatherer errors
    /// Two participants delivered different values. This is never expected and means
    /// the protocol implementation is broken.
    AgreementViolation { from: ParticipantId, expected: Value, delivered: Value },
    /// The gatherer went away without reporting an outcome.
    GathererDropped,
}

impl std::error::Error for Error {}

impl std::convert::From<actix::MailboxError> for Error {
    fn from(error: actix::MailboxError) -> Self {
        Error::Actix(error)
    }
}

impl std::convert::From<config::ConfigError> for Error {
    fn from(error: config::ConfigError) -> Self {
        Error::Config(error)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
