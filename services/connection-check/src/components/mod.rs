pub mod test_connection;

pub use self::test_connection::{DisplayMessage, TestConnection};
