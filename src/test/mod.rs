//! Statistical hypothesis tests.


pub use welch::{test_welch, WelchResult};
