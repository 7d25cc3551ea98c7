#![allow(dead_code)]

mod assertions;
mod helpers;
mod test_app;

pub use assertions::{assert_body_finite, assert_vector_eq};
pub use helpers::*;
pub use test_app::{TestApp, TestAppBuilder};
