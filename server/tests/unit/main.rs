//! Unit tests

mod test_gateway;
mod test_github;
mod test_notifier;
