//! Orchestrator and decision-policy tests.
//!
//! Shared imports live here so individual test files can `use super::*`.

mod item_task;

pub(crate) use crate::downloader::test_helpers::{create_test_downloader, photo, video};
pub(crate) use crate::error::Error;
pub(crate) use crate::types::{Event, ResultStatus};
