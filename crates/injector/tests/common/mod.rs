//! Common Test Utilities
//!
//! Shared functionality для integration tests:
//! - инициализация tracing (RUST_LOG управляет уровнем)
//! - счетчики вызовов recipe
//! - тестовые сервисы

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

/// Установить subscriber один раз на процесс тестов
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("injector=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Счетчик вызовов, который можно передать в recipe
#[derive(Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hit(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug)]
pub struct Database {
    pub url: String,
    pub generation: usize,
}

#[derive(Debug)]
pub struct UserRepository {
    pub db: Arc<Database>,
}

pub fn database_config(url: &str) -> DatabaseConfig {
    DatabaseConfig {
        url: url.to_string(),
    }
}
