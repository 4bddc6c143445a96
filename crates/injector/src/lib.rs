//! Injector - runtime реестр зависимостей
//!
//! Регистрация описывает "как построить значение типа T" (recipe), при
//! необходимости с именем. Разрешение находит recipe по типу и имени,
//! вызывает его и возвращает `Arc<T>`.
//!
//! Жизненные циклы:
//! - singleton: recipe выполняется не более одного раза, результат кешируется
//! - transient: recipe выполняется при каждом разрешении
//! - deferred: параметры recipe разрешаются только при первом запросе ключа
//!
//! ```
//! use std::sync::Arc;
//! use injector::Injector;
//!
//! struct Config { url: String }
//! struct Client { url: String }
//!
//! let injector = Injector::new();
//! injector.singleton(|| -> anyhow::Result<Config> {
//!     Ok(Config { url: "http://localhost".to_string() })
//! })?;
//! injector.transient(|config: Arc<Config>| -> anyhow::Result<Client> {
//!     Ok(Client { url: config.url.clone() })
//! })?;
//!
//! let client = injector.inject::<Client>()?;
//! assert_eq!(client.url, "http://localhost");
//! # Ok::<(), injector::InjectorError>(())
//! ```

pub mod config;
mod container;
mod deferred;
pub mod errors;
pub mod factory;
pub mod fields;
pub mod global;
pub mod key;
pub mod recipe;
mod registration;
mod resolution;
pub mod table;

// Реестр
pub use container::{Dependency, Injector, InjectorStats};
pub use resolution::downcast_dependency;

// Ключи и ошибки
pub use errors::{InjectorError, Result};
pub use key::{Name, RegistryKey, TypeKey, TypeToken, DEFAULT_NAME, UNKNOWN_PACKAGE};

// Recipe и auto-wiring
pub use config::InjectorConfig;
pub use factory::{FactoryFunction, Lifetime};
pub use fields::{FieldInjector, Fill};
pub use recipe::{parameter_tokens, CallOutput, Callable, FromInjector, InjectArgs, Recipe};
