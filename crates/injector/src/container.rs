//! Injector - реестр зависимостей
//!
//! АРХИТЕКТУРА:
//! - Две таблицы `TypeKey -> Name -> V`: основная (factories) и deferred
//! - Clone-able handle поверх `Arc`, клоны видят одни и те же регистрации
//! - Запись и чтение разнесены по модулям `registration`, `resolution`, `deferred`

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::info;

use crate::config::InjectorConfig;
use crate::deferred::DeferredEntry;
use crate::factory::FactoryFunction;
use crate::key::{Name, RegistryKey, TypeToken};
use crate::table::Table;

/// Type-erased значение, произведенное factory
pub type Dependency = Arc<dyn Any + Send + Sync>;

/// Реестр зависимостей
#[derive(Clone)]
pub struct Injector {
    pub(crate) inner: Arc<InjectorInner>,
}

pub(crate) struct InjectorInner {
    pub(crate) config: InjectorConfig,
    pub(crate) factories: Table<FactoryFunction>,
    pub(crate) deferred: Table<Arc<DeferredEntry>>,
    resolutions: AtomicU64,
    failed_resolutions: AtomicU64,
}

impl Injector {
    /// Создать изолированный реестр с настройками по умолчанию
    pub fn new() -> Self {
        Self::with_config(InjectorConfig::default())
    }

    pub fn with_config(config: InjectorConfig) -> Self {
        info!("Creating injector '{}'", config.name);
        Self {
            inner: Arc::new(InjectorInner {
                config,
                factories: Table::new(),
                deferred: Table::new(),
                resolutions: AtomicU64::new(0),
                failed_resolutions: AtomicU64::new(0),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    pub fn config(&self) -> &InjectorConfig {
        &self.inner.config
    }

    /// Есть ли активная регистрация (deferred таблица не учитывается)
    pub fn contains(&self, token: TypeToken, name: impl Into<Name>) -> bool {
        self.inner.factories.contains(&token.key(), &name.into())
    }

    pub fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        self.contains(TypeToken::of::<T>(), Name::default())
    }

    /// Ожидает ли регистрация активации
    pub fn is_deferred(&self, token: TypeToken, name: impl Into<Name>) -> bool {
        self.inner.deferred.contains(&token.key(), &name.into())
    }

    pub fn registered_keys(&self) -> Vec<RegistryKey> {
        self.inner.factories.keys()
    }

    pub fn deferred_keys(&self) -> Vec<RegistryKey> {
        self.inner.deferred.keys()
    }

    /// Удалить все регистрации (полезно для тестов)
    pub fn clear(&self) {
        self.inner.factories.clear();
        self.inner.deferred.clear();
        info!("Cleared injector '{}'", self.name());
    }

    pub fn stats(&self) -> InjectorStats {
        InjectorStats {
            name: self.name().to_string(),
            registered: self.inner.factories.len(),
            deferred: self.inner.deferred.len(),
            resolutions: self.inner.resolutions.load(Ordering::Relaxed),
            failed_resolutions: self.inner.failed_resolutions.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn record_resolution(&self, succeeded: bool) {
        self.inner.resolutions.fetch_add(1, Ordering::Relaxed);
        if !succeeded {
            self.inner.failed_resolutions.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl Default for Injector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("name", &self.name())
            .field("registered", &self.inner.factories.len())
            .field("deferred", &self.inner.deferred.len())
            .finish()
    }
}

/// Статистика реестра для диагностики
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectorStats {
    pub name: String,
    pub registered: usize,
    pub deferred: usize,
    pub resolutions: u64,
    pub failed_resolutions: u64,
}
