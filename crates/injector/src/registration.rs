//! Запись в реестр: singleton и transient регистрации
//!
//! Ключ берется из типа результата recipe и имени. Повторная регистрация
//! того же ключа молча заменяет предыдущую.

use std::sync::Arc;

use tracing::debug;

use crate::container::Injector;
use crate::errors::Result;
use crate::factory::{build_factory, Lifetime};
use crate::key::{Name, TypeToken};
use crate::recipe::{InjectArgs, Recipe};

impl Injector {
    /// Зарегистрировать singleton с именем по умолчанию
    pub fn singleton<A, R>(&self, recipe: R) -> Result<()>
    where
        A: InjectArgs,
        R: Recipe<A>,
    {
        self.register(Lifetime::Singleton, Arc::new(recipe), Name::default())
    }

    pub fn singleton_named<A, R>(&self, recipe: R, name: impl Into<Name>) -> Result<()>
    where
        A: InjectArgs,
        R: Recipe<A>,
    {
        self.register(Lifetime::Singleton, Arc::new(recipe), name.into())
    }

    /// Зарегистрировать transient с именем по умолчанию
    pub fn transient<A, R>(&self, recipe: R) -> Result<()>
    where
        A: InjectArgs,
        R: Recipe<A>,
    {
        self.register(Lifetime::Transient, Arc::new(recipe), Name::default())
    }

    pub fn transient_named<A, R>(&self, recipe: R, name: impl Into<Name>) -> Result<()>
    where
        A: InjectArgs,
        R: Recipe<A>,
    {
        self.register(Lifetime::Transient, Arc::new(recipe), name.into())
    }

    /// Общий путь записи, через него же проходит активация deferred
    pub(crate) fn register<A, R>(&self, lifetime: Lifetime, recipe: Arc<R>, name: Name) -> Result<()>
    where
        A: InjectArgs,
        R: Recipe<A>,
    {
        let output = TypeToken::of::<R::Output>();
        let factory = build_factory::<A, R>(self, lifetime, recipe)?;

        let replaced = self.inner.factories.set(output.key(), name.clone(), factory);

        if replaced.is_some() {
            debug!(
                service_type = output.type_name(),
                name = name.as_str(),
                "Replaced existing registration with {:?} lifetime",
                lifetime
            );
        } else {
            debug!(
                service_type = output.type_name(),
                name = name.as_str(),
                "Registered with {:?} lifetime",
                lifetime
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::InjectorError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Database {
        url: String,
    }

    #[test]
    fn test_registration_uses_output_type_key() {
        let injector = Injector::new();
        injector
            .singleton(|| -> anyhow::Result<Database> {
                Ok(Database {
                    url: "postgres://localhost".to_string(),
                })
            })
            .expect("registration should succeed");

        let keys = injector.registered_keys();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].type_key, TypeToken::of::<Database>().key());
        assert!(keys[0].name.is_default());
    }

    #[test]
    fn test_reregistration_replaces_factory() {
        let injector = Injector::new();
        let old_calls = Arc::new(AtomicUsize::new(0));
        let counter = old_calls.clone();

        injector
            .transient(move || -> anyhow::Result<Database> {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Database {
                    url: "old".to_string(),
                })
            })
            .expect("first registration");
        injector
            .transient(|| -> anyhow::Result<Database> {
                Ok(Database {
                    url: "new".to_string(),
                })
            })
            .expect("second registration");

        let db = injector.inject::<Database>().expect("resolves");
        assert_eq!(db.url, "new");
        assert_eq!(old_calls.load(Ordering::SeqCst), 0);
        assert_eq!(injector.registered_keys().len(), 1);
    }

    #[test]
    fn test_named_registrations_are_independent() {
        let injector = Injector::new();
        injector
            .singleton_named(
                || -> anyhow::Result<Database> { Ok(Database { url: "a".to_string() }) },
                "a",
            )
            .expect("a registers");
        injector
            .singleton_named(
                || -> anyhow::Result<Database> { Ok(Database { url: "b".to_string() }) },
                "b",
            )
            .expect("b registers");

        assert_eq!(injector.inject_named::<Database>("a").expect("a").url, "a");
        assert_eq!(injector.inject_named::<Database>("b").expect("b").url, "b");
        assert!(injector.inject::<Database>().unwrap_err().is_not_found());
    }

    #[test]
    fn test_failed_wrap_leaves_registry_untouched() {
        let injector = Injector::new();
        let err = injector
            .singleton(|db: Arc<Database>| -> anyhow::Result<String> { Ok(db.url.clone()) })
            .unwrap_err();

        assert!(matches!(err, InjectorError::NotFound { .. }));
        assert!(injector.registered_keys().is_empty());
    }
}
