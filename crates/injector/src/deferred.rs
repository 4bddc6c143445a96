//! Deferred регистрации
//!
//! Recipe сохраняется без разбора параметров. Параметры разрешаются только
//! при активации, то есть при первом разрешении ключа. Это позволяет
//! регистрировать recipe, зависимости которого появятся позже.
//!
//! Жизненный цикл ключа: `unregistered -> deferred -> registered`.
//! После активации запись удаляется из deferred таблицы, даже если
//! активация завершилась ошибкой.

use once_cell::sync::OnceCell;
use std::sync::Arc;

use tracing::debug;

use crate::container::Injector;
use crate::errors::Result;
use crate::factory::Lifetime;
use crate::key::{Name, TypeToken};
use crate::recipe::{InjectArgs, Recipe};

type Promote = dyn Fn(&Injector, Name) -> Result<()> + Send + Sync;

/// Запись о еще не активированной регистрации
pub(crate) struct DeferredEntry {
    lifetime: Lifetime,
    promote: Box<Promote>,
    /// Одновременные resolver'ы ждут одной активации
    promoted: OnceCell<()>,
}

impl DeferredEntry {
    fn new<A, R>(lifetime: Lifetime, recipe: R) -> Self
    where
        A: InjectArgs,
        R: Recipe<A>,
    {
        let recipe = Arc::new(recipe);
        Self {
            lifetime,
            promote: Box::new(move |injector: &Injector, name: Name| {
                injector.register::<A, R>(lifetime, Arc::clone(&recipe), name)
            }),
            promoted: OnceCell::new(),
        }
    }
}

impl Injector {
    /// Отложенная singleton регистрация с именем по умолчанию
    pub fn deferred_singleton<A, R>(&self, recipe: R) -> Result<()>
    where
        A: InjectArgs,
        R: Recipe<A>,
    {
        self.defer(Lifetime::Singleton, recipe, Name::default())
    }

    pub fn deferred_singleton_named<A, R>(&self, recipe: R, name: impl Into<Name>) -> Result<()>
    where
        A: InjectArgs,
        R: Recipe<A>,
    {
        self.defer(Lifetime::Singleton, recipe, name.into())
    }

    /// Отложенная transient регистрация с именем по умолчанию
    pub fn deferred_transient<A, R>(&self, recipe: R) -> Result<()>
    where
        A: InjectArgs,
        R: Recipe<A>,
    {
        self.defer(Lifetime::Transient, recipe, Name::default())
    }

    pub fn deferred_transient_named<A, R>(&self, recipe: R, name: impl Into<Name>) -> Result<()>
    where
        A: InjectArgs,
        R: Recipe<A>,
    {
        self.defer(Lifetime::Transient, recipe, name.into())
    }

    fn defer<A, R>(&self, lifetime: Lifetime, recipe: R, name: Name) -> Result<()>
    where
        A: InjectArgs,
        R: Recipe<A>,
    {
        let output = TypeToken::of::<R::Output>();
        let entry = Arc::new(DeferredEntry::new::<A, R>(lifetime, recipe));
        self.inner.deferred.set(output.key(), name.clone(), entry);

        debug!(
            service_type = output.type_name(),
            name = name.as_str(),
            "Deferred registration with {:?} lifetime",
            lifetime
        );
        Ok(())
    }

    /// Активировать deferred запись для ключа, если она есть
    ///
    /// Отсутствие записи не ошибка. Ошибка активации возвращается вызывающему,
    /// запись при этом все равно удаляется.
    pub fn activate_deferred(&self, token: TypeToken, name: &Name) -> Result<()> {
        let type_key = token.key();
        let Some(entry) = self.inner.deferred.get(&type_key, name) else {
            return Ok(());
        };

        let outcome = entry
            .promoted
            .get_or_try_init(|| (entry.promote)(self, name.clone()));

        self.inner
            .deferred
            .delete_if(&type_key, name, |current| Arc::ptr_eq(current, &entry));

        match &outcome {
            Ok(_) => debug!(
                service_type = token.type_name(),
                name = name.as_str(),
                "Activated deferred {:?} registration",
                entry.lifetime
            ),
            Err(e) => debug!(
                service_type = token.type_name(),
                name = name.as_str(),
                error = %e,
                "Deferred registration failed to activate"
            ),
        }
        outcome.map(|_| ())
    }
}
