//! Чтение из реестра
//!
//! Порядок разрешения:
//! 1. активировать deferred регистрацию для ключа, если она есть
//! 2. найти factory, иначе `NotFound`
//! 3. вызвать factory
//! 4. проверить тип результата, иначе `TypeMismatch`
//!
//! `must_*` варианты используют ту же логику, но паникуют вместо `Err`.

use std::any::type_name;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::container::{Dependency, Injector};
use crate::errors::{panic_payload_text, InjectorError, Result};
use crate::key::{Name, TypeToken, DEFAULT_NAME};
use crate::recipe::{Callable, InjectArgs};

impl Injector {
    /// Разрешить зависимость по типу
    pub fn inject<T>(&self) -> Result<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        self.inject_named::<T>(Name::default())
    }

    pub fn inject_named<T>(&self, name: impl Into<Name>) -> Result<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let token = TypeToken::of::<T>();
        let dependency = self.inject_token_named(token, name)?;
        downcast_dependency::<T>(dependency, token)
    }

    /// Разрешить по runtime токену, без приведения типа
    pub fn inject_token(&self, token: TypeToken) -> Result<Dependency> {
        self.inject_token_named(token, Name::default())
    }

    pub fn inject_token_named(&self, token: TypeToken, name: impl Into<Name>) -> Result<Dependency> {
        let name = name.into();
        let result = self.resolve_dependency(token, &name);
        self.record_resolution(result.is_ok());

        if self.config().verbose_logging {
            match &result {
                Ok(_) => debug!(
                    service_type = token.type_name(),
                    name = name.as_str(),
                    "Resolved dependency"
                ),
                Err(e) => debug!(
                    service_type = token.type_name(),
                    name = name.as_str(),
                    error = %e,
                    "Failed to resolve dependency"
                ),
            }
        }
        result
    }

    /// Записать результат в переданный слот
    ///
    /// Слот обязан быть изменяемой ссылкой, иначе код не скомпилируется:
    ///
    /// ```compile_fail
    /// use std::sync::Arc;
    /// let injector = injector::Injector::new();
    /// let slot: Option<Arc<u32>> = None;
    /// injector.inject_into(slot).unwrap();
    /// ```
    pub fn inject_into<T>(&self, out: &mut Option<Arc<T>>) -> Result<()>
    where
        T: Send + Sync + 'static,
    {
        self.inject_into_named(out, Name::default())
    }

    pub fn inject_into_named<T>(&self, out: &mut Option<Arc<T>>, name: impl Into<Name>) -> Result<()>
    where
        T: Send + Sync + 'static,
    {
        *out = Some(self.inject_named::<T>(name)?);
        Ok(())
    }

    /// Разрешить опциональную зависимость
    ///
    /// `None` только если не зарегистрирован сам `T`. Сбой recipe или
    /// отсутствующая зависимость `T` возвращаются как `Err`.
    pub fn try_inject<T>(&self) -> Result<Option<Arc<T>>>
    where
        T: Send + Sync + 'static,
    {
        match self.inject::<T>() {
            Ok(instance) => Ok(Some(instance)),
            Err(e) if e.is_missing(type_name::<T>(), DEFAULT_NAME) => {
                debug!("Optional dependency {} is not registered", type_name::<T>());
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub fn must_inject<T>(&self) -> Arc<T>
    where
        T: Send + Sync + 'static,
    {
        self.inject::<T>().unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn must_inject_named<T>(&self, name: impl Into<Name>) -> Arc<T>
    where
        T: Send + Sync + 'static,
    {
        self.inject_named::<T>(name).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn must_inject_token(&self, token: TypeToken, name: impl Into<Name>) -> Dependency {
        self.inject_token_named(token, name)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn must_inject_into<T>(&self, out: &mut Option<Arc<T>>, name: impl Into<Name>)
    where
        T: Send + Sync + 'static,
    {
        if let Err(e) = self.inject_into_named(out, name) {
            panic!("{e}");
        }
    }

    /// Разрешить параметры функции и вызвать ее
    ///
    /// Если функция возвращает `Err`, он становится ошибкой вызова.
    /// Panic внутри функции перехватывается.
    pub fn call<A, F>(&self, callable: F) -> Result<()>
    where
        A: InjectArgs,
        F: Callable<A>,
    {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| -> Result<()> {
            let args = A::resolve(self)?;
            callable
                .call_with(args)
                .map_err(|source| InjectorError::CallFailed { source })
        }));

        match outcome {
            Ok(result) => result,
            Err(payload) => {
                let payload = panic_payload_text(payload.as_ref());
                warn!(callable = type_name::<F>(), %payload, "Recovered panic in injected call");
                Err(InjectorError::FactoryAborted {
                    service_type: type_name::<F>().to_string(),
                    payload,
                })
            }
        }
    }

    pub fn must_call<A, F>(&self, callable: F)
    where
        A: InjectArgs,
        F: Callable<A>,
    {
        if let Err(e) = self.call(callable) {
            panic!("{e}");
        }
    }

    fn resolve_dependency(&self, token: TypeToken, name: &Name) -> Result<Dependency> {
        self.activate_deferred(token, name)?;

        let factory = self
            .inner
            .factories
            .get(&token.key(), name)
            .ok_or_else(|| InjectorError::not_found(token.type_name(), name.as_str()))?;

        factory.invoke()
    }
}

/// Привести type-erased значение к `T`
pub fn downcast_dependency<T>(dependency: Dependency, token: TypeToken) -> Result<Arc<T>>
where
    T: Send + Sync + 'static,
{
    dependency
        .downcast::<T>()
        .map_err(|_| InjectorError::TypeMismatch {
            expected: type_name::<T>().to_string(),
            key: token.key().to_string(),
        })
}
