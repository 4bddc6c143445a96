//! Factory wrappers
//!
//! Превращают recipe в единообразную функцию `() -> Result<Dependency>`.
//! Аргументы recipe разрешаются один раз, при создании wrapper'а, и
//! клонируются на каждый вызов. Panic внутри recipe не выходит наружу:
//! он перехватывается здесь и превращается в `FactoryAborted`.

use once_cell::sync::OnceCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, warn};

use crate::container::{Dependency, Injector};
use crate::errors::{panic_payload_text, InjectorError, Result};
use crate::key::TypeToken;
use crate::recipe::{InjectArgs, Recipe};

/// Жизненный цикл регистрации
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// Recipe вызывается при каждом разрешении
    Transient,
    /// Recipe вызывается один раз, результат кэшируется
    Singleton,
}

type Produce = dyn Fn() -> Result<Dependency> + Send + Sync;

/// Обернутый recipe, готовый к вызову
#[derive(Clone)]
pub struct FactoryFunction {
    lifetime: Lifetime,
    output: TypeToken,
    produce: Arc<Produce>,
}

impl FactoryFunction {
    pub fn invoke(&self) -> Result<Dependency> {
        (self.produce)()
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Тип, который производит factory
    pub fn output(&self) -> TypeToken {
        self.output
    }

    #[cfg(test)]
    pub(crate) fn from_fn<F>(lifetime: Lifetime, output: TypeToken, produce: F) -> Self
    where
        F: Fn() -> Result<Dependency> + Send + Sync + 'static,
    {
        Self {
            lifetime,
            output,
            produce: Arc::new(produce),
        }
    }
}

impl fmt::Debug for FactoryFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryFunction")
            .field("lifetime", &self.lifetime)
            .field("output", &self.output.type_name())
            .finish()
    }
}

/// Собрать transient factory: проверить recipe, разрешить аргументы
pub fn transient_factory<A, R>(injector: &Injector, recipe: Arc<R>) -> Result<FactoryFunction>
where
    A: InjectArgs,
    R: Recipe<A>,
{
    let output = TypeToken::of::<R::Output>();
    let service_type = output.type_name();

    if output.is::<()>() {
        return Err(InjectorError::WrongReturnArity {
            service_type: service_type.to_string(),
            found: 0,
        });
    }

    let args = A::resolve(injector)?;
    let threshold = injector.config().slow_factory_threshold();

    let produce = move || -> Result<Dependency> {
        let started = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| recipe.invoke(args.clone())));
        let elapsed = started.elapsed();

        if elapsed > threshold {
            warn!(
                service_type,
                elapsed_ms = saturating_millis(elapsed),
                "Slow dependency factory"
            );
        }

        match outcome {
            Ok(Ok(instance)) => Ok(Arc::new(instance) as Dependency),
            Ok(Err(source)) => {
                error!(service_type, error = %source, "Dependency factory failed");
                Err(InjectorError::FactoryFailed {
                    service_type: service_type.to_string(),
                    source,
                })
            }
            Err(payload) => {
                let payload = panic_payload_text(payload.as_ref());
                warn!(service_type, %payload, "Recovered panic in dependency factory");
                Err(InjectorError::FactoryAborted {
                    service_type: service_type.to_string(),
                    payload,
                })
            }
        }
    };

    Ok(FactoryFunction {
        lifetime: Lifetime::Transient,
        output,
        produce: Arc::new(produce),
    })
}

/// Миллисекунды для логов, без переполнения
fn saturating_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Собрать singleton factory поверх transient
///
/// Кэш - `OnceCell` на слот: одновременные первые разрешения ждут одного
/// вызова recipe. Ошибка не кэшируется, следующий вызов повторит recipe.
pub fn singleton_factory<A, R>(injector: &Injector, recipe: Arc<R>) -> Result<FactoryFunction>
where
    A: InjectArgs,
    R: Recipe<A>,
{
    let transient = transient_factory::<A, R>(injector, recipe)?;
    let output = transient.output;
    let cell: OnceCell<Dependency> = OnceCell::new();

    let produce = move || -> Result<Dependency> {
        cell.get_or_try_init(|| {
            let instance = transient.invoke()?;
            debug!(service_type = output.type_name(), "Cached singleton instance");
            Ok(instance)
        })
        .cloned()
    };

    Ok(FactoryFunction {
        lifetime: Lifetime::Singleton,
        output,
        produce: Arc::new(produce),
    })
}

/// Выбрать wrapper по lifetime
pub fn build_factory<A, R>(
    injector: &Injector,
    lifetime: Lifetime,
    recipe: Arc<R>,
) -> Result<FactoryFunction>
where
    A: InjectArgs,
    R: Recipe<A>,
{
    match lifetime {
        Lifetime::Transient => transient_factory::<A, R>(injector, recipe),
        Lifetime::Singleton => singleton_factory::<A, R>(injector, recipe),
    }
}
