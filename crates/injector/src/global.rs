//! Глобальный injector процесса
//!
//! Создается лениво с настройками по умолчанию при первом обращении.
//! `init` позволяет задать настройки, но только до первого обращения.
//! Свободные функции делегируют в глобальный экземпляр.

use once_cell::sync::OnceCell;
use std::sync::Arc;

use tracing::info;

use crate::config::InjectorConfig;
use crate::container::{Dependency, Injector};
use crate::errors::{InjectorError, Result};
use crate::fields::Fill;
use crate::key::{Name, TypeToken};
use crate::recipe::{Callable, InjectArgs, Recipe};

static GLOBAL_INJECTOR: OnceCell<Injector> = OnceCell::new();

/// Инициализировать глобальный injector с заданными настройками
pub fn init(config: InjectorConfig) -> Result<()> {
    let name = config.name.clone();
    GLOBAL_INJECTOR
        .set(Injector::with_config(config))
        .map_err(|_| InjectorError::AlreadyInitialized)?;
    info!("Global injector '{}' initialized", name);
    Ok(())
}

/// Глобальный injector (создается при первом вызове)
pub fn injector() -> &'static Injector {
    GLOBAL_INJECTOR.get_or_init(Injector::new)
}

pub fn singleton<A, R>(recipe: R) -> Result<()>
where
    A: InjectArgs,
    R: Recipe<A>,
{
    injector().singleton(recipe)
}

pub fn singleton_named<A, R>(recipe: R, name: impl Into<Name>) -> Result<()>
where
    A: InjectArgs,
    R: Recipe<A>,
{
    injector().singleton_named(recipe, name)
}

pub fn transient<A, R>(recipe: R) -> Result<()>
where
    A: InjectArgs,
    R: Recipe<A>,
{
    injector().transient(recipe)
}

pub fn transient_named<A, R>(recipe: R, name: impl Into<Name>) -> Result<()>
where
    A: InjectArgs,
    R: Recipe<A>,
{
    injector().transient_named(recipe, name)
}

pub fn deferred_singleton<A, R>(recipe: R) -> Result<()>
where
    A: InjectArgs,
    R: Recipe<A>,
{
    injector().deferred_singleton(recipe)
}

pub fn deferred_singleton_named<A, R>(recipe: R, name: impl Into<Name>) -> Result<()>
where
    A: InjectArgs,
    R: Recipe<A>,
{
    injector().deferred_singleton_named(recipe, name)
}

pub fn deferred_transient<A, R>(recipe: R) -> Result<()>
where
    A: InjectArgs,
    R: Recipe<A>,
{
    injector().deferred_transient(recipe)
}

pub fn deferred_transient_named<A, R>(recipe: R, name: impl Into<Name>) -> Result<()>
where
    A: InjectArgs,
    R: Recipe<A>,
{
    injector().deferred_transient_named(recipe, name)
}

pub fn inject<T>() -> Result<Arc<T>>
where
    T: Send + Sync + 'static,
{
    injector().inject::<T>()
}

pub fn inject_named<T>(name: impl Into<Name>) -> Result<Arc<T>>
where
    T: Send + Sync + 'static,
{
    injector().inject_named::<T>(name)
}

pub fn inject_token(token: TypeToken, name: impl Into<Name>) -> Result<Dependency> {
    injector().inject_token_named(token, name)
}

pub fn inject_into<T>(out: &mut Option<Arc<T>>, name: impl Into<Name>) -> Result<()>
where
    T: Send + Sync + 'static,
{
    injector().inject_into_named(out, name)
}

pub fn must_inject<T>() -> Arc<T>
where
    T: Send + Sync + 'static,
{
    injector().must_inject::<T>()
}

pub fn must_inject_named<T>(name: impl Into<Name>) -> Arc<T>
where
    T: Send + Sync + 'static,
{
    injector().must_inject_named::<T>(name)
}

pub fn must_inject_token(token: TypeToken, name: impl Into<Name>) -> Dependency {
    injector().must_inject_token(token, name)
}

pub fn must_inject_into<T>(out: &mut Option<Arc<T>>, name: impl Into<Name>)
where
    T: Send + Sync + 'static,
{
    injector().must_inject_into(out, name)
}

pub fn call<A, F>(callable: F) -> Result<()>
where
    A: InjectArgs,
    F: Callable<A>,
{
    injector().call(callable)
}

pub fn must_call<A, F>(callable: F)
where
    A: InjectArgs,
    F: Callable<A>,
{
    injector().must_call(callable)
}

pub fn fill<S>(target: &mut S) -> Result<()>
where
    S: Fill + ?Sized,
{
    injector().fill(target)
}

pub fn must_fill<S>(target: &mut S)
where
    S: Fill + ?Sized,
{
    injector().must_fill(target)
}
