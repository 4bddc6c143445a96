//! Argument auto-wiring
//!
//! Recipe - обычная функция или closure, чьи параметры являются
//! зависимостями: `Fn(Arc<Db>, Arc<Config>) -> anyhow::Result<Service>`.
//! Параметры разрешаются через тот же реестр по типу, с именем по умолчанию.
//! Поддерживаются функции до 8 параметров.

use std::sync::Arc;

use crate::container::Injector;
use crate::errors::Result;
use crate::key::TypeToken;

/// Значение, которое можно получить из реестра как параметр
pub trait FromInjector: Clone + Send + Sync + Sized + 'static {
    fn from_injector(injector: &Injector) -> Result<Self>;
}

impl<T: Send + Sync + 'static> FromInjector for Arc<T> {
    fn from_injector(injector: &Injector) -> Result<Self> {
        injector.inject::<T>()
    }
}

/// Опциональная зависимость: отсутствие регистрации самого `T` дает `None`
impl<T: Send + Sync + 'static> FromInjector for Option<Arc<T>> {
    fn from_injector(injector: &Injector) -> Result<Self> {
        injector.try_inject::<T>()
    }
}

/// Сам реестр, для recipe которым нужно разрешать что-то вручную
impl FromInjector for Injector {
    fn from_injector(injector: &Injector) -> Result<Self> {
        Ok(injector.clone())
    }
}

/// Кортеж параметров recipe
pub trait InjectArgs: Clone + Send + Sync + Sized + 'static {
    fn resolve(injector: &Injector) -> Result<Self>;

    /// Типы параметров, для диагностики
    fn tokens() -> Vec<TypeToken>;
}

/// Recipe: функция с зависимостями в параметрах и одним результатом
pub trait Recipe<Args>: Send + Sync + 'static {
    type Output: Send + Sync + 'static;

    fn invoke(&self, args: Args) -> anyhow::Result<Self::Output>;
}

/// Функция для `Injector::call`
pub trait Callable<Args> {
    fn call_with(self, args: Args) -> anyhow::Result<()>;
}

/// Результат функции, вызванной через `call`
pub trait CallOutput {
    fn into_call_result(self) -> anyhow::Result<()>;
}

impl CallOutput for () {
    fn into_call_result(self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<T, E> CallOutput for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn into_call_result(self) -> anyhow::Result<()> {
        self.map(|_| ()).map_err(Into::into)
    }
}

macro_rules! impl_recipe {
    ($($arg:ident),*) => {
        impl<$($arg: FromInjector),*> InjectArgs for ($($arg,)*) {
            #[allow(unused_variables)]
            fn resolve(injector: &Injector) -> Result<Self> {
                Ok(($($arg::from_injector(injector)?,)*))
            }

            fn tokens() -> Vec<TypeToken> {
                vec![$(TypeToken::of::<$arg>()),*]
            }
        }

        impl<Func, Out, $($arg),*> Recipe<($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> anyhow::Result<Out> + Send + Sync + 'static,
            Out: Send + Sync + 'static,
            $($arg: FromInjector,)*
        {
            type Output = Out;

            #[allow(non_snake_case)]
            fn invoke(&self, args: ($($arg,)*)) -> anyhow::Result<Out> {
                let ($($arg,)*) = args;
                (self)($($arg),*)
            }
        }

        impl<Func, Ret, $($arg),*> Callable<($($arg,)*)> for Func
        where
            Func: FnOnce($($arg),*) -> Ret,
            Ret: CallOutput,
            $($arg: FromInjector,)*
        {
            #[allow(non_snake_case)]
            fn call_with(self, args: ($($arg,)*)) -> anyhow::Result<()> {
                let ($($arg,)*) = args;
                (self)($($arg),*).into_call_result()
            }
        }
    };
}

impl_recipe!();
impl_recipe!(A1);
impl_recipe!(A1, A2);
impl_recipe!(A1, A2, A3);
impl_recipe!(A1, A2, A3, A4);
impl_recipe!(A1, A2, A3, A4, A5);
impl_recipe!(A1, A2, A3, A4, A5, A6);
impl_recipe!(A1, A2, A3, A4, A5, A6, A7);
impl_recipe!(A1, A2, A3, A4, A5, A6, A7, A8);

/// Типы параметров recipe (для логов и отладки)
pub fn parameter_tokens<A: InjectArgs>() -> Vec<TypeToken> {
    A::tokens()
}
