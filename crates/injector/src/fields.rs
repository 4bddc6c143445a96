//! Field auto-wiring
//!
//! Структура описывает свои injectable поля через `Fill`, каждое поле с тегом:
//! - `"inject"` - зависимость по типу поля, имя по умолчанию
//! - `"inject:NAME"` - зависимость с именем `NAME`
//!
//! Любой другой тег (включая `"inject:"` без имени) - `InvalidTag`.
//! Для простых структур есть макрос [`impl_fill!`](crate::impl_fill).

use std::sync::Arc;

use crate::container::Injector;
use crate::errors::{InjectorError, Result};
use crate::key::Name;

pub const TAG_PREFIX: &str = "inject";

/// Структура с injectable полями
///
/// `fill` принимает только типы с этим trait, поэтому не-структуру передать нельзя:
///
/// ```compile_fail
/// let injector = injector::Injector::new();
/// let mut number = 5_u32;
/// injector.fill(&mut number).unwrap();
/// ```
pub trait Fill {
    fn fill_fields(&mut self, fields: &mut FieldInjector<'_>) -> Result<()>;
}

/// Заполняет поля одной структуры
pub struct FieldInjector<'a> {
    injector: &'a Injector,
    filled: usize,
}

impl<'a> FieldInjector<'a> {
    fn new(injector: &'a Injector) -> Self {
        Self {
            injector,
            filled: 0,
        }
    }

    /// Разрешить одно поле по его тегу
    pub fn field<T>(&mut self, field: &str, slot: &mut Option<Arc<T>>, tag: &str) -> Result<&mut Self>
    where
        T: Send + Sync + 'static,
    {
        let name = parse_tag(field, tag)?;
        *slot = Some(self.injector.inject_named::<T>(name)?);
        self.filled += 1;
        Ok(self)
    }

    pub fn filled(&self) -> usize {
        self.filled
    }
}

/// Разобрать тег поля в имя регистрации
pub fn parse_tag(field: &str, tag: &str) -> Result<Name> {
    let invalid = || InjectorError::InvalidTag {
        field: field.to_string(),
        tag: tag.to_string(),
    };

    let tag = tag.trim();
    if tag == TAG_PREFIX {
        return Ok(Name::default());
    }

    match tag.strip_prefix(TAG_PREFIX).and_then(|rest| rest.strip_prefix(':')) {
        Some(name) if !name.is_empty() => Ok(Name::from(name)),
        _ => Err(invalid()),
    }
}

impl Injector {
    /// Заполнить injectable поля структуры
    pub fn fill<S>(&self, target: &mut S) -> Result<()>
    where
        S: Fill + ?Sized,
    {
        let mut fields = FieldInjector::new(self);
        target.fill_fields(&mut fields)?;
        tracing::debug!(
            target_type = std::any::type_name::<S>(),
            fields = fields.filled(),
            "Filled struct fields"
        );
        Ok(())
    }

    pub fn must_fill<S>(&self, target: &mut S)
    where
        S: Fill + ?Sized,
    {
        if let Err(e) = self.fill(target) {
            panic!("{e}");
        }
    }
}

/// Реализовать `Fill` для структуры с полями `Option<Arc<T>>`
///
/// ```
/// use std::sync::Arc;
///
/// struct Config { port: u16 }
///
/// #[derive(Default)]
/// struct Server {
///     config: Option<Arc<Config>>,
///     fallback: Option<Arc<Config>>,
/// }
///
/// injector::impl_fill!(Server {
///     config: "inject",
///     fallback: "inject:fallback",
/// });
///
/// let injector = injector::Injector::new();
/// injector.singleton(|| -> anyhow::Result<Config> { Ok(Config { port: 80 }) }).unwrap();
/// injector
///     .singleton_named(|| -> anyhow::Result<Config> { Ok(Config { port: 8080 }) }, "fallback")
///     .unwrap();
///
/// let mut server = Server::default();
/// injector.fill(&mut server).unwrap();
/// assert_eq!(server.config.unwrap().port, 80);
/// assert_eq!(server.fallback.unwrap().port, 8080);
/// ```
#[macro_export]
macro_rules! impl_fill {
    ($target:ty { $($field:ident : $tag:literal),* $(,)? }) => {
        impl $crate::Fill for $target {
            fn fill_fields(
                &mut self,
                fields: &mut $crate::FieldInjector<'_>,
            ) -> $crate::Result<()> {
                $( fields.field(stringify!($field), &mut self.$field, $tag)?; )*
                Ok(())
            }
        }
    };
}
