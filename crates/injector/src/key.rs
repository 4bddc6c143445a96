//! Ключи реестра
//!
//! `TypeKey` строится из полного имени типа (`std::any::type_name`):
//! namespace базового типа (после снятия `&`, `*const`, `Box`, `Arc`, `Rc`)
//! плюс исходное отображаемое имя, в котором indirection сохраняется.
//! Поэтому `Foo` и `Arc<Foo>` дают разные ключи, но один namespace.

use std::any::TypeId;
use std::fmt;

/// Namespace для типов без пути (примитивы, кортежи, срезы)
pub const UNKNOWN_PACKAGE: &str = "UNKNOWN_PACKAGE";

/// Имя по умолчанию
pub const DEFAULT_NAME: &str = "";

const REFERENCE_PREFIXES: [&str; 4] = ["&mut ", "&", "*const ", "*mut "];

const SMART_POINTERS: [&str; 6] = [
    "alloc::boxed::Box<",
    "alloc::sync::Arc<",
    "alloc::rc::Rc<",
    "std::boxed::Box<",
    "std::sync::Arc<",
    "std::rc::Rc<",
];

/// Строковая идентичность типа для реестра
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(String);

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::from_type_name(std::any::type_name::<T>())
    }

    /// Построить ключ из отображаемого имени типа
    pub fn from_type_name(type_name: &str) -> Self {
        let base = strip_indirection(type_name);
        let namespace = namespace_of(base).unwrap_or(UNKNOWN_PACKAGE);
        TypeKey(format!("{namespace}/{type_name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Снять все уровни указателей и ссылок
fn strip_indirection(mut type_name: &str) -> &str {
    loop {
        let trimmed = type_name.trim();

        if let Some(inner) = REFERENCE_PREFIXES
            .iter()
            .find_map(|prefix| trimmed.strip_prefix(prefix))
        {
            type_name = inner;
            continue;
        }

        if let Some(inner) = SMART_POINTERS.iter().find_map(|prefix| {
            trimmed
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix('>'))
        }) {
            type_name = inner;
            continue;
        }

        return trimmed;
    }
}

/// Путь модуля базового типа, `None` для типов без пути
fn namespace_of(base: &str) -> Option<&str> {
    let base = base.strip_prefix("dyn ").unwrap_or(base);
    let head = base
        .split(|c: char| c == '<' || c == ' ')
        .next()
        .unwrap_or(base);

    let is_path = head
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && head
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == ':');
    if !is_path {
        return None;
    }

    head.rsplit_once("::").map(|(namespace, _)| namespace)
}

/// Имя регистрации, пустое по умолчанию
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    /// Склеить части имени без разделителя
    pub fn join<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Name(parts.into_iter().fold(String::new(), |mut acc, part| {
            acc.push_str(part.as_ref());
            acc
        }))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_NAME
    }
}

impl From<&str> for Name {
    fn from(name: &str) -> Self {
        Name(name.to_string())
    }
}

impl From<String> for Name {
    fn from(name: String) -> Self {
        Name(name)
    }
}

impl From<&String> for Name {
    fn from(name: &String) -> Self {
        Name(name.clone())
    }
}

impl From<&[&str]> for Name {
    fn from(parts: &[&str]) -> Self {
        Name::join(parts)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Слот регистрации: (тип, имя)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistryKey {
    pub type_key: TypeKey,
    pub name: Name,
}

impl RegistryKey {
    pub fn new(type_key: TypeKey, name: Name) -> Self {
        Self { type_key, name }
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_default() {
            write!(f, "{}", self.type_key)
        } else {
            write!(f, "{}#{}", self.type_key, self.name)
        }
    }
}

/// Runtime токен типа: `TypeId` для проверки и имя для ключа
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeToken {
    id: TypeId,
    name: &'static str,
}

impl TypeToken {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn type_name(&self) -> &'static str {
        self.name
    }

    pub fn key(&self) -> TypeKey {
        TypeKey::from_type_name(self.name)
    }

    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}
