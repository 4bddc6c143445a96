//! Ошибки injector'а
//!
//! Один enum на все операции реестра: регистрацию, разрешение, deferred
//! активацию, `call` и `fill`. Ошибки recipe приходят как `anyhow::Error`
//! и заворачиваются в `FactoryFailed` / `CallFailed` с сохранением source.

use thiserror::Error;

/// Результат операций injector'а
pub type Result<T, E = InjectorError> = std::result::Result<T, E>;

/// Ошибка реестра зависимостей
#[derive(Debug, Error)]
pub enum InjectorError {
    /// Recipe не производит значения (выход `()`)
    #[error("the provided dependency factory for {service_type} must return exactly 1 value, found {found}")]
    WrongReturnArity { service_type: String, found: usize },

    /// Recipe вернул `Err`
    #[error("dependency factory for {service_type} failed: {source}")]
    FactoryFailed {
        service_type: String,
        #[source]
        source: anyhow::Error,
    },

    /// Recipe запаниковал, panic перехвачен на границе factory или `call`
    #[error("dependency injection failed because factory for {service_type} panicked, recovered value: {payload}")]
    FactoryAborted { service_type: String, payload: String },

    #[error("the requested type/name combination is not a registered dependency: {service_type} (name: {name:?})")]
    NotFound { service_type: String, name: String },

    /// Разрешенное значение не совпадает с запрошенным типом
    #[error("the resolved dependency under key {key} does not match the requested type {expected}")]
    TypeMismatch { expected: String, key: String },

    #[error("the injector tag {tag:?} on field {field} is not valid")]
    InvalidTag { field: String, tag: String },

    /// Вызванная через `call` функция вернула ошибку
    #[error("injected call failed: {source}")]
    CallFailed {
        #[source]
        source: anyhow::Error,
    },

    #[error("the global injector is already initialized")]
    AlreadyInitialized,

    #[error("injector configuration error: {message}")]
    Config { message: String },
}

impl InjectorError {
    /// Ошибка означает отсутствие регистрации (а не сбой recipe)
    pub fn is_not_found(&self) -> bool {
        matches!(self, InjectorError::NotFound { .. })
    }

    /// Не зарегистрирован именно `service_type` с именем `name`
    ///
    /// `NotFound` по зависимости этого типа сюда не попадает.
    pub fn is_missing(&self, service_type: &str, name: &str) -> bool {
        matches!(
            self,
            InjectorError::NotFound { service_type: missing, name: missing_name }
                if missing == service_type && missing_name == name
        )
    }

    /// Ошибка пришла из panic внутри recipe
    pub fn is_aborted(&self) -> bool {
        matches!(self, InjectorError::FactoryAborted { .. })
    }

    pub(crate) fn not_found(service_type: impl Into<String>, name: &str) -> Self {
        InjectorError::NotFound {
            service_type: service_type.into(),
            name: name.to_string(),
        }
    }
}

/// Достать текст из panic payload (`&str` или `String`, иначе заглушка)
pub(crate) fn panic_payload_text(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
