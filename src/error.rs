use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComboError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Неизвестная клавиша: {0}")]
    UnknownKey(String),

    #[error("Неоднозначная привязка: клавиша '{key}' уже имеет действие на {count} нажатий")]
    AmbiguousBinding { key: String, count: u32 },

    #[error("Некорректная привязка: {0}")]
    InvalidBinding(String),

    #[error("Действие '{action}' завершилось ошибкой: {source}")]
    ActionFailed {
        action: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl ComboError {
    pub fn unknown_key<T>(name: impl Into<String>) -> Result<T> {
        Err(ComboError::UnknownKey(name.into()))
    }
}

pub type Result<T> = std::result::Result<T, ComboError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! combo_error {
    (invalid_binding, $($arg:tt)*) => {
        $crate::error::ComboError::InvalidBinding(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::ComboError::Internal(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ComboError::AmbiguousBinding { key: "w".to_string(), count: 2 };
        assert!(err.to_string().contains("'w'"));
        assert!(err.to_string().contains('2'));

        let err = combo_error!(invalid_binding, "count {} < 1", 0);
        assert!(matches!(err, ComboError::InvalidBinding(ref m) if m == "count 0 < 1"));
    }

    #[test]
    fn test_unknown_key_helper() {
        let result: Result<()> = ComboError::unknown_key("f13");
        assert!(matches!(result, Err(ComboError::UnknownKey(ref k)) if k == "f13"));
    }
}
